//! Storage bucket client

use super::{backend_error, build_http_client};
use crate::store::ObjectStore;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Client for one bucket under `<project>/storage/v1`
pub struct SupabaseStorage {
    http_client: reqwest::Client,
    base_url: Url,
    bucket: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

impl SupabaseStorage {
    pub fn new(project_url: &str, key: &str, bucket: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&format!("{}/storage/v1/", project_url.trim_end_matches('/')))
            .map_err(|e| Error::Config(format!("Invalid Supabase URL '{}': {}", project_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Invalid Supabase URL '{}'", project_url)));
        }

        Ok(Self {
            http_client: build_http_client(key, timeout)?,
            base_url,
            bucket: bucket.to_string(),
        })
    }

    /// `<base>/<route...>/<bucket>/<path>`, each key segment percent-encoded
    fn endpoint(&self, route: &[&str], path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(route)
                .push(&self.bucket)
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    fn object_url(&self, path: &str) -> Url {
        self.endpoint(&["object"], path)
    }
}

fn is_not_found(err: &Error) -> bool {
    match err {
        Error::Backend { status: 404, .. } => true,
        Error::Backend {
            code: Some(code), ..
        } => code == "not_found",
        _ => false,
    }
}

#[async_trait]
impl ObjectStore for SupabaseStorage {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        tracing::debug!(bucket = %self.bucket, path = %path, size = bytes.len(), "Storage upload");

        let response = self
            .http_client
            .post(self.object_url(path))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .header("cache-control", "max-age=3600")
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        // Key is "<bucket>/<path>"; fall back to the requested path
        let uploaded: UploadResponse = response.json().await.unwrap_or(UploadResponse { key: None });
        let prefix = format!("{}/", self.bucket);
        Ok(uploaded
            .key
            .map(|k| k.strip_prefix(&prefix).map(str::to_string).unwrap_or(k))
            .unwrap_or_else(|| path.to_string()))
    }

    fn public_url(&self, path: &str) -> String {
        self.endpoint(&["object", "public"], path).to_string()
    }

    async fn download(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let response = self.http_client.get(self.object_url(path)).send().await?;

        if !response.status().is_success() {
            let err = backend_error(response).await;
            if is_not_found(&err) {
                return Ok(None);
            }
            return Err(err);
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }

    async fn remove(&self, paths: &[String]) -> Result<usize> {
        if paths.is_empty() {
            return Ok(0);
        }

        // Keys travel in the body here, unencoded
        let response = self
            .http_client
            .delete(self.endpoint(&["object"], ""))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let removed: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Invalid storage response: {}", e)))?;
        Ok(removed.len())
    }
}
