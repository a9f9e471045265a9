//! Remote segmentation service client
//!
//! Sends the normalized PNG to an HTTP endpoint that answers with a cut-out
//! image. The answer must decode as an image or the attempt fails; whatever
//! format it arrives in, it is stored as an RGBA PNG.

use super::{StrategyKind, TransparencyStrategy};
use crate::error::{MediaError, Result};
use crate::normalize::{encode_png_best, NormalizedImage};
use async_trait::async_trait;
use cosmic_common::config::BackgroundRemovalConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

const USER_AGENT: &str = concat!("cosmic-astrology/", env!("CARGO_PKG_VERSION"));

pub struct RemoteSegmenter {
    http_client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl RemoteSegmenter {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| MediaError::Segmentation(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint,
            api_key,
        })
    }

    pub fn from_config(config: &BackgroundRemovalConfig) -> Result<Self> {
        Self::new(config.endpoint.clone(), config.api_key.clone(), config.timeout())
    }
}

#[async_trait]
impl TransparencyStrategy for RemoteSegmenter {
    fn name(&self) -> &'static str {
        "segmentation"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Segmentation
    }

    fn is_available(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn apply(&self, input: &NormalizedImage) -> Result<Vec<u8>> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or_else(|| MediaError::Segmentation("No endpoint configured".to_string()))?;

        tracing::debug!(endpoint = %endpoint, size = input.png.len(), "Requesting segmentation");

        let mut request = self
            .http_client
            .post(endpoint)
            .header(CONTENT_TYPE, "image/png")
            .header(ACCEPT, "image/png")
            .body(input.png.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MediaError::Segmentation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Segmentation(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaError::Segmentation(e.to_string()))?
            .to_vec();

        let png = tokio::task::spawn_blocking(move || {
            let cutout = image::load_from_memory(&bytes)
                .map_err(|e| MediaError::Segmentation(format!("Output is not a decodable image: {}", e)))?;
            encode_png_best(&cutout.to_rgba8())
        })
        .await??;

        Ok(png)
    }
}
