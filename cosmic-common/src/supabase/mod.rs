//! Hosted backend (Supabase) clients
//!
//! - [`SupabaseRest`]: PostgREST table access implementing [`crate::ContentStore`]
//! - [`SupabaseStorage`]: storage bucket access implementing [`crate::ObjectStore`]
//!
//! Both authenticate with the project key sent as `apikey` and as a bearer
//! token.

pub mod rest;
pub mod storage;

pub use rest::SupabaseRest;
pub use storage::SupabaseStorage;

use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::time::Duration;

const USER_AGENT: &str = concat!("cosmic-astrology/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client carrying the project key on every request
fn build_http_client(key: &str, timeout: Duration) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    let apikey = HeaderValue::from_str(key)
        .map_err(|_| Error::Config("Supabase key contains invalid characters".to_string()))?;
    let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
        .map_err(|_| Error::Config("Supabase key contains invalid characters".to_string()))?;
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);

    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

/// Convert a non-success response into [`Error::Backend`]
///
/// PostgREST errors carry `{code, message, details, hint}`; storage errors
/// carry `{statusCode, error, message}`.
async fn backend_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let parsed: Option<serde_json::Value> = serde_json::from_str(&body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    let code = field("code").or_else(|| field("error"));
    let message = field("message").unwrap_or_else(|| {
        if body.is_empty() {
            format!("HTTP {}", status)
        } else {
            body.clone()
        }
    });

    Error::Backend {
        status,
        code,
        message,
    }
}
