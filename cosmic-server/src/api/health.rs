//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Where content and uploads are kept
#[derive(Debug, Serialize)]
pub struct StorageStatus {
    /// Content store backend ("supabase" or "memory")
    pub content: String,
    pub upload_dir: String,
    /// Uploads are mirrored to object storage
    pub mirror: bool,
    /// Background-removal strategies that can run
    pub background_removal: Vec<&'static str>,
    pub email: bool,
    pub chatbot_model: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Module name ("cosmic-server")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    pub storage: StorageStatus,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;
    let sink = state.uploads.sink();

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "cosmic-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        storage: StorageStatus {
            content: state.content.name().to_string(),
            upload_dir: sink.local_dir().display().to_string(),
            mirror: sink.has_mirror(),
            background_removal: state.uploads.available_strategies(),
            email: state.notifier.is_enabled(),
            chatbot_model: state.chatbot.model().map(String::from),
        },
    })
}

/// Build health check routes
pub fn health_routes() -> Router<crate::AppState> {
    Router::new().route("/health", get(health_check))
}
