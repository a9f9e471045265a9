//! Chatbot endpoints

use crate::chatbot::{ChatOutcome, HistoryEntry};
use crate::{ApiError, ApiJson, ApiResult, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    /// Prior turns; malformed entries are dropped
    #[serde(default)]
    pub conversation_history: Vec<Value>,
}

impl ChatRequest {
    fn history(&self) -> Vec<HistoryEntry> {
        self.conversation_history
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect()
    }
}

/// POST /api/chatbot
pub async fn chat(State(state): State<AppState>, ApiJson(request): ApiJson<ChatRequest>) -> ApiResult<Response> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;

    let response = match state.chatbot.respond(message, &request.history()).await {
        Ok(ChatOutcome::Reply(text)) => Json(json!({ "success": true, "response": text })).into_response(),
        Ok(ChatOutcome::Disabled) => Json(json!({
            "success": false,
            "message": "Chatbot is currently disabled. Please contact us directly.",
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Chatbot request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "An error occurred while processing your request.",
                })),
            )
                .into_response()
        }
    };
    Ok(response)
}

/// GET /api/chatbot/test
pub async fn chatbot_status(State(state): State<AppState>) -> Json<Value> {
    let Some(model) = state.chatbot.model() else {
        return Json(json!({
            "configured": false,
            "message": "OpenAI API key not configured",
        }));
    };

    Json(json!({
        "configured": true,
        "enabled": state.chatbot.is_enabled().await,
        "model": model,
        "message": "Chatbot is ready",
    }))
}

/// Build chatbot routes
pub fn chatbot_routes() -> Router<AppState> {
    Router::new()
        .route("/api/chatbot", post(chat))
        .route("/api/chatbot/test", get(chatbot_status))
}
