//! HTTP API handlers for cosmic-server

pub mod admin;
pub mod chatbot;
pub mod content;
pub mod health;
pub mod leads;
pub mod reviews;
pub mod services;
pub mod upload;

pub use admin::admin_routes;
pub use chatbot::chatbot_routes;
pub use content::content_routes;
pub use health::health_routes;
pub use leads::lead_routes;
pub use reviews::review_routes;
pub use services::service_routes;
pub use upload::upload_routes;

use axum::{http::StatusCode, Json};
use chrono::Utc;
use cosmic_common::Row;
use serde_json::{json, Value};

/// Unknown route
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}

/// Current time as stored in `created_at` / `updated_at`
pub(crate) fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

/// `{success: true, data}` with the first affected row (or null)
pub(crate) fn first_row_response(rows: Vec<Row>) -> Json<Value> {
    let data = rows.into_iter().next().map(Value::Object).unwrap_or(Value::Null);
    Json(json!({ "success": true, "data": data }))
}
