//! Admin login and password management
//!
//! The expected password comes from the `admin_credentials` row, else the
//! configured `admin_password`, else the development default.

use crate::api::timestamp;
use crate::{ApiError, ApiJson, ApiResult, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use cosmic_common::{Filter, Query, Row};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

const CREDENTIALS: &str = "admin_credentials";

/// Used only when neither the credentials table nor the config has a password
pub const DEVELOPMENT_PASSWORD: &str = "admin123";

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Stored credentials row, if readable
async fn credentials_row(state: &AppState) -> Option<Row> {
    match state.content.select(CREDENTIALS, &Query::new().limit(1)).await {
        Ok(rows) => rows.into_iter().next(),
        Err(e) => {
            warn!(error = %e, "Could not read admin credentials, using configured password");
            None
        }
    }
}

async fn expected_password(state: &AppState) -> String {
    let stored = credentials_row(state)
        .await
        .and_then(|row| row.get("password").and_then(Value::as_str).map(String::from));

    if let Some(password) = stored {
        return password;
    }
    if let Some(password) = &state.settings.admin_password {
        return password.clone();
    }
    warn!("No admin password configured, using the development default");
    DEVELOPMENT_PASSWORD.to_string()
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

/// POST /api/admin/login
pub async fn login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> ApiResult<Response> {
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Password is required".to_string()))?;

    if password == expected_password(&state).await {
        info!("Admin login succeeded");
        Ok(Json(json!({ "success": true, "message": "Login successful" })).into_response())
    } else {
        warn!("Admin login failed");
        Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Invalid password" })),
        )
            .into_response())
    }
}

/// POST /api/admin/change-password
pub async fn change_password(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Response> {
    let (Some(current), Some(new_password)) = (
        request.current_password.filter(|p| !p.is_empty()),
        request.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Ok(rejected(
            StatusCode::BAD_REQUEST,
            "Current password and new password are required",
        ));
    };

    if new_password.chars().count() < MIN_PASSWORD_LENGTH {
        return Ok(rejected(
            StatusCode::BAD_REQUEST,
            "New password must be at least 6 characters long",
        ));
    }

    if current != expected_password(&state).await {
        warn!("Password change rejected: wrong current password");
        return Ok(rejected(StatusCode::UNAUTHORIZED, "Current password is incorrect"));
    }

    let existing_id = credentials_row(&state).await.and_then(|row| row.get("id").cloned());
    let mut row = Row::new();
    row.insert("password".into(), Value::String(new_password));

    match existing_id {
        Some(id) => {
            row.insert("updated_at".into(), timestamp());
            state.content.update(CREDENTIALS, &Filter::id(id), row).await?;
        }
        None => {
            state.content.insert(CREDENTIALS, row).await?;
        }
    }

    info!("Admin password updated");
    Ok(Json(json!({ "success": true, "message": "Password updated successfully" })).into_response())
}

/// POST /api/admin/logout
pub async fn logout() -> Json<Value> {
    Json(json!({ "success": true, "message": "Logout successful" }))
}

/// Build admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/change-password", post(change_password))
        .route("/api/admin/logout", post(logout))
}
