//! Bookings and contact messages
//!
//! A new lead is stored first; the confirmation and admin emails follow and
//! their failures never fail the request.

use crate::api::{first_row_response, timestamp};
use crate::leads::{BookingRequest, ContactRequest};
use crate::{ApiError, ApiJson, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use cosmic_common::{Filter, Query, Row};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

const BOOKINGS: &str = "bookings";
const CONTACT_MESSAGES: &str = "contact_messages";

#[derive(Debug, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadFlagUpdate {
    pub is_read: Option<bool>,
}

async fn newest_first(state: &AppState, table: &str) -> ApiResult<Json<Vec<Row>>> {
    let query = Query::new().order_desc("created_at");
    Ok(Json(state.content.select(table, &query).await?))
}

async fn patch_with_timestamp(state: &AppState, table: &str, id: String, column: &str, value: Value) -> ApiResult<Json<Value>> {
    let mut patch = Row::new();
    patch.insert(column.to_string(), value);
    patch.insert("updated_at".into(), timestamp());
    let rows = state.content.update(table, &Filter::id(id), patch).await?;
    Ok(first_row_response(rows))
}

// ============================================================================
// Bookings
// ============================================================================

/// GET /api/bookings
pub async fn list_bookings(State(state): State<AppState>) -> ApiResult<Json<Vec<Row>>> {
    newest_first(&state, BOOKINGS).await
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> ApiResult<Json<Value>> {
    let booking = request
        .validate()
        .ok_or_else(|| ApiError::BadRequest("Missing required fields".to_string()))?;

    let row = state.content.insert(BOOKINGS, booking.to_row()).await?;
    info!(service = %booking.service, id = ?row.get("id"), "Booking created");

    state.notifier.booking_created(&booking, row.get("id")).await;

    Ok(Json(json!({
        "success": true,
        "message": "Booking created successfully",
        "data": row,
    })))
}

/// PUT /api/bookings/:id
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<BookingStatusUpdate>,
) -> ApiResult<Json<Value>> {
    let status = update
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Status is required".to_string()))?;
    patch_with_timestamp(&state, BOOKINGS, id, "status", Value::String(status)).await
}

/// DELETE /api/bookings/:id
pub async fn delete_booking(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.content.delete(BOOKINGS, &Filter::id(id)).await?;
    Ok(Json(json!({ "success": true, "message": "Booking deleted" })))
}

// ============================================================================
// Contact messages
// ============================================================================

/// GET /api/contact-messages
pub async fn list_contact_messages(State(state): State<AppState>) -> ApiResult<Json<Vec<Row>>> {
    newest_first(&state, CONTACT_MESSAGES).await
}

/// POST /api/contact-messages
pub async fn create_contact_message(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ContactRequest>,
) -> ApiResult<Json<Value>> {
    let message = request
        .validate()
        .ok_or_else(|| ApiError::BadRequest("Missing required fields".to_string()))?;

    let row = state.content.insert(CONTACT_MESSAGES, message.to_row()).await?;
    info!(id = ?row.get("id"), "Contact message received");

    state.notifier.contact_received(&message, row.get("id")).await;

    Ok(Json(json!({
        "success": true,
        "message": "Message sent successfully",
        "data": row,
    })))
}

/// PUT /api/contact-messages/:id
pub async fn mark_contact_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ReadFlagUpdate>,
) -> ApiResult<Json<Value>> {
    let is_read = update
        .is_read
        .ok_or_else(|| ApiError::BadRequest("is_read is required".to_string()))?;
    patch_with_timestamp(&state, CONTACT_MESSAGES, id, "is_read", Value::Bool(is_read)).await
}

/// DELETE /api/contact-messages/:id
pub async fn delete_contact_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.content.delete(CONTACT_MESSAGES, &Filter::id(id)).await?;
    Ok(Json(json!({ "success": true, "message": "Contact message deleted" })))
}

/// Build booking and contact routes
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", get(list_bookings).post(create_booking))
        .route(
            "/api/bookings/:id",
            put(update_booking_status).delete(delete_booking),
        )
        .route(
            "/api/contact-messages",
            get(list_contact_messages).post(create_contact_message),
        )
        .route(
            "/api/contact-messages/:id",
            put(mark_contact_message).delete(delete_contact_message),
        )
}
