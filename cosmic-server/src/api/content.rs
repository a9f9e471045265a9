//! Site content tables
//!
//! Collections (slides, menu items, announcements...) hold many rows and
//! list only active ones. Singletons (business info, about section...)
//! hold one row that POST/PUT creates or updates in place.

use crate::api::{first_row_response, timestamp};
use crate::{ApiJson, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use cosmic_common::{Filter, Query, Row};
use serde_json::{json, Value};
use tracing::info;

/// Route segment ↔ table for collections under `/api/content`
pub const COLLECTIONS: &[(&str, &str)] = &[
    ("hero-slides", "hero_slides"),
    ("gallery-slides", "gallery_slides"),
    ("astrological-services", "astrological_services"),
    ("pooja-services", "pooja_services"),
    ("expert-solutions", "expert_solutions"),
    ("menu-items", "menu_items"),
    ("announcements", "announcement_bar"),
];

/// Collections also served directly under `/api`
const COLLECTION_ALIASES: &[(&str, &str)] = &[
    ("hero-slides", "hero_slides"),
    ("gallery-slides", "gallery_slides"),
    ("announcements", "announcement_bar"),
];

pub const SINGLETONS: &[(&str, &str)] = &[
    ("business-info", "business_info"),
    ("about-section", "about_section"),
    ("chatbot-config", "chatbot_config"),
    ("navbar-settings", "navbar_settings"),
];

// ============================================================================
// Shared table operations
// ============================================================================

/// Active rows ordered by `display_order`
pub async fn list_active(state: AppState, table: &'static str) -> ApiResult<Json<Vec<Row>>> {
    let query = Query::new().eq("active", true).order_asc("display_order");
    Ok(Json(state.content.select(table, &query).await?))
}

/// Insert with `active: true`
pub async fn create_active(state: AppState, table: &'static str, mut body: Row) -> ApiResult<Json<Value>> {
    body.insert("active".into(), Value::Bool(true));
    let row = state.content.insert(table, body).await?;
    info!(table, "Created row");
    Ok(Json(json!({ "success": true, "data": row })))
}

/// Patch a row, stamping `updated_at`
pub async fn update_row(state: AppState, table: &'static str, id: String, mut body: Row) -> ApiResult<Json<Value>> {
    body.remove("id");
    body.insert("updated_at".into(), timestamp());
    let rows = state.content.update(table, &Filter::id(id), body).await?;
    Ok(first_row_response(rows))
}

/// Hard delete
pub async fn delete_row(state: AppState, table: &'static str, id: String) -> ApiResult<Json<Value>> {
    let removed = state.content.delete(table, &Filter::id(id.clone())).await?;
    info!(table, id = %id, removed = removed.len(), "Deleted row");
    Ok(Json(json!({ "success": true })))
}

/// First row or `{}`
pub async fn get_singleton(state: AppState, table: &'static str) -> ApiResult<Json<Value>> {
    let rows = state.content.select(table, &Query::new().limit(1)).await?;
    let row = rows.into_iter().next().unwrap_or_default();
    Ok(Json(Value::Object(row)))
}

/// Update the existing row, or insert the first one
pub async fn upsert_singleton(state: AppState, table: &'static str, mut body: Row) -> ApiResult<Json<Value>> {
    body.remove("id");
    let existing = state.content.select(table, &Query::new().limit(1)).await?;
    let existing_id = existing.into_iter().next().and_then(|row| row.get("id").cloned());

    match existing_id {
        Some(id) => {
            body.insert("updated_at".into(), timestamp());
            let rows = state.content.update(table, &Filter::id(id), body).await?;
            info!(table, "Updated singleton");
            Ok(first_row_response(rows))
        }
        None => {
            body.insert("created_at".into(), timestamp());
            let row = state.content.insert(table, body).await?;
            info!(table, "Created singleton");
            Ok(Json(json!({ "success": true, "data": row })))
        }
    }
}

// ============================================================================
// Routers
// ============================================================================

/// GET/POST on `/`, PUT/DELETE on `/:id`
pub fn collection(table: &'static str) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |State(state): State<AppState>| list_active(state, table)).post(
                move |State(state): State<AppState>, ApiJson(body): ApiJson<Row>| create_active(state, table, body),
            ),
        )
        .route(
            "/:id",
            put(
                move |State(state): State<AppState>, Path(id): Path<String>, ApiJson(body): ApiJson<Row>| {
                    update_row(state, table, id, body)
                },
            )
            .delete(move |State(state): State<AppState>, Path(id): Path<String>| delete_row(state, table, id)),
        )
}

/// GET on `/`, POST and PUT upsert
pub fn singleton(table: &'static str) -> Router<AppState> {
    Router::new().route(
        "/",
        get(move |State(state): State<AppState>| get_singleton(state, table))
            .post(move |State(state): State<AppState>, ApiJson(body): ApiJson<Row>| upsert_singleton(state, table, body))
            .put(move |State(state): State<AppState>, ApiJson(body): ApiJson<Row>| upsert_singleton(state, table, body)),
    )
}

/// Build content routes
pub fn content_routes() -> Router<AppState> {
    let mut router = Router::new();

    for &(segment, table) in COLLECTIONS {
        router = router.nest(&format!("/api/content/{}", segment), collection(table));
    }
    for &(segment, table) in COLLECTION_ALIASES {
        router = router.nest(&format!("/api/{}", segment), collection(table));
    }
    for &(segment, table) in SINGLETONS {
        router = router
            .nest(&format!("/api/content/{}", segment), singleton(table))
            .nest(&format!("/api/{}", segment), singleton(table));
    }

    router.route(
        "/api/expert-solutions",
        get(|State(state): State<AppState>| list_active(state, "expert_solutions")),
    )
}
