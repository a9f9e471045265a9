//! Customer reviews (`custom_reviews`)

use crate::api::content::{create_active, delete_row, update_row};
use crate::{ApiError, ApiJson, ApiResult, AppState};
use axum::{
    extract::{Path, Query as QueryParams, State},
    routing::get,
    Json, Router,
};
use cosmic_common::{Query, Row};
use serde::Deserialize;
use serde_json::Value;

const TABLE: &str = "custom_reviews";

#[derive(Debug, Default, Deserialize)]
pub struct ReviewFilter {
    /// `?active=true` lists only published reviews
    pub active: Option<bool>,
}

/// GET /api/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ReviewFilter>,
) -> ApiResult<Json<Vec<Row>>> {
    let mut query = Query::new().order_asc("display_order");
    if filter.active == Some(true) {
        query = query.eq("active", true);
    }
    Ok(Json(state.content.select(TABLE, &query).await?))
}

/// GET /api/reviews/:id
pub async fn get_review(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Row>> {
    state
        .content
        .select(TABLE, &Query::new().eq("id", id).limit(1))
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Review not found".to_string()))
}

async fn create_review(State(state): State<AppState>, ApiJson(body): ApiJson<Row>) -> ApiResult<Json<Value>> {
    create_active(state, TABLE, body).await
}

async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Row>,
) -> ApiResult<Json<Value>> {
    update_row(state, TABLE, id, body).await
}

async fn delete_review(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    delete_row(state, TABLE, id).await
}

/// Build review routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", get(list_reviews).post(create_review))
        .route(
            "/api/reviews/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
}
