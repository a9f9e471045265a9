//! Service catalogues (`/api/astrological-services`, `/api/pooja-services`)
//!
//! Inserts and updates only touch whitelisted columns. Deletes are soft:
//! the row is deactivated and drops out of the public listing.

use crate::api::{first_row_response, timestamp};
use crate::{ApiError, ApiJson, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use cosmic_common::{Filter, Query, Row};
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Astrological,
    Pooja,
}

impl Catalog {
    pub fn table(self) -> &'static str {
        match self {
            Catalog::Astrological => "astrological_services",
            Catalog::Pooja => "pooja_services",
        }
    }

    fn route(self) -> &'static str {
        match self {
            Catalog::Astrological => "/api/astrological-services",
            Catalog::Pooja => "/api/pooja-services",
        }
    }

    /// Columns a PUT may change
    pub fn updatable(self) -> &'static [&'static str] {
        match self {
            Catalog::Astrological => &["title", "image_url", "active", "display_order"],
            Catalog::Pooja => &[
                "title",
                "description",
                "image_url",
                "icon_url",
                "price",
                "duration",
                "benefits",
                "items_included",
                "is_featured",
                "display_order",
            ],
        }
    }

    /// Whitelisted insert row with defaults for missing fields
    pub fn new_row(self, body: &Row) -> Row {
        let field = |key: &str, default: Value| match body.get(key) {
            Some(value) if !value.is_null() => value.clone(),
            _ => default,
        };

        let mut row = Row::new();
        row.insert("title".into(), field("title", Value::Null));
        match self {
            Catalog::Astrological => {
                row.insert("image_url".into(), field("image_url", json!("")));
                row.insert("display_order".into(), field("display_order", json!(0)));
                row.insert("active".into(), field("active", json!(true)));
            }
            Catalog::Pooja => {
                row.insert("description".into(), field("description", json!("")));
                row.insert("image_url".into(), field("image_url", json!("")));
                row.insert("icon_url".into(), field("icon_url", json!("")));
                row.insert("price".into(), field("price", Value::Null));
                row.insert("duration".into(), field("duration", json!("")));
                row.insert("benefits".into(), field("benefits", json!([])));
                row.insert("items_included".into(), field("items_included", json!([])));
                row.insert("is_featured".into(), field("is_featured", json!(false)));
                row.insert("display_order".into(), field("display_order", json!(0)));
                row.insert("active".into(), json!(true));
            }
        }
        row.insert("created_at".into(), timestamp());
        row
    }

    /// Whitelisted subset of `body` plus `updated_at`
    pub fn patch(self, body: &Row) -> Row {
        let mut patch: Row = self
            .updatable()
            .iter()
            .filter_map(|key| body.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect();
        patch.insert("updated_at".into(), timestamp());
        patch
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderItem {
    pub id: Value,
    pub display_order: Value,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    #[serde(default)]
    pub services: Vec<ReorderItem>,
}

async fn list(state: AppState, catalog: Catalog) -> ApiResult<Json<Vec<Row>>> {
    let query = Query::new().eq("active", true).order_asc("display_order");
    Ok(Json(state.content.select(catalog.table(), &query).await?))
}

async fn get_one(state: AppState, catalog: Catalog, id: String) -> ApiResult<Json<Row>> {
    let query = Query::new().eq("id", id).limit(1);
    state
        .content
        .select(catalog.table(), &query)
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Service not found".to_string()))
}

async fn create(state: AppState, catalog: Catalog, body: Row) -> ApiResult<Json<Value>> {
    let row = state.content.insert(catalog.table(), catalog.new_row(&body)).await?;
    info!(table = catalog.table(), "Created service");
    Ok(Json(json!({ "success": true, "data": row })))
}

async fn update(state: AppState, catalog: Catalog, id: String, body: Row) -> ApiResult<Json<Value>> {
    let rows = state
        .content
        .update(catalog.table(), &Filter::id(id), catalog.patch(&body))
        .await?;
    Ok(first_row_response(rows))
}

async fn deactivate(state: AppState, catalog: Catalog, id: String) -> ApiResult<Json<Value>> {
    let mut patch = Row::new();
    patch.insert("active".into(), Value::Bool(false));
    patch.insert("updated_at".into(), timestamp());
    state
        .content
        .update(catalog.table(), &Filter::id(id.clone()), patch)
        .await?;
    info!(table = catalog.table(), id = %id, "Deactivated service");
    Ok(Json(json!({ "success": true, "message": "Service deleted successfully" })))
}

async fn reorder(state: AppState, catalog: Catalog, request: ReorderRequest) -> ApiResult<Json<Value>> {
    let updates = request.services.into_iter().map(|item| {
        let store = state.content.clone();
        let mut patch = Row::new();
        patch.insert("display_order".into(), item.display_order);
        patch.insert("updated_at".into(), timestamp());
        async move { store.update(catalog.table(), &Filter::id(item.id), patch).await }
    });
    let results = try_join_all(updates).await?;
    info!(table = catalog.table(), count = results.len(), "Reordered services");
    Ok(Json(json!({ "success": true, "message": "Display order updated" })))
}

fn catalog_routes(catalog: Catalog) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |State(state): State<AppState>| list(state, catalog))
                .post(move |State(state): State<AppState>, ApiJson(body): ApiJson<Row>| create(state, catalog, body)),
        )
        .route(
            "/bulk/reorder",
            put(move |State(state): State<AppState>, ApiJson(request): ApiJson<ReorderRequest>| {
                reorder(state, catalog, request)
            }),
        )
        .route(
            "/:id",
            get(move |State(state): State<AppState>, Path(id): Path<String>| get_one(state, catalog, id))
                .put(
                    move |State(state): State<AppState>, Path(id): Path<String>, ApiJson(body): ApiJson<Row>| {
                        update(state, catalog, id, body)
                    },
                )
                .delete(move |State(state): State<AppState>, Path(id): Path<String>| deactivate(state, catalog, id)),
        )
}

/// Build service catalogue routes
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .nest(Catalog::Astrological.route(), catalog_routes(Catalog::Astrological))
        .nest(Catalog::Pooja.route(), catalog_routes(Catalog::Pooja))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_astrological_defaults() {
        let new = Catalog::Astrological.new_row(&row(json!({"title": "Palmistry", "secret": "x"})));
        assert_eq!(new["title"], "Palmistry");
        assert_eq!(new["image_url"], "");
        assert_eq!(new["display_order"], 0);
        assert_eq!(new["active"], true);
        assert!(new.contains_key("created_at"));
        assert!(!new.contains_key("secret"));
    }

    #[test]
    fn test_astrological_keeps_inactive_flag() {
        let new = Catalog::Astrological.new_row(&row(json!({"title": "Draft", "active": false})));
        assert_eq!(new["active"], false);
    }

    #[test]
    fn test_pooja_defaults() {
        let new = Catalog::Pooja.new_row(&row(json!({"title": "Ganesh Pooja", "price": 1100})));
        assert_eq!(new["price"], 1100);
        assert_eq!(new["benefits"], json!([]));
        assert_eq!(new["items_included"], json!([]));
        assert_eq!(new["is_featured"], false);
        assert_eq!(new["active"], true);
    }

    #[test]
    fn test_patch_is_whitelisted() {
        let patch = Catalog::Astrological.patch(&row(json!({"title": "New", "created_at": "x", "price": 5})));
        assert_eq!(patch["title"], "New");
        assert!(!patch.contains_key("created_at"));
        assert!(!patch.contains_key("price"));
        assert!(patch.contains_key("updated_at"));

        let patch = Catalog::Pooja.patch(&row(json!({"price": 5, "active": false})));
        assert_eq!(patch["price"], 5);
        assert!(!patch.contains_key("active"));
    }
}
