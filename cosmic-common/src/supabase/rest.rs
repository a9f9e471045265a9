//! PostgREST table client

use super::{backend_error, build_http_client};
use crate::store::{ContentStore, Filter, Query, Row};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// PostgREST client for `<project>/rest/v1`
pub struct SupabaseRest {
    http_client: reqwest::Client,
    base_url: String,
}

impl SupabaseRest {
    pub fn new(project_url: &str, key: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http_client: build_http_client(key, timeout)?,
            base_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    async fn rows(response: reqwest::Response) -> Result<Vec<Row>> {
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| Error::Network(format!("Invalid PostgREST response: {}", e)))
    }
}

/// Query-string pairs for a filter (`column=eq.value`)
pub fn filter_params(filter: &Filter) -> Vec<(String, String)> {
    filter
        .conditions()
        .iter()
        .map(|(column, value)| {
            let op = match value {
                Value::Null => "is.null".to_string(),
                Value::String(s) => format!("eq.{}", s),
                other => format!("eq.{}", other),
            };
            (column.clone(), op)
        })
        .collect()
}

/// Query-string pairs for a full select
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filter));

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn require_filter(filter: &Filter, op: &str) -> Result<()> {
    if filter.is_empty() {
        return Err(Error::InvalidInput(format!(
            "Refusing unfiltered {} on hosted table",
            op
        )));
    }
    Ok(())
}

#[async_trait]
impl ContentStore for SupabaseRest {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        tracing::debug!(table = %table, "PostgREST select");

        let response = self
            .http_client
            .get(self.table_url(table))
            .query(&query_params(query))
            .send()
            .await?;

        Self::rows(response).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row> {
        tracing::debug!(table = %table, "PostgREST insert");

        let response = self
            .http_client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&vec![row])
            .send()
            .await?;

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Internal(format!("Insert into {} returned no row", table)))
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> Result<Vec<Row>> {
        require_filter(filter, "update")?;
        tracing::debug!(table = %table, "PostgREST update");

        let response = self
            .http_client
            .patch(self.table_url(table))
            .query(&filter_params(filter))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;

        Self::rows(response).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        require_filter(filter, "delete")?;
        tracing::debug!(table = %table, "PostgREST delete");

        let response = self
            .http_client
            .delete(self.table_url(table))
            .query(&filter_params(filter))
            .header("Prefer", "return=representation")
            .send()
            .await?;

        Self::rows(response).await
    }
}
