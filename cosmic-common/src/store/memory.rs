//! In-memory stores
//!
//! Used when the hosted backend is not configured, and by tests. Nothing is
//! persisted across restarts.

use super::{ContentStore, Filter, ObjectStore, Query, Row};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Row store keyed by table name; assigns integer ids and `created_at`
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Snapshot of a table in insertion order
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| query.filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| query.compare(a, b));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row> {
        if !row.contains_key("id") {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            row.insert("id".to_string(), Value::from(id));
        }
        if !row.contains_key("created_at") {
            row.insert("created_at".to_string(), Value::from(Utc::now().to_rfc3339()));
        }

        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> Result<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|r| filter.matches(r)) {
            for (k, v) in &patch {
                row.insert(k.clone(), v.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let (deleted, kept): (Vec<Row>, Vec<Row>) =
            rows.drain(..).partition(|r| filter.matches(r));
        *rows = kept;
        Ok(deleted)
    }
}

/// Object store backed by a map; refuses to overwrite like the hosted bucket
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains_key(path)
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(path) {
            return Err(Error::Backend {
                status: 409,
                code: Some("Duplicate".to_string()),
                message: format!("The resource already exists: {}", path),
            });
        }
        objects.insert(path.to_string(), bytes);
        Ok(path.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn download(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.read().await.get(path).cloned())
    }

    async fn remove(&self, paths: &[String]) -> Result<usize> {
        let mut objects = self.objects.write().await;
        Ok(paths.iter().filter(|p| objects.remove(*p).is_some()).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_created_at() {
        let store = MemoryStore::new();
        let a = store.insert("t", row(json!({"title": "a"}))).await.unwrap();
        let b = store.insert("t", row(json!({"title": "b"}))).await.unwrap();

        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
        assert!(a.contains_key("created_at"));
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (order, active) in [(3, true), (1, true), (2, false), (0, true)] {
            store
                .insert("slides", row(json!({"display_order": order, "active": active})))
                .await
                .unwrap();
        }

        let query = Query::new()
            .eq("active", true)
            .order_asc("display_order")
            .limit(2);
        let rows = store.select("slides", &query).await.unwrap();

        let orders: Vec<_> = rows.iter().map(|r| r["display_order"].clone()).collect();
        assert_eq!(orders, vec![json!(0), json!(1)]);
    }

    #[tokio::test]
    async fn test_update_and_delete_by_id() {
        let store = MemoryStore::new();
        let a = store.insert("t", row(json!({"title": "a"}))).await.unwrap();
        store.insert("t", row(json!({"title": "b"}))).await.unwrap();

        let updated = store
            .update("t", &Filter::id(a["id"].clone()), row(json!({"title": "z"})))
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["title"], json!("z"));

        let deleted = store.delete("t", &Filter::id("1")).await.unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(store.rows("t").await.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let store = MemoryStore::new();
        assert!(store.select("nope", &Query::new()).await.unwrap().is_empty());
        assert!(store
            .update("nope", &Filter::id(1), Row::new())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_object_store_refuses_overwrite() {
        let objects = MemoryObjectStore::new("http://mirror/public/bucket");
        objects
            .upload("others/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        let again = objects.upload("others/a.png", vec![4], "image/png").await;
        assert!(matches!(again, Err(Error::Backend { status: 409, .. })));
        assert_eq!(
            objects.public_url("others/a.png"),
            "http://mirror/public/bucket/others/a.png"
        );
    }

    #[tokio::test]
    async fn test_object_store_remove() {
        let objects = MemoryObjectStore::new("http://mirror");
        assert!(objects.is_empty().await);
        objects.upload("others/a.png", vec![1], "image/png").await.unwrap();
        objects.upload("services/c.png", vec![1, 2], "image/png").await.unwrap();

        let removed = objects
            .remove(&["services/c.png".to_string(), "services/missing.png".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(objects.download("services/c.png").await.unwrap().is_none());
        assert!(objects.contains("others/a.png").await);
    }
}
