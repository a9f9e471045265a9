//! Storage abstractions
//!
//! `ContentStore` is the row-oriented content backend (PostgREST tables),
//! `ObjectStore` is the blob backend (storage bucket). Both have hosted
//! implementations in [`crate::supabase`] and in-memory implementations in
//! [`memory`].

pub mod memory;

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

pub use memory::{MemoryObjectStore, MemoryStore};

/// A schemaless row as returned by the content backend
pub type Row = serde_json::Map<String, Value>;

/// Equality filter over row columns (all conditions must hold)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on a single `id` column
    pub fn id(id: impl Into<Value>) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether `row` satisfies every condition
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|(column, expected)| {
            let actual = row.get(column).unwrap_or(&Value::Null);
            values_equal(actual, expected)
        })
    }
}

/// Sort key for a select
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Select parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = self.filter.eq(column, value);
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order.push(Order {
            column: column.into(),
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order.push(Order {
            column: column.into(),
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compare two rows by this query's sort keys
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for key in &self.order {
            let left = a.get(&key.column).unwrap_or(&Value::Null);
            let right = b.get(&key.column).unwrap_or(&Value::Null);
            let ord = compare_values(left, right);
            let ord = if key.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Row-oriented content backend
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &str;

    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>>;

    /// Insert one row, returning it as stored (with generated columns)
    async fn insert(&self, table: &str, row: Row) -> Result<Row>;

    /// Patch all rows matching `filter`, returning the updated rows
    async fn update(&self, table: &str, filter: &Filter, patch: Row) -> Result<Vec<Row>>;

    /// Delete all rows matching `filter`, returning the deleted rows
    async fn delete(&self, table: &str, filter: &Filter) -> Result<Vec<Row>>;
}

/// Blob storage backend
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn name(&self) -> &str;

    /// Store `bytes` at `path` without overwriting; returns the stored key
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// Publicly reachable URL for `path`
    fn public_url(&self, path: &str) -> String;

    /// Fetch an object; `Ok(None)` when it does not exist
    async fn download(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Remove objects, returning how many existed
    async fn remove(&self, paths: &[String]) -> Result<usize>;
}

/// Loose equality: numbers compare numerically, numeric strings match numbers
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.parse::<f64>().ok() == n.as_f64()
        }
        _ => actual == expected,
    }
}

/// Total order used for sorting; nulls sort last
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}
