//! Remote document store.
//!
//! The remote side is a set of named collections of JSON documents, each
//! addressed by a string identifier. Queries support equality filters and
//! ordering by a field or by the document identifier. Nothing here knows
//! about transactions or budgets; mapping entities to documents lives in
//! [`documents`].

pub mod documents;
pub mod http;
pub mod memory;

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

/// Errors raised by a remote store.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the document service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The store cannot be reached
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// A document that does not decode into the expected record
    #[error("Invalid document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_document(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidDocument {
            id: id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for remote operations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Remote collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Transactions,
    Budgets,
    Categories,
    Users,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Transactions => "transactions",
            Collection::Budgets => "budgets",
            Collection::Categories => "categories",
            Collection::Users => "users",
        }
    }
}

/// A stored document: its identifier plus field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Field lookup; `None` when absent or when `data` is not an object.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.as_object().and_then(|map| map.get(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// What a query orders by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKey {
    Field(String),
    DocumentId,
}

impl OrderKey {
    /// Name used on the wire. The document identifier has a reserved name.
    pub fn wire_name(&self) -> &str {
        match self {
            OrderKey::Field(name) => name,
            OrderKey::DocumentId => "__name__",
        }
    }
}

/// Equality filters plus ordering, applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<(String, Value)>,
    pub order: Vec<(OrderKey, Direction)>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order.push((OrderKey::Field(field.into()), direction));
        self
    }

    pub fn order_by_id(mut self, direction: Direction) -> Self {
        self.order.push((OrderKey::DocumentId, direction));
        self
    }

    /// Whether `doc` passes every filter.
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| doc.field(field).is_some_and(|v| values_equal(v, expected)))
    }

    /// Compare two documents by this query's ordering.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (key, direction) in &self.order {
            let ordering = match key {
                OrderKey::DocumentId => a.id.cmp(&b.id),
                OrderKey::Field(name) => compare_values(a.field(name), b.field(name)),
            };
            let ordering = match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Query-string pairs for the HTTP document API.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (field, value) in &self.filters {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pairs.push(("where", format!("{}:{}", field, rendered)));
        }
        for (key, direction) in &self.order {
            pairs.push(("orderBy", format!("{}:{}", key.wire_name(), direction.as_str())));
        }
        pairs
    }
}

// Numbers compare by value so 5 and 5.0 are equal, matching how document
// stores treat integer and float fields.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Document-collection contract for the remote mirror.
///
/// Implementations must be safe to share across tasks. All calls are
/// independent; there is no batching and no transactional grouping.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create or overwrite the document at (collection, id).
    async fn set(&self, collection: Collection, id: &str, data: Value) -> RemoteResult<()>;

    /// Create a document under a store-generated identifier.
    ///
    /// # Returns
    ///
    /// The generated identifier.
    async fn add(&self, collection: Collection, data: Value) -> RemoteResult<String>;

    /// Delete the document at (collection, id). Deleting a missing
    /// document is not an error.
    async fn delete(&self, collection: Collection, id: &str) -> RemoteResult<()>;

    /// Fetch one document.
    async fn get(&self, collection: Collection, id: &str) -> RemoteResult<Option<Document>>;

    /// Fetch every document matching `query`, in query order.
    async fn query(&self, collection: Collection, query: &DocumentQuery)
        -> RemoteResult<Vec<Document>>;
}
