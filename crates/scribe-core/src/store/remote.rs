use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::sync::mpsc;

/// A remote document: server-assigned id plus a JSON object of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

/// The full result set of a query, superseding any prior snapshot.
pub type Snapshot = Vec<Document>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// An ordered, limited collection query.
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub order_by: String,
    pub direction: Direction,
    pub limit: usize,
}

impl Query {
    pub fn descending(collection: impl Into<String>, order_by: impl Into<String>, limit: usize) -> Self {
        Self {
            collection: collection.into(),
            order_by: order_by.into(),
            direction: Direction::Descending,
            limit,
        }
    }

    pub fn ascending(collection: impl Into<String>, order_by: impl Into<String>, limit: usize) -> Self {
        Self {
            collection: collection.into(),
            order_by: order_by.into(),
            direction: Direction::Ascending,
            limit,
        }
    }
}

/// Server-applied field mutation. These execute atomically on the store so
/// concurrent writers never race a client-side read-modify-write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Overwrite the field.
    Set(Value),
    /// Add the element unless an equal element is already present.
    ArrayUnion(Value),
    /// Remove every element equal to the given one.
    ArrayRemove(Value),
    /// Append the element unconditionally.
    ArrayAppend(Value),
    /// Set the field to the server's clock.
    ServerTimestamp,
}

const SERVER_TIMESTAMP_SENTINEL: &str = "__server_timestamp__";

/// Sentinel field value resolved to the server clock at commit time.
pub fn server_timestamp() -> Value {
    json!({ "__sentinel": SERVER_TIMESTAMP_SENTINEL })
}

pub(crate) fn is_server_timestamp(value: &Value) -> bool {
    value
        .get("__sentinel")
        .and_then(Value::as_str)
        .map(|s| s == SERVER_TIMESTAMP_SENTINEL)
        .unwrap_or(false)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    DocumentNotFound { collection: String, id: String },
    #[error("store backend error: {0}")]
    Backend(String),
}

/// An active subscription. Each `recv` yields the complete current result set;
/// there is no diffing. Dropping the handle releases the subscription so a
/// torn-down view can never be mutated by a stale callback.
pub struct LiveQuery {
    rx: mpsc::UnboundedReceiver<Snapshot>,
    _guard: SubscriptionGuard,
}

impl LiveQuery {
    pub fn new(
        rx: mpsc::UnboundedReceiver<Snapshot>,
        on_release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            _guard: SubscriptionGuard {
                release: Some(Box::new(on_release)),
            },
        }
    }

    /// Await the next snapshot. `None` means the subscription dropped at the
    /// transport layer.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Take a snapshot if one is already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }
}

struct SubscriptionGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// The document store collaborator: keyed collections, atomic field mutations,
/// server timestamps, and snapshot-delivering live queries.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Create a document with an auto-assigned id; returns the id.
    async fn create(&self, collection: &str, fields: Value) -> Result<String, StoreError>;

    /// Apply atomic field mutations to one document.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        ops: Vec<(String, FieldOp)>,
    ) -> Result<(), StoreError>;

    /// Merge fields into a document, creating it if absent.
    async fn merge_set(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError>;

    /// Create several documents in one atomic batch; returns their ids.
    async fn batch_create(
        &self,
        collection: &str,
        docs: Vec<Value>,
    ) -> Result<Vec<String>, StoreError>;

    /// Read one document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// One-shot ordered/limited read.
    async fn fetch(&self, query: &Query) -> Result<Snapshot, StoreError>;

    /// Subscribe. The current snapshot is delivered immediately, then again
    /// after every committed write to the collection.
    fn live_query(&self, query: Query) -> Result<LiveQuery, StoreError>;
}
