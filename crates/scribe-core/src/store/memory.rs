use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::remote::{
    is_server_timestamp, Direction, Document, FieldOp, LiveQuery, Query, RemoteStore, Snapshot,
    StoreError,
};

/// Counters over committed writes. Tests assert on these to pin down exactly
/// how many remote round-trips an operation costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteLog {
    pub creates: u64,
    pub updates: u64,
    pub batches: u64,
}

struct Subscription {
    id: u64,
    query: Query,
    tx: mpsc::UnboundedSender<Snapshot>,
}

struct Inner {
    collections: HashMap<String, Vec<Document>>,
    subscriptions: Vec<Subscription>,
    next_sub_id: u64,
    last_server_ts: i64,
    write_log: WriteLog,
}

/// In-process `RemoteStore` with full live-query fan-out. Backs the test suite
/// and local development; the real deployment plugs a hosted document store in
/// behind the same trait.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                collections: HashMap::new(),
                subscriptions: Vec::new(),
                next_sub_id: 0,
                last_server_ts: 0,
                write_log: WriteLog::default(),
            })),
        }
    }

    pub fn write_log(&self) -> WriteLog {
        self.inner.lock().write_log
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.lock().subscriptions.len()
    }
}

impl Inner {
    /// Strictly monotonic server clock: wall millis, bumped past the previous
    /// stamp so two writes in the same millisecond still order.
    fn server_now(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_server_ts = now.max(self.last_server_ts + 1);
        self.last_server_ts
    }

    /// Replace top-level server-timestamp sentinels with the server clock.
    fn resolve_sentinels(&mut self, fields: &mut Value) {
        let Some(object) = fields.as_object_mut() else {
            return;
        };
        let keys: Vec<String> = object
            .iter()
            .filter(|(_, v)| is_server_timestamp(v))
            .map(|(k, _)| k.clone())
            .collect();
        for key in keys {
            let ts = self.server_now();
            object.insert(key, Value::from(ts));
        }
    }

    fn snapshot_for(&self, query: &Query) -> Snapshot {
        let mut docs = self
            .collections
            .get(&query.collection)
            .cloned()
            .unwrap_or_default();

        let order_key = |doc: &Document| {
            doc.fields
                .get(&query.order_by)
                .and_then(Value::as_i64)
                .unwrap_or(0)
        };
        match query.direction {
            Direction::Ascending => docs.sort_by_key(order_key),
            Direction::Descending => docs.sort_by_key(|d| std::cmp::Reverse(order_key(d))),
        }
        docs.truncate(query.limit);
        docs
    }

    /// Deliver fresh snapshots to every subscription on the collection,
    /// pruning subscriptions whose receiver has gone away.
    fn fan_out(&mut self, collection: &str) {
        let pending: Vec<(u64, mpsc::UnboundedSender<Snapshot>, Snapshot)> = self
            .subscriptions
            .iter()
            .filter(|s| s.query.collection == collection)
            .map(|s| (s.id, s.tx.clone(), self.snapshot_for(&s.query)))
            .collect();

        let mut dead = Vec::new();
        for (sub_id, tx, snapshot) in pending {
            if tx.send(snapshot).is_err() {
                dead.push(sub_id);
            }
        }
        self.subscriptions.retain(|s| !dead.contains(&s.id));
    }

    fn doc_mut(&mut self, collection: &str, id: &str) -> Result<&mut Document, StoreError> {
        self.collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }
}

fn as_array_mut<'a>(fields: &'a mut Value, field: &str) -> &'a mut Vec<Value> {
    let object = fields
        .as_object_mut()
        .expect("document fields must be a JSON object");
    let entry = object
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !entry.is_array() {
        *entry = Value::Array(Vec::new());
    }
    entry.as_array_mut().expect("just ensured array")
}

fn ensure_object(fields: Value) -> Value {
    if fields.is_object() {
        fields
    } else {
        Value::Object(Map::new())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Value) -> Result<String, StoreError> {
        let mut inner = self.inner.lock();
        let mut fields = ensure_object(fields);
        inner.resolve_sentinels(&mut fields);

        let id = Uuid::new_v4().to_string();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        inner.write_log.creates += 1;
        inner.fan_out(collection);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        ops: Vec<(String, FieldOp)>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let server_ts = inner.server_now();
        let doc = inner.doc_mut(collection, id)?;

        for (field, op) in ops {
            match op {
                FieldOp::Set(value) => {
                    doc.fields
                        .as_object_mut()
                        .expect("document fields must be a JSON object")
                        .insert(field, value);
                }
                FieldOp::ArrayUnion(value) => {
                    let arr = as_array_mut(&mut doc.fields, &field);
                    if !arr.iter().any(|v| v == &value) {
                        arr.push(value);
                    }
                }
                FieldOp::ArrayRemove(value) => {
                    as_array_mut(&mut doc.fields, &field).retain(|v| v != &value);
                }
                FieldOp::ArrayAppend(value) => {
                    as_array_mut(&mut doc.fields, &field).push(value);
                }
                FieldOp::ServerTimestamp => {
                    doc.fields
                        .as_object_mut()
                        .expect("document fields must be a JSON object")
                        .insert(field, Value::from(server_ts));
                }
            }
        }

        inner.write_log.updates += 1;
        inner.fan_out(collection);
        Ok(())
    }

    async fn merge_set(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let mut fields = ensure_object(fields);
        inner.resolve_sentinels(&mut fields);
        let incoming = fields.as_object().cloned().unwrap_or_default();

        let docs = inner.collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => {
                let object = doc
                    .fields
                    .as_object_mut()
                    .expect("document fields must be a JSON object");
                for (key, value) in incoming {
                    object.insert(key, value);
                }
            }
            None => docs.push(Document {
                id: id.to_string(),
                fields: Value::Object(incoming),
            }),
        }

        inner.write_log.updates += 1;
        inner.fan_out(collection);
        Ok(())
    }

    async fn batch_create(
        &self,
        collection: &str,
        docs: Vec<Value>,
    ) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        let mut ids = Vec::with_capacity(docs.len());
        for fields in docs {
            let mut fields = ensure_object(fields);
            inner.resolve_sentinels(&mut fields);
            let id = Uuid::new_v4().to_string();
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(Document {
                    id: id.clone(),
                    fields,
                });
            ids.push(id);
        }
        inner.write_log.batches += 1;
        inner.fan_out(collection);
        Ok(ids)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn fetch(&self, query: &Query) -> Result<Snapshot, StoreError> {
        Ok(self.inner.lock().snapshot_for(query))
    }

    fn live_query(&self, query: Query) -> Result<LiveQuery, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();

        // Initial snapshot delivered up front so subscribers never start blank.
        let initial = inner.snapshot_for(&query);
        let _ = tx.send(initial);

        let sub_id = inner.next_sub_id;
        inner.next_sub_id += 1;
        inner.subscriptions.push(Subscription {
            id: sub_id,
            query,
            tx,
        });

        let release_inner = self.inner.clone();
        Ok(LiveQuery::new(rx, move || {
            release_inner
                .lock()
                .subscriptions
                .retain(|s| s.id != sub_id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::server_timestamp;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_assigns_id_and_resolves_server_timestamp() {
        let store = MemoryStore::new();
        let id = store
            .create("quotes", json!({ "text": "hi", "createdAt": server_timestamp() }))
            .await
            .unwrap();

        let doc = store.get("quotes", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["text"], "hi");
        assert!(doc.fields["createdAt"].as_i64().unwrap() > 0);
        assert_eq!(store.write_log().creates, 1);
    }

    #[tokio::test]
    async fn test_server_timestamps_are_strictly_increasing() {
        let store = MemoryStore::new();
        let a = store
            .create("quotes", json!({ "createdAt": server_timestamp(), "text": "a" }))
            .await
            .unwrap();
        let b = store
            .create("quotes", json!({ "createdAt": server_timestamp(), "text": "b" }))
            .await
            .unwrap();

        let ts_a = store.get("quotes", &a).await.unwrap().unwrap().fields["createdAt"]
            .as_i64()
            .unwrap();
        let ts_b = store.get("quotes", &b).await.unwrap().unwrap().fields["createdAt"]
            .as_i64()
            .unwrap();
        assert!(ts_b > ts_a);
    }

    #[tokio::test]
    async fn test_array_union_dedupes() {
        let store = MemoryStore::new();
        let id = store
            .create("quotes", json!({ "text": "q", "likes": [] }))
            .await
            .unwrap();

        for _ in 0..3 {
            store
                .update(
                    "quotes",
                    &id,
                    vec![("likes".to_string(), FieldOp::ArrayUnion(json!("u1")))],
                )
                .await
                .unwrap();
        }

        let doc = store.get("quotes", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["likes"], json!(["u1"]));
    }

    #[tokio::test]
    async fn test_array_remove_and_append() {
        let store = MemoryStore::new();
        let id = store
            .create("quotes", json!({ "text": "q", "likes": ["u1", "u2"] }))
            .await
            .unwrap();

        store
            .update(
                "quotes",
                &id,
                vec![
                    ("likes".to_string(), FieldOp::ArrayRemove(json!("u1"))),
                    ("comments".to_string(), FieldOp::ArrayAppend(json!({ "text": "c" }))),
                ],
            )
            .await
            .unwrap();

        let doc = store.get("quotes", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["likes"], json!(["u2"]));
        assert_eq!(doc.fields["comments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_document_errors() {
        let store = MemoryStore::new();
        let err = store
            .update(
                "quotes",
                "nope",
                vec![("read".to_string(), FieldOp::Set(json!(true)))],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_merge_set_merges_and_upserts() {
        let store = MemoryStore::new();
        store
            .merge_set("profiles", "info", json!({ "name": "Ada" }))
            .await
            .unwrap();
        store
            .merge_set("profiles", "info", json!({ "penName": "Countess" }))
            .await
            .unwrap();

        let doc = store.get("profiles", "info").await.unwrap().unwrap();
        assert_eq!(doc.fields["name"], "Ada");
        assert_eq!(doc.fields["penName"], "Countess");
    }

    #[tokio::test]
    async fn test_live_query_delivers_initial_then_updated_snapshots() {
        let store = MemoryStore::new();
        let mut live = store
            .live_query(Query::descending("quotes", "createdAt", 50))
            .unwrap();

        assert!(live.recv().await.unwrap().is_empty());

        store
            .create("quotes", json!({ "text": "q", "createdAt": server_timestamp() }))
            .await
            .unwrap();

        let snapshot = live.recv().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].fields["text"], "q");
    }

    #[tokio::test]
    async fn test_live_query_orders_and_limits() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .create(
                    "quotes",
                    json!({ "text": format!("q{i}"), "createdAt": server_timestamp() }),
                )
                .await
                .unwrap();
        }

        let snapshot = store
            .fetch(&Query::descending("quotes", "createdAt", 3))
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].fields["text"], "q4");
        assert_eq!(snapshot[2].fields["text"], "q2");

        let ascending = store
            .fetch(&Query::ascending("quotes", "createdAt", 10))
            .await
            .unwrap();
        assert_eq!(ascending[0].fields["text"], "q0");
    }

    #[tokio::test]
    async fn test_dropping_handle_releases_subscription() {
        let store = MemoryStore::new();
        let live = store
            .live_query(Query::descending("quotes", "createdAt", 50))
            .unwrap();
        assert_eq!(store.subscription_count(), 1);
        drop(live);
        assert_eq!(store.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_create_is_one_batch() {
        let store = MemoryStore::new();
        let ids = store
            .batch_create(
                "quotes",
                vec![
                    json!({ "text": "a", "createdAt": server_timestamp() }),
                    json!({ "text": "b", "createdAt": server_timestamp() }),
                ],
            )
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.write_log().batches, 1);
        assert_eq!(store.write_log().creates, 0);
    }

    #[tokio::test]
    async fn test_updates_only_fan_out_to_matching_collection() {
        let store = MemoryStore::new();
        let mut quotes = store
            .live_query(Query::descending("quotes", "createdAt", 50))
            .unwrap();
        let mut notifs = store
            .live_query(Query::descending("notifications", "createdAt", 50))
            .unwrap();
        quotes.recv().await.unwrap();
        notifs.recv().await.unwrap();

        store
            .create("quotes", json!({ "text": "q", "createdAt": server_timestamp() }))
            .await
            .unwrap();

        assert_eq!(quotes.recv().await.unwrap().len(), 1);
        assert!(notifs.try_recv().is_none());
    }
}
