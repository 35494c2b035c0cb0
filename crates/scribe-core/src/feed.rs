use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::constants::{DEMO_AUTHOR_ID, DEMO_QUOTES, FEED_PAGE_SIZE, OPTIMISTIC_ID_PREFIX};
use crate::models::Quote;
use crate::store::{server_timestamp, Query, RemoteStore, Snapshot, StoreError};

/// Owns the live quote-feed subscription and the local view mapped from it.
///
/// Every snapshot replaces the view wholesale; nothing is patched in place, so
/// the view can never drift from the remote source of truth. On a cold start
/// against an empty collection it installs an optimistic demo view in the same
/// tick and commits the demo data behind it.
pub struct FeedSynchronizer {
    store: Arc<dyn RemoteStore>,
    collection: String,
    live: crate::store::LiveQuery,
    quotes: Vec<Quote>,
    loading: bool,
    /// One-shot seeding latch, scoped to this synchronizer instance. Reset by
    /// constructing a new synchronizer, never shared across views.
    seeded: bool,
}

impl FeedSynchronizer {
    pub fn new(store: Arc<dyn RemoteStore>, collection: String) -> Result<Self, StoreError> {
        let live = store.live_query(Query::descending(
            collection.clone(),
            "createdAt",
            FEED_PAGE_SIZE,
        ))?;
        Ok(Self {
            store,
            collection,
            live,
            quotes: Vec::new(),
            loading: true,
            seeded: false,
        })
    }

    /// Await and apply the next remote snapshot. Returns `false` when the
    /// subscription has dropped; the loading flag is cleared either way so the
    /// view never hangs on a spinner.
    pub async fn next_snapshot(&mut self) -> bool {
        match self.live.recv().await {
            Some(docs) => {
                self.apply_snapshot(docs).await;
                true
            }
            None => {
                error!("quote feed subscription dropped");
                self.loading = false;
                false
            }
        }
    }

    /// Replace the local view with a remote snapshot, seeding demo data on the
    /// first empty one.
    pub async fn apply_snapshot(&mut self, docs: Snapshot) {
        if docs.is_empty() && !self.seeded {
            self.seeded = true;
            self.quotes = optimistic_demo_quotes();
            self.loading = false;
            debug!("empty feed on cold start, seeding demo quotes");
            // The committed batch triggers a fresh snapshot that supersedes
            // the optimistic view; a concurrent cold-starting client may seed
            // too, which is tolerated.
            if let Err(e) = self.seed().await {
                warn!("demo seeding failed: {e}");
            }
            return;
        }

        self.quotes = docs.iter().filter_map(Quote::from_document).collect();
        self.loading = false;
    }

    /// Insert the demo dataset as one atomic batch.
    pub async fn seed(&self) -> Result<(), StoreError> {
        self.store
            .batch_create(&self.collection, demo_documents())
            .await
            .map(|_| ())
    }

    /// "Load more" re-issues the seed batch; there is no cursor continuation.
    pub async fn load_more(&self) -> Result<(), StoreError> {
        self.seed().await
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

fn demo_documents() -> Vec<serde_json::Value> {
    DEMO_QUOTES
        .iter()
        .map(|(text, author_name, theme_id)| {
            json!({
                "text": text,
                "authorName": author_name,
                "themeId": theme_id,
                "authorId": DEMO_AUTHOR_ID,
                "likes": [],
                "comments": [],
                "createdAt": server_timestamp(),
            })
        })
        .collect()
}

/// The demo dataset as displayable quotes with synthetic ids and a local
/// placeholder timestamp, shown only until the committed batch echoes back.
fn optimistic_demo_quotes() -> Vec<Quote> {
    let placeholder_ts = chrono::Utc::now().timestamp_millis();
    DEMO_QUOTES
        .iter()
        .enumerate()
        .map(|(i, (text, author_name, theme_id))| Quote {
            id: format!("{OPTIMISTIC_ID_PREFIX}{i}"),
            text: text.to_string(),
            author_id: DEMO_AUTHOR_ID.to_string(),
            author_name: author_name.to_string(),
            theme_id: theme_id.to_string(),
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: placeholder_ts,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn feed_with_store() -> (Arc<MemoryStore>, FeedSynchronizer) {
        let store = Arc::new(MemoryStore::new());
        let feed = FeedSynchronizer::new(store.clone(), "quotes".to_string()).unwrap();
        (store, feed)
    }

    #[tokio::test]
    async fn test_cold_start_seeds_optimistic_view() {
        let (store, mut feed) = feed_with_store();
        assert!(feed.is_loading());

        // Initial (empty) snapshot triggers the optimistic view + seed batch.
        assert!(feed.next_snapshot().await);
        assert!(!feed.is_loading());
        assert_eq!(feed.quotes().len(), 5);
        for (i, quote) in feed.quotes().iter().enumerate() {
            assert_eq!(quote.id, format!("temp-{i}"));
            assert!(quote.likes.is_empty());
            assert!(quote.comments.is_empty());
        }

        assert_eq!(store.write_log().batches, 1);
        let committed = store
            .fetch(&Query::descending("quotes", "createdAt", 50))
            .await
            .unwrap();
        assert_eq!(committed.len(), 5);
    }

    #[tokio::test]
    async fn test_committed_seed_supersedes_optimistic_view() {
        let (_store, mut feed) = feed_with_store();
        feed.next_snapshot().await;

        // The batch commit fans out a real snapshot with server ids.
        assert!(feed.next_snapshot().await);
        assert_eq!(feed.quotes().len(), 5);
        assert!(feed.quotes().iter().all(|q| !q.id.starts_with("temp-")));
        assert!(feed.quotes().iter().all(|q| q.created_at > 0));
    }

    #[tokio::test]
    async fn test_seeding_happens_at_most_once() {
        let (store, mut feed) = feed_with_store();
        feed.next_snapshot().await;
        assert_eq!(store.write_log().batches, 1);

        // A later empty snapshot must not seed again; the view is replaced.
        feed.apply_snapshot(Vec::new()).await;
        assert_eq!(store.write_log().batches, 1);
        assert!(feed.quotes().is_empty());
    }

    #[tokio::test]
    async fn test_non_empty_first_snapshot_skips_seeding() {
        let store = Arc::new(MemoryStore::new());
        store
            .create(
                "quotes",
                json!({ "text": "existing", "createdAt": server_timestamp() }),
            )
            .await
            .unwrap();

        let mut feed = FeedSynchronizer::new(store.clone(), "quotes".to_string()).unwrap();
        feed.next_snapshot().await;

        assert_eq!(feed.quotes().len(), 1);
        assert_eq!(feed.quotes()[0].text, "existing");
        assert_eq!(store.write_log().batches, 0);
    }

    #[tokio::test]
    async fn test_snapshot_replaces_view_wholesale() {
        let store = Arc::new(MemoryStore::new());
        store
            .create("quotes", json!({ "text": "a", "createdAt": server_timestamp() }))
            .await
            .unwrap();

        let mut feed = FeedSynchronizer::new(store.clone(), "quotes".to_string()).unwrap();
        feed.next_snapshot().await;
        assert_eq!(feed.quotes().len(), 1);

        store
            .create("quotes", json!({ "text": "b", "createdAt": server_timestamp() }))
            .await
            .unwrap();
        feed.next_snapshot().await;

        assert_eq!(feed.quotes().len(), 2);
        // Newest first per the descending query.
        assert_eq!(feed.quotes()[0].text, "b");
    }

    #[tokio::test]
    async fn test_load_more_reissues_seed_batch() {
        let (store, mut feed) = feed_with_store();
        feed.next_snapshot().await;
        feed.next_snapshot().await;

        feed.load_more().await.unwrap();
        assert_eq!(store.write_log().batches, 2);

        feed.next_snapshot().await;
        assert_eq!(feed.quotes().len(), 10);
    }
}
