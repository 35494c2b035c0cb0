use std::sync::Arc;

use serde_json::json;
use tracing::error;

use crate::constants::CHAT_PAGE_SIZE;
use crate::models::{ChatMessage, Session};
use crate::store::{server_timestamp, Query, RemoteStore, Snapshot, StoreError};

/// Live view over the shared community chat log, oldest first.
pub struct CommunityChannel {
    store: Arc<dyn RemoteStore>,
    collection: String,
    session: Session,
    live: crate::store::LiveQuery,
    messages: Vec<ChatMessage>,
}

impl CommunityChannel {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        collection: String,
        session: Session,
    ) -> Result<Self, StoreError> {
        let live = store.live_query(Query::ascending(
            collection.clone(),
            "createdAt",
            CHAT_PAGE_SIZE,
        ))?;
        Ok(Self {
            store,
            collection,
            session,
            live,
            messages: Vec::new(),
        })
    }

    pub async fn next_snapshot(&mut self) -> bool {
        match self.live.recv().await {
            Some(docs) => {
                self.apply_snapshot(docs);
                true
            }
            None => {
                error!("community chat subscription dropped");
                false
            }
        }
    }

    pub fn apply_snapshot(&mut self, docs: Snapshot) {
        self.messages = docs.iter().filter_map(ChatMessage::from_document).collect();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Send a message. Whitespace-only input is a local no-op.
    pub async fn send(&self, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.store
            .create(
                &self.collection,
                json!({
                    "text": text,
                    "uid": self.session.uid,
                    "username": self.session.handle(),
                    "createdAt": server_timestamp(),
                }),
            )
            .await
            .map(|_| ())
    }
}
