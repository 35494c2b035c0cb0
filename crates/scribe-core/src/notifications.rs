use std::sync::Arc;

use serde_json::json;
use tracing::{error, warn};

use crate::constants::NOTIFICATION_PAGE_SIZE;
use crate::models::{Notification, NotificationKind, Session};
use crate::store::{server_timestamp, Query, RemoteStore, Snapshot, StoreError};

/// Creates notification documents for like/comment fan-out.
///
/// Callers are responsible for the self-exclusion rule: a user acting on their
/// own quote must never reach `notify`.
#[derive(Clone)]
pub struct NotificationEngine {
    store: Arc<dyn RemoteStore>,
    collection: String,
    session: Session,
}

impl NotificationEngine {
    pub fn new(store: Arc<dyn RemoteStore>, collection: String, session: Session) -> Self {
        Self {
            store,
            collection,
            session,
        }
    }

    pub async fn notify(
        &self,
        recipient_id: &str,
        kind: NotificationKind,
        message: &str,
    ) -> Result<(), StoreError> {
        self.store
            .create(
                &self.collection,
                json!({
                    "recipientId": recipient_id,
                    "senderName": self.session.reader_name(),
                    "type": kind.as_str(),
                    "message": message,
                    "read": false,
                    "createdAt": server_timestamp(),
                }),
            )
            .await
            .map(|_| ())
    }

    /// Best-effort variant for fan-out after a like/comment: failures are
    /// logged and swallowed so they can never roll back the triggering write.
    pub async fn notify_best_effort(
        &self,
        recipient_id: &str,
        kind: NotificationKind,
        message: &str,
    ) {
        if let Err(e) = self.notify(recipient_id, kind, message).await {
            warn!("notification write failed ({}): {e}", kind.as_str());
        }
    }
}

/// Live view over the viewer's notifications plus the unread badge count.
///
/// The query pulls the newest page of the whole collection and filters to the
/// viewer client-side; fine at this collection size, a ceiling beyond it.
pub struct NotificationFeed {
    store: Arc<dyn RemoteStore>,
    collection: String,
    session: Session,
    live: crate::store::LiveQuery,
    notifications: Vec<Notification>,
    unread: usize,
}

impl NotificationFeed {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        collection: String,
        session: Session,
    ) -> Result<Self, StoreError> {
        let live = store.live_query(Query::descending(
            collection.clone(),
            "createdAt",
            NOTIFICATION_PAGE_SIZE,
        ))?;
        Ok(Self {
            store,
            collection,
            session,
            live,
            notifications: Vec::new(),
            unread: 0,
        })
    }

    /// Await and apply the next snapshot. Returns `false` once the
    /// subscription has dropped.
    pub async fn next_snapshot(&mut self) -> bool {
        match self.live.recv().await {
            Some(docs) => {
                self.apply_snapshot(docs);
                true
            }
            None => {
                error!("notification subscription dropped");
                false
            }
        }
    }

    pub fn apply_snapshot(&mut self, docs: Snapshot) {
        self.notifications = docs
            .iter()
            .filter_map(Notification::from_document)
            .filter(|n| n.recipient_id == self.session.uid)
            .collect();
        self.unread = self.notifications.iter().filter(|n| !n.read).count();
    }

    /// Notifications addressed to the viewer, newest first.
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Count for the badge.
    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Mark every currently-visible unread notification read: one write per
    /// item, each fire-and-forget. Called when the notifications view opens.
    pub async fn mark_visible_read(&self) {
        for notification in self.notifications.iter().filter(|n| !n.read) {
            let result = self
                .store
                .update(
                    &self.collection,
                    &notification.id,
                    vec![(
                        "read".to_string(),
                        crate::store::FieldOp::Set(json!(true)),
                    )],
                )
                .await;
            if let Err(e) = result {
                warn!("failed to mark notification {} read: {e}", notification.id);
            }
        }
    }
}
