use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::constants::{collections, NOTIFICATION_PREVIEW_CHARS};
use crate::models::{Comment, NotificationKind, Quote, Session};
use crate::notifications::NotificationEngine;
use crate::store::{server_timestamp, FieldOp, RemoteStore, StoreError};

/// Optimistic, server-confirmed quote mutations.
///
/// Likes and comments go through atomic array operators; the service never
/// reads an array and writes it back, so concurrent writers cannot clobber
/// each other. Notification fan-out is best-effort and can never fail the
/// triggering mutation.
#[derive(Clone)]
pub struct QuoteMutationService {
    store: Arc<dyn RemoteStore>,
    notifier: NotificationEngine,
    session: Session,
    quotes_collection: String,
    profile_collection: String,
}

impl QuoteMutationService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        notifier: NotificationEngine,
        session: Session,
        quotes_collection: String,
        profile_collection: String,
    ) -> Self {
        Self {
            store,
            notifier,
            session,
            quotes_collection,
            profile_collection,
        }
    }

    /// Publish a new quote. Whitespace-only text is a local no-op; no remote
    /// call is issued. Returns the new document id on success.
    pub async fn publish(
        &self,
        text: &str,
        theme_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let author_name = self.resolve_author_name().await;
        let id = self
            .store
            .create(
                &self.quotes_collection,
                json!({
                    "text": text,
                    "authorId": self.session.uid,
                    "authorName": author_name,
                    "themeId": theme_id,
                    "likes": [],
                    "comments": [],
                    "createdAt": server_timestamp(),
                }),
            )
            .await?;
        debug!("published quote {id}");
        Ok(Some(id))
    }

    /// Toggle the acting user's like on a quote. Adding a like notifies the
    /// author (best-effort, never self); removing one never notifies.
    pub async fn toggle_like(&self, quote: &Quote) -> Result<(), StoreError> {
        let uid = json!(self.session.uid);
        if quote.liked_by(&self.session.uid) {
            self.store
                .update(
                    &self.quotes_collection,
                    &quote.id,
                    vec![("likes".to_string(), FieldOp::ArrayRemove(uid))],
                )
                .await
        } else {
            self.store
                .update(
                    &self.quotes_collection,
                    &quote.id,
                    vec![("likes".to_string(), FieldOp::ArrayUnion(uid))],
                )
                .await?;
            if self.should_notify(quote) {
                self.notifier
                    .notify_best_effort(&quote.author_id, NotificationKind::Like, "liked your quote.")
                    .await;
            }
            Ok(())
        }
    }

    /// Append a comment to a quote. Whitespace-only text is a local no-op.
    /// The comment carries a client-side timestamp; ordering is insertion
    /// order, not timestamp order.
    pub async fn add_comment(&self, quote: &Quote, text: &str) -> Result<(), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let comment = Comment {
            text: text.to_string(),
            uid: self.session.uid.clone(),
            username: self.session.handle(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        let value = serde_json::to_value(&comment)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        self.store
            .update(
                &self.quotes_collection,
                &quote.id,
                vec![("comments".to_string(), FieldOp::ArrayAppend(value))],
            )
            .await?;

        if self.should_notify(quote) {
            let preview: String = text.chars().take(NOTIFICATION_PREVIEW_CHARS).collect();
            let message = format!("commented: \"{preview}...\"");
            self.notifier
                .notify_best_effort(&quote.author_id, NotificationKind::Comment, &message)
                .await;
        }
        Ok(())
    }

    /// Self-authored activity never notifies.
    fn should_notify(&self, quote: &Quote) -> bool {
        !quote.author_id.is_empty() && quote.author_id != self.session.uid
    }

    /// Author display name for new quotes: profile pen name, then profile
    /// name, then the session-derived placeholder.
    async fn resolve_author_name(&self) -> String {
        let profile = self
            .store
            .get(&self.profile_collection, collections::PROFILE_DOC)
            .await
            .ok()
            .flatten();

        if let Some(doc) = profile {
            for key in ["penName", "name"] {
                if let Some(name) = doc.fields.get(key).and_then(|v| v.as_str()) {
                    if !name.trim().is_empty() {
                        return name.to_string();
                    }
                }
            }
        }
        self.session.author_name()
    }
}
