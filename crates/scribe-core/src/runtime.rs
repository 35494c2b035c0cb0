use std::sync::Arc;

use crate::ai::GenerativeClient;
use crate::chat::CommunityChannel;
use crate::config::CoreConfig;
use crate::constants::collections;
use crate::feed::FeedSynchronizer;
use crate::handoff::GeneratedQuoteSlot;
use crate::models::Session;
use crate::mutations::QuoteMutationService;
use crate::notifications::{NotificationEngine, NotificationFeed};
use crate::store::{RemoteStore, StoreError};

/// Wires a signed-in session to the store-backed services. One runtime per
/// session; signing out drops it along with every live subscription it
/// handed out.
pub struct CoreRuntime {
    config: CoreConfig,
    store: Arc<dyn RemoteStore>,
    session: Session,
    ai: GenerativeClient,
    handoff: Arc<GeneratedQuoteSlot>,
}

impl CoreRuntime {
    pub fn new(config: CoreConfig, store: Arc<dyn RemoteStore>, session: Session) -> Self {
        let ai = GenerativeClient::new(&config);
        Self {
            config,
            store,
            session,
            ai,
            handoff: Arc::new(GeneratedQuoteSlot::new()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// A fresh feed view with its own subscription and seeding latch.
    pub fn feed(&self) -> Result<FeedSynchronizer, StoreError> {
        FeedSynchronizer::new(
            self.store.clone(),
            self.config.public_collection(collections::QUOTES),
        )
    }

    pub fn notification_engine(&self) -> NotificationEngine {
        NotificationEngine::new(
            self.store.clone(),
            self.config.public_collection(collections::NOTIFICATIONS),
            self.session.clone(),
        )
    }

    pub fn notification_feed(&self) -> Result<NotificationFeed, StoreError> {
        NotificationFeed::new(
            self.store.clone(),
            self.config.public_collection(collections::NOTIFICATIONS),
            self.session.clone(),
        )
    }

    pub fn mutations(&self) -> QuoteMutationService {
        QuoteMutationService::new(
            self.store.clone(),
            self.notification_engine(),
            self.session.clone(),
            self.config.public_collection(collections::QUOTES),
            self.config.profile_collection(&self.session.uid),
        )
    }

    pub fn chat(&self) -> Result<CommunityChannel, StoreError> {
        CommunityChannel::new(
            self.store.clone(),
            self.config.public_collection(collections::COMMUNITY_MESSAGES),
            self.session.clone(),
        )
    }

    pub fn ai(&self) -> &GenerativeClient {
        &self.ai
    }

    pub fn handoff(&self) -> Arc<GeneratedQuoteSlot> {
        self.handoff.clone()
    }
}
