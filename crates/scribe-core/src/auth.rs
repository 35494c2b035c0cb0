use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::constants::collections;
use crate::models::Session;
use crate::store::{server_timestamp, RemoteStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    EmailInUse,
    /// Raw message from the backing provider.
    #[error("{0}")]
    Provider(String),
}

impl AuthError {
    /// Message safe to show inline: provider-specific prefixes and error-code
    /// noise stripped.
    pub fn normalized_message(&self) -> String {
        normalize_provider_message(&self.to_string())
    }
}

/// Strip provider branding ("Firebase: ") and error-code prefixes ("auth/")
/// from a raw provider message.
pub fn normalize_provider_message(message: &str) -> String {
    message.replace("Firebase: ", "").replace("auth/", "")
}

/// The authentication collaborator. Sessions are opaque to the core; it only
/// ever reads the uid and display name.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self);

    /// The currently signed-in session, if any.
    fn current(&self) -> Option<Session>;
}

struct Account {
    uid: String,
    password: String,
    display_name: String,
}

/// In-process provider used by tests and local development. Mirrors the real
/// provider's contract: duplicate-email rejection, credential check, and a
/// merge-written profile document on sign-up.
pub struct MemoryAuth {
    store: Arc<dyn RemoteStore>,
    config: CoreConfig,
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Session>>,
}

impl MemoryAuth {
    pub fn new(store: Arc<dyn RemoteStore>, config: CoreConfig) -> Self {
        Self {
            store,
            config,
            accounts: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, AuthError> {
        let uid = {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(email) {
                return Err(AuthError::EmailInUse);
            }
            let uid = Uuid::new_v4().to_string();
            accounts.insert(
                email.to_string(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                    display_name: display_name.to_string(),
                },
            );
            uid
        };

        // Seed the profile document; the composer reads penName/name from it.
        self.store
            .merge_set(
                &self.config.profile_collection(&uid),
                collections::PROFILE_DOC,
                json!({
                    "name": display_name,
                    "penName": display_name,
                    "email": email,
                    "uid": uid,
                    "createdAt": server_timestamp(),
                }),
            )
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let session = Session::new(uid, Some(display_name.to_string()));
        *self.current.lock() = Some(session.clone());
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let accounts = self.accounts.lock();
        let account = accounts.get(email).ok_or(AuthError::InvalidCredentials)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        let session = Session::new(account.uid.clone(), Some(account.display_name.clone()));
        drop(accounts);
        *self.current.lock() = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) {
        *self.current.lock() = None;
    }

    fn current(&self) -> Option<Session> {
        self.current.lock().clone()
    }
}
