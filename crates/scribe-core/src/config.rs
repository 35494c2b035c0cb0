use crate::constants::{DEFAULT_APP_ID, GENERATIVE_API_BASE};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Application namespace; all collections live under it.
    pub app_id: String,
    /// Base URL of the generative text API (key appended as a query param).
    pub generative_endpoint: String,
    /// API key for the generative endpoint.
    pub generative_api_key: String,
}

impl CoreConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            generative_endpoint: GENERATIVE_API_BASE.to_string(),
            generative_api_key: std::env::var("SCRIBE_GEMINI_API_KEY").unwrap_or_default(),
        }
    }

    /// Path of a shared (multi-writer) collection.
    pub fn public_collection(&self, name: &str) -> String {
        format!("artifacts/{}/public/data/{}", self.app_id, name)
    }

    /// Path of a user's private profile collection.
    pub fn profile_collection(&self, uid: &str) -> String {
        format!("artifacts/{}/users/{}/profile", self.app_id, uid)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_APP_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_paths_are_namespaced() {
        let config = CoreConfig::new("test-app");
        assert_eq!(
            config.public_collection("quotes"),
            "artifacts/test-app/public/data/quotes"
        );
        assert_eq!(
            config.profile_collection("u1"),
            "artifacts/test-app/users/u1/profile"
        );
    }
}
