pub mod ai;
pub mod auth;
pub mod chat;
pub mod config;
pub mod constants;
pub mod feed;
pub mod handoff;
pub mod models;
pub mod mutations;
pub mod notifications;
pub mod runtime;
pub mod store;
pub mod tracing_setup;

// Re-export the main entry points at crate root for convenience
pub use config::CoreConfig;
pub use models::Session;
pub use runtime::CoreRuntime;
pub use store::{MemoryStore, RemoteStore};
