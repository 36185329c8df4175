//! Port interfaces for session persistence and token renewal

use async_trait::async_trait;
use pawsit_domain::Result;

/// Durable string key/value storage (mobile async-storage shape)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key was never written or was removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value (idempotent)
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Something that can obtain a fresh bearer token for the current session
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Refresh the session token, returning the new token
    async fn refresh(&self) -> Result<String>;
}
