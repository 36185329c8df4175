//! Port interfaces for endpoint discovery

use async_trait::async_trait;

/// Source of the API base URL
///
/// Implementations are selected once at startup: a fixed production
/// endpoint or a discovering resolver for development servers.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Return the cached base URL, probing candidates if none is cached
    async fn resolve(&self) -> String;

    /// Drop the cached base URL and resolve again
    async fn force_reresolve(&self) -> String;

    /// Last-known base URL (or the default) without blocking
    fn current(&self) -> String;

    /// Whether the last resolution reached a real candidate
    fn is_connected(&self) -> bool;
}
