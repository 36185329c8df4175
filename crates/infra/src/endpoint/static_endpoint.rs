//! Fixed production endpoint

use async_trait::async_trait;
use pawsit_core::EndpointResolver;

/// Resolver for production: one public base URL, never probed
#[derive(Debug, Clone)]
pub struct StaticEndpoint {
    base_url: String,
}

impl StaticEndpoint {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

#[async_trait]
impl EndpointResolver for StaticEndpoint {
    async fn resolve(&self) -> String {
        self.base_url.clone()
    }

    async fn force_reresolve(&self) -> String {
        self.base_url.clone()
    }

    fn current(&self) -> String {
        self.base_url.clone()
    }

    fn is_connected(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_returns_configured_url() {
        let resolver = StaticEndpoint::new("https://api.example.com/api");
        assert_eq!(resolver.resolve().await, "https://api.example.com/api");
        assert_eq!(resolver.force_reresolve().await, "https://api.example.com/api");
        assert_eq!(resolver.current(), "https://api.example.com/api");
        assert!(resolver.is_connected());
    }
}
