//! Endpoint resolver implementations

pub mod discovery;
pub mod static_endpoint;

use std::sync::Arc;

pub use discovery::DiscoveredEndpoint;
use pawsit_core::EndpointResolver;
use pawsit_domain::{ClientConfig, DeploymentMode};
pub use static_endpoint::StaticEndpoint;
use tracing::info;

use crate::http::HttpClient;

/// Pick the resolver strategy for the configured deployment mode
#[must_use]
pub fn build_resolver(config: &ClientConfig, http: HttpClient) -> Arc<dyn EndpointResolver> {
    match config.mode {
        DeploymentMode::Production => {
            info!(base_url = %config.production_base_url, "Using fixed production endpoint");
            Arc::new(StaticEndpoint::new(config.production_base_url.clone()))
        }
        DeploymentMode::Development => {
            info!(
                priority = config.priority_candidates.len(),
                fallback = config.fallback_candidates.len(),
                "Using endpoint discovery"
            );
            Arc::new(DiscoveredEndpoint::new(http, config.clone()))
        }
    }
}
