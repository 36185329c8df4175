//! Client configuration
//!
//! Everything the resilient client consumes from its environment: the
//! deployment mode, candidate hosts for discovery, timeouts and where the
//! session is persisted. Durations are expressed in milliseconds on the wire.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::constants::{
    AUTH_ENDPOINTS, DEFAULT_API_PREFIX, DEFAULT_DEV_HOST, DEFAULT_DEV_PORT,
    DEFAULT_ENDPOINT_TTL_MS, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_LIVENESS_PATH,
    DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_PRODUCTION_BASE_URL, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SCHEME, DEFAULT_STORAGE_DIR, DEFAULT_SUSPENSION_RELEASE_MS, REFRESH_TOKEN_PATH,
    REGENERATE_TOKEN_PATH,
};
use crate::errors::{PawsitError, Result};
use crate::types::{EndpointCandidate, NetworkType};

/// Whether endpoint discovery runs at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    /// Fixed public endpoint, no probing
    Production,
    /// Discover a developer/test server across changing networks
    #[default]
    Development,
}

/// Durable storage backend for the session record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keychain,
    Memory,
}

/// Session persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the file backend
    pub directory: PathBuf,
    /// Keychain service name for the keychain backend
    pub service_name: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            directory: PathBuf::from(DEFAULT_STORAGE_DIR),
            service_name: DEFAULT_KEYCHAIN_SERVICE.to_string(),
        }
    }
}

/// Configuration for the API client and session layer
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub mode: DeploymentMode,
    /// Base URL used verbatim in production mode
    pub production_base_url: String,
    /// Host used when every discovery candidate fails
    pub default_host: String,
    pub scheme: String,
    /// Port appended to candidate hosts that carry none
    pub port: Option<u16>,
    /// Path prefix of the API below the host (e.g. `/api`)
    pub api_prefix: String,
    /// Lightweight path probed for liveness
    pub liveness_path: String,
    pub priority_candidates: Vec<EndpointCandidate>,
    pub fallback_candidates: Vec<EndpointCandidate>,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "probe_timeout_ms")]
    pub probe_timeout: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Duration,
    /// How long a resolved endpoint is trusted before probing again
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "endpoint_ttl_ms")]
    pub endpoint_ttl: Duration,
    /// Grace period before the suspension latch re-arms
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "suspension_release_ms")]
    pub suspension_release: Duration,
    pub refresh_path: String,
    pub regenerate_path: String,
    /// Path prefixes that never carry a token and bypass the logout check
    pub auth_endpoints: Vec<String>,
    pub storage: StorageConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Development,
            production_base_url: DEFAULT_PRODUCTION_BASE_URL.to_string(),
            default_host: DEFAULT_DEV_HOST.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            port: Some(DEFAULT_DEV_PORT),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            liveness_path: DEFAULT_LIVENESS_PATH.to_string(),
            priority_candidates: vec![
                // Android emulator alias for the host machine
                EndpointCandidate::new("10.0.2.2", NetworkType::Loopback),
                EndpointCandidate::new(DEFAULT_DEV_HOST, NetworkType::Loopback),
            ],
            fallback_candidates: Vec::new(),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            endpoint_ttl: Duration::from_millis(DEFAULT_ENDPOINT_TTL_MS),
            suspension_release: Duration::from_millis(DEFAULT_SUSPENSION_RELEASE_MS),
            refresh_path: REFRESH_TOKEN_PATH.to_string(),
            regenerate_path: REGENERATE_TOKEN_PATH.to_string(),
            auth_endpoints: AUTH_ENDPOINTS.iter().map(|s| (*s).to_string()).collect(),
            storage: StorageConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Development config probing only the given hosts
    #[must_use]
    pub fn development(priority: Vec<EndpointCandidate>, fallback: Vec<EndpointCandidate>) -> Self {
        Self { priority_candidates: priority, fallback_candidates: fallback, ..Self::default() }
    }

    /// Production config with a fixed base URL
    #[must_use]
    pub fn production(base_url: impl Into<String>) -> Self {
        Self {
            mode: DeploymentMode::Production,
            production_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// API base URL for a host authority (`host[:port]`)
    #[must_use]
    pub fn base_url_for(&self, authority: &str) -> String {
        format!("{}://{}{}", self.scheme, authority, normalize_prefix(&self.api_prefix))
    }

    /// Liveness probe URL for a host authority
    #[must_use]
    pub fn probe_url_for(&self, authority: &str) -> String {
        format!("{}://{}{}", self.scheme, authority, normalize_prefix(&self.liveness_path))
    }

    /// Address used when discovery finds nothing reachable
    #[must_use]
    pub fn default_base_url(&self) -> String {
        let fallback = EndpointCandidate::new(self.default_host.clone(), NetworkType::Unknown);
        self.base_url_for(&fallback.authority(self.port))
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// Returns `PawsitError::Config` for unusable URLs, zero timeouts or a
    /// development setup with nothing to discover.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(PawsitError::Config("request timeout must be non-zero".into()));
        }
        if self.probe_timeout.is_zero() {
            return Err(PawsitError::Config("probe timeout must be non-zero".into()));
        }

        match self.mode {
            DeploymentMode::Production => {
                url::Url::parse(&self.production_base_url).map_err(|e| {
                    PawsitError::Config(format!(
                        "invalid production base URL '{}': {e}",
                        self.production_base_url
                    ))
                })?;
            }
            DeploymentMode::Development => {
                if self.priority_candidates.is_empty() && self.fallback_candidates.is_empty() {
                    return Err(PawsitError::Config(
                        "development mode requires at least one candidate host".into(),
                    ));
                }
                url::Url::parse(&self.default_base_url()).map_err(|e| {
                    PawsitError::Config(format!("invalid default host '{}': {e}", self.default_host))
                })?;
            }
        }

        Ok(())
    }

    /// Whether `endpoint` is an authentication endpoint
    ///
    /// Matches whole path segments, so `/auth/login-attempts` is not
    /// `/auth/login`. Absolute URLs are matched on their path below the API
    /// base path. Query strings and fragments are ignored.
    #[must_use]
    pub fn is_auth_endpoint(&self, endpoint: &str) -> bool {
        let path = match url::Url::parse(endpoint) {
            Ok(absolute) => {
                let api_path = self.api_base_path();
                match absolute.path().strip_prefix(api_path.trim_end_matches('/')) {
                    Some(rest) => rest.to_string(),
                    None => return false,
                }
            }
            Err(_) => endpoint.split(['?', '#']).next().unwrap_or(endpoint).to_string(),
        };
        let path = normalize_prefix(&path);
        let path = path.trim_end_matches('/');

        self.auth_endpoints.iter().any(|auth| {
            let auth = normalize_prefix(auth);
            let auth = auth.trim_end_matches('/');
            path == auth || path.strip_prefix(auth).is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Path component of the API base URL for the current mode
    fn api_base_path(&self) -> String {
        match self.mode {
            DeploymentMode::Production => url::Url::parse(&self.production_base_url)
                .map_or_else(|_| normalize_prefix(&self.api_prefix), |u| u.path().to_string()),
            DeploymentMode::Development => normalize_prefix(&self.api_prefix),
        }
    }
}

fn normalize_prefix(path: &str) -> String {
    if path.is_empty() || path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
