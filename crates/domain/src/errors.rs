//! Error types used throughout the client

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error categories callers use to decide how to present a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failure or timeout, already retried once
    Network,
    /// Token rejected and could not be refreshed
    Authentication,
    /// Caller aborted the request
    Cancelled,
    /// Durable storage failure
    Storage,
    /// Configuration or encoding problems
    Config,
    /// Invariant breach inside the client
    Internal,
}

/// Main error type for the Pawsit client layer
///
/// `Clone` so a single in-flight token refresh can hand the same result to
/// every waiting caller.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PawsitError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Authentication expired: {0}")]
    AuthenticationExpired(String),

    #[error("Not authenticated (no session)")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PawsitError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::AuthenticationExpired(_) | Self::NotAuthenticated => {
                ErrorCategory::Authentication
            }
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Config(_) | Self::Serialization(_) => ErrorCategory::Config,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Transport-level failures are the only errors worth a resend
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    /// Stable label for logging fields
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
            Self::AuthenticationExpired(_) => "auth_expired",
            Self::NotAuthenticated => "not_authenticated",
            Self::Storage(_) => "storage",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for PawsitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for Pawsit operations
pub type Result<T> = std::result::Result<T, PawsitError>;
