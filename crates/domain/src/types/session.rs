//! Session types
//!
//! The session is the single authenticated principal the client acts for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Active,
    Suspended,
    Banned,
    Pending,
    Denied,
}

impl SessionStatus {
    /// Suspended and banned accounts can no longer make authenticated calls.
    #[must_use]
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Suspended | Self::Banned)
    }

    /// Wire name of the status
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
            Self::Pending => "pending",
            Self::Denied => "denied",
        }
    }
}

/// Authenticated principal: identity, status and bearer token
///
/// Display/contact fields are opaque to the client layer and are carried
/// through untouched in `profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Stable principal identifier, used to refresh or regenerate tokens
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: SessionStatus::Active,
            token: None,
            profile: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = status;
        self
    }

    /// True when a non-empty bearer token is present
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Envelope written to durable storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub session: Session,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    #[must_use]
    pub fn now(session: Session) -> Self {
        Self { session, saved_at: Utc::now() }
    }
}
