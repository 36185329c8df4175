//! Account lockout signal carried on 403 responses

use serde::{Deserialize, Serialize};

use super::session::SessionStatus;

/// Body of a `403` telling the client the account is suspended or banned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspensionNotice {
    pub status: SessionStatus,
    #[serde(default)]
    pub message: String,
}

impl SuspensionNotice {
    /// Parse a response body, returning a notice only for suspended/banned
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct Probe {
            status: Option<String>,
            #[serde(default)]
            message: Option<String>,
        }

        let probe: Probe = serde_json::from_str(body).ok()?;
        let status = match probe.status?.as_str() {
            "suspended" => SessionStatus::Suspended,
            "banned" => SessionStatus::Banned,
            _ => return None,
        };
        Some(Self { status, message: probe.message.unwrap_or_default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suspended_and_banned() {
        let n = SuspensionNotice::from_body(r#"{"status":"banned","message":"ToS"}"#).unwrap();
        assert_eq!(n.status, SessionStatus::Banned);
        assert_eq!(n.message, "ToS");

        let n = SuspensionNotice::from_body(r#"{"status":"suspended"}"#).unwrap();
        assert_eq!(n.status, SessionStatus::Suspended);
        assert!(n.message.is_empty());
    }

    #[test]
    fn ignores_other_forbidden_bodies() {
        assert!(SuspensionNotice::from_body(r#"{"status":"pending"}"#).is_none());
        assert!(SuspensionNotice::from_body(r#"{"message":"Forbidden"}"#).is_none());
        assert!(SuspensionNotice::from_body("Forbidden").is_none());
        assert!(SuspensionNotice::from_body("").is_none());
    }
}
