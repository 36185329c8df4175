//! Retry policy for one logical request
//!
//! A logical request may be resent at most once after a network-class
//! failure and at most once after a token refresh. The two budgets are
//! independent. Transitions consume the attempt and return `None` once a
//! budget is spent, so no caller can exceed them.

use pawsit_domain::constants::UNAUTHENTICATED_SENTINEL;
use pawsit_domain::{PawsitError, SuspensionNotice};
use serde::Deserialize;

/// Budget state threaded through the sends of one logical request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestAttempt {
    /// Network-class resends performed so far
    pub retry_count: u32,
    /// Whether the token was already refreshed for this request
    pub has_refreshed_token: bool,
}

impl RequestAttempt {
    /// Network-class resends allowed per logical request
    pub const MAX_NETWORK_RETRIES: u32 = 1;

    #[must_use]
    pub const fn new() -> Self {
        Self { retry_count: 0, has_refreshed_token: false }
    }

    /// Spend the network retry budget
    #[must_use]
    pub fn network_retry(self) -> Option<Self> {
        (self.retry_count < Self::MAX_NETWORK_RETRIES)
            .then_some(Self { retry_count: self.retry_count + 1, ..self })
    }

    /// Spend the token refresh budget
    #[must_use]
    pub fn token_refresh(self) -> Option<Self> {
        (!self.has_refreshed_token).then_some(Self { has_refreshed_token: true, ..self })
    }

    /// Total sends this attempt state implies so far (initial send included)
    #[must_use]
    pub fn sends(&self) -> u32 {
        1 + self.retry_count + u32::from(self.has_refreshed_token)
    }
}

/// What the executor should do with a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseDecision {
    /// Hand the response to the caller
    Return,
    /// Account locked: run the guarded side effect, then return the response
    Suspend(SuspensionNotice),
    /// Token rejected: refresh, then resend with the new attempt state
    RefreshAndRetry(RequestAttempt),
    /// Re-resolve the endpoint, then resend with the new attempt state
    RetryNetwork(RequestAttempt),
}

/// Classify a response in priority order
#[must_use]
pub fn decide_response(attempt: RequestAttempt, status: u16, body: &str) -> ResponseDecision {
    if (200..300).contains(&status) {
        return ResponseDecision::Return;
    }

    if status == 403 {
        if let Some(notice) = SuspensionNotice::from_body(body) {
            return ResponseDecision::Suspend(notice);
        }
    }

    if is_auth_rejection(status, body) {
        if let Some(next) = attempt.token_refresh() {
            return ResponseDecision::RefreshAndRetry(next);
        }
    }

    match attempt.network_retry() {
        Some(next) => ResponseDecision::RetryNetwork(next),
        None => ResponseDecision::Return,
    }
}

/// Next attempt after a transport failure, `None` if it must surface
///
/// Caller cancellation is never retried.
#[must_use]
pub fn decide_transport_failure(
    attempt: RequestAttempt,
    error: &PawsitError,
) -> Option<RequestAttempt> {
    if !error.is_retryable() {
        return None;
    }
    attempt.network_retry()
}

/// 401, or a 500 carrying the "unauthenticated" sentinel
#[must_use]
pub fn is_auth_rejection(status: u16, body: &str) -> bool {
    match status {
        401 => true,
        500 => body_has_unauthenticated_sentinel(body),
        _ => false,
    }
}

fn body_has_unauthenticated_sentinel(body: &str) -> bool {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<serde_json::Value>,
        message: Option<serde_json::Value>,
    }

    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return false;
    };

    [parsed.error, parsed.message].iter().flatten().any(|value| {
        value.as_str().is_some_and(|text| {
            text.trim().trim_end_matches('.').eq_ignore_ascii_case(UNAUTHENTICATED_SENTINEL)
        })
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pawsit_domain::SessionStatus;

    use super::*;

    #[test]
    fn budgets_are_single_use_and_independent() {
        let start = RequestAttempt::new();
        let after_net = start.network_retry().unwrap();
        assert!(after_net.network_retry().is_none());

        let after_both = after_net.token_refresh().unwrap();
        assert!(after_both.token_refresh().is_none());
        assert!(after_both.network_retry().is_none());
        assert_eq!(after_both.sends(), 3);
    }

    #[test]
    fn success_returns() {
        assert_eq!(decide_response(RequestAttempt::new(), 200, ""), ResponseDecision::Return);
        assert_eq!(decide_response(RequestAttempt::new(), 204, ""), ResponseDecision::Return);
    }

    #[test]
    fn suspended_403_takes_priority() {
        let decision =
            decide_response(RequestAttempt::new(), 403, r#"{"status":"suspended","message":"m"}"#);
        match decision {
            ResponseDecision::Suspend(notice) => assert_eq!(notice.status, SessionStatus::Suspended),
            other => panic!("expected suspension, got {other:?}"),
        }
    }

    #[test]
    fn plain_403_is_retried_once() {
        let decision = decide_response(RequestAttempt::new(), 403, r#"{"message":"Forbidden"}"#);
        assert!(matches!(decision, ResponseDecision::RetryNetwork(_)));
    }

    #[test]
    fn unauthorized_refreshes_once_then_falls_back_to_network_retry() {
        let first = decide_response(RequestAttempt::new(), 401, "");
        let ResponseDecision::RefreshAndRetry(next) = first else {
            panic!("expected refresh, got {first:?}");
        };

        let second = decide_response(next, 401, "");
        let ResponseDecision::RetryNetwork(last) = second else {
            panic!("expected network retry, got {second:?}");
        };

        assert_eq!(decide_response(last, 401, ""), ResponseDecision::Return);
    }

    #[test]
    fn sentinel_500_counts_as_auth_rejection() {
        assert!(is_auth_rejection(500, r#"{"message":"Unauthenticated"}"#));
        assert!(is_auth_rejection(500, r#"{"error":"Unauthenticated."}"#));
        assert!(!is_auth_rejection(500, r#"{"message":"database down"}"#));
        assert!(!is_auth_rejection(500, "Unauthenticated"));
        assert!(!is_auth_rejection(502, r#"{"message":"Unauthenticated"}"#));
    }

    #[test]
    fn other_errors_retry_once_then_return() {
        let first = decide_response(RequestAttempt::new(), 502, "");
        let ResponseDecision::RetryNetwork(next) = first else {
            panic!("expected retry, got {first:?}");
        };
        assert_eq!(decide_response(next, 502, ""), ResponseDecision::Return);
    }

    #[test]
    fn transport_failures() {
        let start = RequestAttempt::new();
        let next = decide_transport_failure(start, &PawsitError::Network("reset".into())).unwrap();
        assert_eq!(next.retry_count, 1);
        assert!(decide_transport_failure(next, &PawsitError::Timeout(Duration::from_secs(1)))
            .is_none());
        assert!(decide_transport_failure(start, &PawsitError::Cancelled).is_none());
    }
}
