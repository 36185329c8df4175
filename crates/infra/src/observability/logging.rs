//! Tracing subscriber setup and request outcome events

use std::time::Duration;

use pawsit_domain::PawsitError;
use tracing::{info, warn};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects JSON lines, anything else pretty output
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Install the global subscriber, filtered by `RUST_LOG` (default `info`)
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .try_init(),
    };
    installed.is_ok()
}

/// Emit the terminal event for one logical request
pub fn log_request_outcome(
    endpoint: &str,
    outcome: Result<u16, &PawsitError>,
    sends: u32,
    elapsed: Duration,
) {
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    match outcome {
        Ok(status) if (200..300).contains(&status) => {
            info!(event = "api_request_success", endpoint, status, sends, elapsed_ms);
        }
        Ok(status) => {
            warn!(event = "api_request_failure", endpoint, status, sends, elapsed_ms);
        }
        Err(err) => {
            warn!(
                event = "api_request_failure",
                endpoint,
                error_kind = err.label(),
                error = %err,
                sends,
                elapsed_ms
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_env_value() {
        assert_eq!(LogFormat::from_env_value("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_env_value(""), LogFormat::Pretty);
    }

    #[test]
    fn second_init_reports_existing_subscriber() {
        init_tracing(LogFormat::Json);
        assert!(!init_tracing(LogFormat::Pretty));
    }

    #[test]
    fn outcome_logging_accepts_all_shapes() {
        log_request_outcome("/users", Ok(200), 1, Duration::from_millis(5));
        log_request_outcome("/users", Ok(502), 2, Duration::from_millis(5));
        log_request_outcome("/users", Err(&PawsitError::Cancelled), 1, Duration::ZERO);
    }
}
