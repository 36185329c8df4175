//! Structured logging for the client

pub mod logging;

pub use logging::{init_tracing, log_request_outcome, LogFormat};
