//! Resilient API request path
//!
//! - `RequestExecutor` sends calls with bounded retry, token refresh and
//!   suspension handling
//! - `RequestOptions` / `ApiResponse` are the per-call values
//! - `LoggingSuspensionHandler` is the default lockout presenter

pub mod executor;
pub mod request;
pub mod suspension;

pub use executor::RequestExecutor;
pub use request::{join_url, ApiResponse, RequestOptions};
pub use suspension::LoggingSuspensionHandler;
