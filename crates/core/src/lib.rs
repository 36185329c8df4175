//! # Pawsit Core
//!
//! Pure client logic - no HTTP or platform code.
//!
//! This crate contains:
//! - Port interfaces (endpoint resolution, durable storage, token renewal,
//!   suspension notification)
//! - The session store
//! - The suspension latch
//! - The per-request retry policy
//!
//! ## Architecture Principles
//! - Only depends on `pawsit-domain`
//! - All external dependencies via traits
//! - Pure, testable logic

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod endpoint;
pub mod request;
pub mod session;
pub mod suspension;

pub use endpoint::EndpointResolver;
pub use request::{RequestAttempt, ResponseDecision};
pub use session::{KeyValueStore, SessionStore, TokenRefresher};
pub use suspension::{SuspensionGuard, SuspensionHandler};
