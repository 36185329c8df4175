//! # Pawsit Domain
//!
//! Domain types for the Pawsit API client and session layer.
//!
//! This crate contains:
//! - Session, endpoint and suspension types
//! - Domain error types and Result definitions
//! - Client configuration structures
//! - Wire-level constants
//!
//! ## Architecture
//! - No dependencies on other Pawsit crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
