//! # Pawsit Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - HTTP transport (`reqwest`)
//! - Endpoint resolvers (fixed production URL, development discovery)
//! - Session storage backends (files, OS keychain, memory)
//! - Token renewal and the request executor
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `pawsit-core`
//! - Contains all "impure" code (network, filesystem, keychain)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod errors;
pub mod http;
pub mod observability;
pub mod storage;

pub use api::{ApiResponse, LoggingSuspensionHandler, RequestExecutor, RequestOptions};
pub use auth::TokenLifecycleManager;
pub use context::ClientContext;
pub use endpoint::{build_resolver, DiscoveredEndpoint, StaticEndpoint};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
pub use storage::{build_store, FileStore, KeychainStore, MemoryStore};
