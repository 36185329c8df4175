//! Session state and its persistence ports

pub mod ports;
pub mod store;

pub use ports::{KeyValueStore, TokenRefresher};
pub use store::SessionStore;
