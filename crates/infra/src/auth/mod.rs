//! Session token renewal

pub mod token_manager;

pub use token_manager::TokenLifecycleManager;
