//! Durable key/value backends for the session store

pub mod file;
pub mod keychain;
pub mod memory;

use std::sync::Arc;

pub use file::FileStore;
pub use keychain::KeychainStore;
pub use memory::MemoryStore;
use pawsit_core::KeyValueStore;
use pawsit_domain::{StorageBackend, StorageConfig};
use tracing::info;

/// Construct the configured storage backend
#[must_use]
pub fn build_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    match config.backend {
        StorageBackend::File => {
            info!(directory = %config.directory.display(), "Using file session storage");
            Arc::new(FileStore::new(config.directory.clone()))
        }
        StorageBackend::Keychain => {
            info!(service = %config.service_name, "Using keychain session storage");
            Arc::new(KeychainStore::new(config.service_name.clone()))
        }
        StorageBackend::Memory => {
            info!("Using in-memory session storage");
            Arc::new(MemoryStore::new())
        }
    }
}
