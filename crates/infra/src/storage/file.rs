//! File-backed storage
//!
//! One file per key inside a directory. Writes go to a temporary file in the
//! same directory and are renamed into place, so a crash mid-write leaves the
//! previous value intact.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pawsit_core::KeyValueStore;
use pawsit_domain::{PawsitError, Result};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::InfraError;

/// Durable key/value store over plain files
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Store rooted at `directory`; the directory is created on first write
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.directory.join(format!("{name}.json"))
    }
}

fn write_atomic(directory: &Path, path: &Path, value: &str) -> Result<()> {
    std::fs::create_dir_all(directory).map_err(InfraError::from)?;
    let mut file = NamedTempFile::new_in(directory).map_err(InfraError::from)?;
    file.write_all(value.as_bytes()).map_err(InfraError::from)?;
    file.as_file().sync_all().map_err(InfraError::from)?;
    file.persist(path).map_err(InfraError::from)?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let directory = self.directory.clone();
        let path = self.path_for(key);
        let value = value.to_string();

        tokio::task::spawn_blocking(move || write_atomic(&directory, &path, &value))
            .await
            .map_err(|e| PawsitError::Internal(format!("storage write task failed: {e}")))??;

        debug!(key, "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}
