//! Filesystem-backed blob storage, one file per identifier.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};

use crate::error::{Result, StoreError};

/// Blob store rooted at a configured directory.
///
/// Keys are validated before any path construction, so a key can never
/// address a file outside the root directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open a blob store, creating the root directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a write sink for a new blob.
    ///
    /// Must-create semantics: fails with [`StoreError::Conflict`] if a blob
    /// for this key is already present. The exclusive create is atomic at the
    /// filesystem level, so two concurrent writers for the same key resolve
    /// to exactly one success.
    pub async fn create(&self, key: &str) -> Result<File> {
        let path = self.entry_path(key)?;
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => Ok(file),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::Conflict(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Open a blob for reading, returning the reader and its size in bytes.
    pub async fn open_read(&self, key: &str) -> Result<(File, u64)> {
        let path = self.entry_path(key)?;
        match File::open(&path).await {
            Ok(file) => {
                let size = file.metadata().await?.len();
                Ok((file, size))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a blob, best effort.
    ///
    /// Used to compensate for a failed transfer or index insert; the store
    /// itself offers no deletion operation.
    pub async fn discard(&self, key: &str) {
        let Ok(path) = self.entry_path(key) else {
            return;
        };
        if let Err(err) = tokio::fs::remove_file(&path).await {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!(key, "failed to remove blob: {err}");
            }
        }
    }

    /// Validate a key and resolve it to a path under the root.
    ///
    /// Keys are restricted to ASCII alphanumerics; path separators and
    /// traversal sequences are unrepresentable.
    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}
