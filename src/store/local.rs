//! Disk-backed file store.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::FileStore;
use crate::error::StoreError;

/// Reads and writes the local file system through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::from_io(path, e))
    }

    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_directory(parent).await?;
        }

        tokio::fs::write(path, bytes).await.map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
        Ok(())
    }

    async fn create_directory(&self, path: &Path) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| StoreError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }
}
