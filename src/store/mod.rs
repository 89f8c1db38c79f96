//! File access used by the config manager.

pub mod local;
pub mod memory;

use std::path::Path;

use async_trait::async_trait;

use crate::error::StoreError;

pub use local::LocalFileStore;
pub use memory::MemoryFileStore;

/// Minimal file system surface the config lifecycle needs.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Returns true if a file or directory exists at `path`.
    async fn exists(&self, path: &Path) -> bool;

    /// Reads the whole file.
    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Replaces the file's contents, creating parent directories as needed.
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError>;

    /// Creates a directory and its parents. Succeeds if it already exists.
    async fn create_directory(&self, path: &Path) -> Result<(), StoreError>;
}
