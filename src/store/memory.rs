//! In-memory file store.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::FileStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Entries {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    writes: usize,
}

/// A file store that keeps everything in memory.
///
/// Clones share the same contents. Writes are counted so callers can check
/// that an operation left the store untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    entries: Arc<Mutex<Entries>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file without counting it as a write.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.lock().files.insert(path.into(), contents.into());
    }

    /// Removes a file, returning whether it was present.
    pub fn remove(&self, path: &Path) -> bool {
        self.lock().files.remove(path).is_some()
    }

    /// Returns a file's contents.
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    /// Returns a file's contents as UTF-8 text.
    pub fn get_string(&self, path: &Path) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Returns true if a directory was created at `path`.
    pub fn has_directory(&self, path: &Path) -> bool {
        self.lock().dirs.contains(path)
    }

    /// Number of successful `write_bytes` calls so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Makes every subsequent write fail with an IO error.
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // A poisoned lock still holds consistent maps; recover it.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn exists(&self, path: &Path) -> bool {
        let entries = self.lock();
        entries.files.contains_key(path) || entries.dirs.contains(path)
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        self.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_path_buf(),
        })
    }

    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if self.fail_writes.lock().map(|flag| *flag).unwrap_or(false) {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "write refused"),
            });
        }

        let mut entries = self.lock();
        entries.files.insert(path.to_path_buf(), bytes.to_vec());
        entries.writes += 1;
        Ok(())
    }

    async fn create_directory(&self, path: &Path) -> Result<(), StoreError> {
        let mut entries = self.lock();
        for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            entries.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }
}
