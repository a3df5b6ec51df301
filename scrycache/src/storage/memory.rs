//! In-process storage backed by a map.
//!
//! Useful for tests and for ephemeral runs that should not leave a cache
//! tree behind. Directories are tracked only so `exists`/`mkdir` behave like
//! a real tree; they impose no structure on file paths.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use super::{BoxFuture, StorageAdapter, StorageError};

/// Map-backed storage adapter.
#[derive(Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
    dirs: RwLock<HashSet<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file without going through the async interface.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), data.into());
    }

    /// Returns a file's contents, if present.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().get(path).cloned()
    }

    /// Removes a file, returning its contents if it existed.
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(path)
    }

    /// Number of stored files.
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    fn not_found(path: &str) -> StorageError {
        StorageError::Io {
            path: path.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such entry"),
        }
    }
}

impl StorageAdapter for MemoryStorage {
    fn exists(&self, path: &str) -> BoxFuture<'_, Result<bool, StorageError>> {
        let path = path.to_string();
        Box::pin(async move {
            Ok(self.files.read().contains_key(&path) || self.dirs.read().contains(&path))
        })
    }

    fn mkdir(&self, path: &str) -> BoxFuture<'_, Result<(), StorageError>> {
        let path = path.to_string();
        Box::pin(async move {
            self.dirs.write().insert(path);
            Ok(())
        })
    }

    fn read(&self, path: &str) -> BoxFuture<'_, Result<Vec<u8>, StorageError>> {
        let path = path.to_string();
        Box::pin(async move {
            self.files
                .read()
                .get(&path)
                .cloned()
                .ok_or_else(|| Self::not_found(&path))
        })
    }

    fn write(&self, path: &str, contents: String) -> BoxFuture<'_, Result<(), StorageError>> {
        let path = path.to_string();
        Box::pin(async move {
            self.files.write().insert(path, contents.into_bytes());
            Ok(())
        })
    }

    fn write_binary(&self, path: &str, data: Vec<u8>) -> BoxFuture<'_, Result<(), StorageError>> {
        let path = path.to_string();
        Box::pin(async move {
            self.files.write().insert(path, data);
            Ok(())
        })
    }

    fn resource_locator(&self, path: &str) -> String {
        format!("memory://{}", path)
    }
}
