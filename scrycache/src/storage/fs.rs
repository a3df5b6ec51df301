//! Filesystem-backed storage rooted at a base directory.

use std::path::{Component, Path, PathBuf};

use super::{BoxFuture, StorageAdapter, StorageError};

/// Storage adapter over a directory tree.
///
/// All relative cache paths resolve under the base directory given at
/// construction. Absolute paths and `..` components are rejected so a
/// misconfigured layout cannot write outside the tree.
pub struct FsStorage {
    base: PathBuf,
}

impl FsStorage {
    /// Creates an adapter rooted at `base`. The directory itself is created
    /// lazily by the first `mkdir`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base directory all paths resolve under.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir));
        if escapes {
            return Err(StorageError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.base.join(relative))
    }
}

impl StorageAdapter for FsStorage {
    fn exists(&self, path: &str) -> BoxFuture<'_, Result<bool, StorageError>> {
        let resolved = self.resolve(path);
        let path = path.to_string();
        Box::pin(async move {
            let full = resolved?;
            tokio::fs::try_exists(&full)
                .await
                .map_err(|e| StorageError::Io { path, source: e })
        })
    }

    fn mkdir(&self, path: &str) -> BoxFuture<'_, Result<(), StorageError>> {
        let resolved = self.resolve(path);
        let path = path.to_string();
        Box::pin(async move {
            let full = resolved?;
            tokio::fs::create_dir_all(&full)
                .await
                .map_err(|e| StorageError::Io { path, source: e })
        })
    }

    fn read(&self, path: &str) -> BoxFuture<'_, Result<Vec<u8>, StorageError>> {
        let resolved = self.resolve(path);
        let path = path.to_string();
        Box::pin(async move {
            let full = resolved?;
            tokio::fs::read(&full)
                .await
                .map_err(|e| StorageError::Io { path, source: e })
        })
    }

    fn write(&self, path: &str, contents: String) -> BoxFuture<'_, Result<(), StorageError>> {
        let resolved = self.resolve(path);
        let path = path.to_string();
        Box::pin(async move {
            let full = resolved?;
            tokio::fs::write(&full, contents)
                .await
                .map_err(|e| StorageError::Io { path, source: e })
        })
    }

    fn write_binary(&self, path: &str, data: Vec<u8>) -> BoxFuture<'_, Result<(), StorageError>> {
        let resolved = self.resolve(path);
        let path = path.to_string();
        Box::pin(async move {
            let full = resolved?;
            tokio::fs::write(&full, data)
                .await
                .map_err(|e| StorageError::Io { path, source: e })
        })
    }

    fn resource_locator(&self, path: &str) -> String {
        let full = self.base.join(path);
        // Canonicalize when the file exists so the locator is absolute.
        match full.canonicalize() {
            Ok(absolute) => format!("file://{}", absolute.display()),
            Err(_) => format!("file://{}", full.display()),
        }
    }
}
