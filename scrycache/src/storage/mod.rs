//! Storage abstraction for cache persistence.
//!
//! The resolution chain never touches a filesystem directly; it goes through
//! [`StorageAdapter`], a minimal capability trait over whatever holds the
//! cache tree. Two implementations ship with the crate:
//!
//! - [`FsStorage`]: a real directory tree via `tokio::fs`
//! - [`MemoryStorage`]: an in-process map, for tests and ephemeral runs
//!
//! # Path Convention
//!
//! Paths are relative, slash-separated strings produced by
//! [`CacheLayout`](crate::config::CacheLayout). Adapters map them onto their
//! own namespace; they never interpret them beyond joining.
//!
//! # Dyn Compatibility
//!
//! Async methods return `Pin<Box<dyn Future>>` so the trait supports
//! `Arc<dyn StorageAdapter>`, letting every component share one adapter
//! polymorphically.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O failure at a specific path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The path is absolute or climbs out of the storage root.
    #[error("path escapes the storage root: {path}")]
    InvalidPath { path: String },
}

impl StorageError {
    /// True when the error is a plain missing-entry condition.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Capability interface over the tree holding cached records and images.
///
/// Implementations must be `Send + Sync`; one adapter instance is shared by
/// every resolver component. A missing entry is reported through `Ok(false)`
/// from `exists` or a not-found `read` error, never by panicking.
pub trait StorageAdapter: Send + Sync {
    /// Check whether a file or directory exists.
    fn exists(&self, path: &str) -> BoxFuture<'_, Result<bool, StorageError>>;

    /// Create a directory (and any missing parents). Idempotent.
    fn mkdir(&self, path: &str) -> BoxFuture<'_, Result<(), StorageError>>;

    /// Read a file's contents.
    fn read(&self, path: &str) -> BoxFuture<'_, Result<Vec<u8>, StorageError>>;

    /// Write a text file, replacing any previous content.
    fn write(&self, path: &str, contents: String) -> BoxFuture<'_, Result<(), StorageError>>;

    /// Write a binary file, replacing any previous content.
    fn write_binary(&self, path: &str, data: Vec<u8>) -> BoxFuture<'_, Result<(), StorageError>>;

    /// A displayable locator for a stored resource (e.g. a `file://` URL).
    ///
    /// Only meaningful for paths that exist; the locator is derived from the
    /// path alone and performs no I/O beyond resolving it.
    fn resource_locator(&self, path: &str) -> String;
}
