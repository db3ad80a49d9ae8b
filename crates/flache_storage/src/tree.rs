//! Storage tree trait definition.

use crate::error::StorageResult;
use crate::handle::StorageHandle;
use async_trait::async_trait;
use bytes::Bytes;

/// A hierarchical namespace of resources keyed by relative path.
///
/// Trees are **opaque byte stores**: they do not interpret what they hold.
/// Paths use `/` as the separator and are relative to the tree's root.
///
/// # Invariants
///
/// - A read of a path that was never written fails with
///   [`crate::StorageError::NotFound`], never with a generic I/O error
/// - `write_file` creates any missing parent directories
/// - `write_file` replaces existing content entirely
/// - Trees must be `Send + Sync` so a cache can be shared across tasks
///
/// # Implementors
///
/// - [`crate::DirectoryTree`] - a directory on the local filesystem
/// - [`crate::SuppliedTree`] - read-only files handed over by a host
/// - [`crate::Backend`] - one of the above, chosen at startup
#[async_trait]
pub trait StorageTree: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Opens a handle over the full current extent of `path`.
    ///
    /// # Errors
    ///
    /// Backends that cannot create files return `NotFound` for a missing
    /// path; backends that can create it instead.
    async fn open_file(&self, path: &str) -> StorageResult<StorageHandle>;

    /// Reads the entire content at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the path does not exist, or an I/O error.
    async fn read_file(&self, path: &str) -> StorageResult<Bytes>;

    /// Writes `data` at `path`, replacing any existing content.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` on read-only backends, or an I/O error.
    async fn write_file(&self, path: &str, data: &[u8]) -> StorageResult<()>;

    /// Removes the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the path does not exist, `Unsupported` on
    /// read-only backends, or an I/O error.
    async fn remove_file(&self, path: &str) -> StorageResult<()>;

    /// Returns true if a file exists at `path`.
    ///
    /// The default implementation reads the file; backends with a cheaper
    /// existence check should override it.
    ///
    /// # Errors
    ///
    /// Returns any error other than `NotFound` raised by the lookup.
    async fn contains(&self, path: &str) -> StorageResult<bool> {
        match self.read_file(path).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }
}
