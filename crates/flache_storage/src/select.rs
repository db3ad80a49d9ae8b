//! Backend selection.
//!
//! The host states what it can do through [`HostCapabilities`]; the cache
//! picks a [`StorageKind`] from that once, at construction, and opens the
//! matching [`Backend`]. Nothing here inspects the process environment.

use crate::directory::DirectoryTree;
use crate::error::StorageResult;
use crate::handle::StorageHandle;
use crate::supplied::SuppliedTree;
use crate::tree::StorageTree;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;

/// I/O capabilities of the hosting environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// The host can read and write a real filesystem.
    pub filesystem: bool,
}

impl HostCapabilities {
    /// A host with filesystem access.
    #[must_use]
    pub const fn native() -> Self {
        Self { filesystem: true }
    }

    /// A host that can only hand over files it was given (e.g. a file
    /// picker).
    #[must_use]
    pub const fn supplied_only() -> Self {
        Self { filesystem: false }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::native()
    }
}

/// Storage type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// A directory tree on the local filesystem.
    Directory,
    /// Read-only files supplied by the host.
    Supplied,
}

impl StorageKind {
    /// Picks the best storage kind the host supports.
    #[must_use]
    pub fn select(caps: &HostCapabilities) -> Self {
        if caps.filesystem {
            StorageKind::Directory
        } else {
            StorageKind::Supplied
        }
    }
}

/// One of the concrete storage trees.
#[derive(Debug)]
pub enum Backend {
    /// Filesystem directory.
    Directory(DirectoryTree),
    /// Host-supplied files.
    Supplied(SuppliedTree),
}

impl Backend {
    /// Opens a backend of the given kind. `root` is ignored by the supplied
    /// backend, which starts empty.
    #[must_use]
    pub fn open(kind: StorageKind, root: impl Into<PathBuf>) -> Self {
        let backend = match kind {
            StorageKind::Directory => Backend::Directory(DirectoryTree::new(root)),
            StorageKind::Supplied => Backend::Supplied(SuppliedTree::new()),
        };
        tracing::debug!(backend = backend.name(), "storage backend selected");
        backend
    }

    /// Selects and opens the backend matching `caps`.
    #[must_use]
    pub fn for_host(caps: &HostCapabilities, root: impl Into<PathBuf>) -> Self {
        Self::open(StorageKind::select(caps), root)
    }

    /// Returns the kind of this backend.
    #[must_use]
    pub fn kind(&self) -> StorageKind {
        match self {
            Backend::Directory(_) => StorageKind::Directory,
            Backend::Supplied(_) => StorageKind::Supplied,
        }
    }

    /// Returns the supplied tree, if this is one, so the host can add files.
    #[must_use]
    pub fn as_supplied(&self) -> Option<&SuppliedTree> {
        match self {
            Backend::Supplied(tree) => Some(tree),
            Backend::Directory(_) => None,
        }
    }

    fn tree(&self) -> &dyn StorageTree {
        match self {
            Backend::Directory(tree) => tree,
            Backend::Supplied(tree) => tree,
        }
    }
}

#[async_trait]
impl StorageTree for Backend {
    fn name(&self) -> &'static str {
        self.tree().name()
    }

    async fn open_file(&self, path: &str) -> StorageResult<StorageHandle> {
        self.tree().open_file(path).await
    }

    async fn read_file(&self, path: &str) -> StorageResult<Bytes> {
        self.tree().read_file(path).await
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        self.tree().write_file(path, data).await
    }

    async fn remove_file(&self, path: &str) -> StorageResult<()> {
        self.tree().remove_file(path).await
    }

    async fn contains(&self, path: &str) -> StorageResult<bool> {
        self.tree().contains(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StorageError, SuppliedFile};
    use tempfile::tempdir;

    #[test]
    fn selection_follows_capabilities() {
        assert_eq!(
            StorageKind::select(&HostCapabilities::native()),
            StorageKind::Directory
        );
        assert_eq!(
            StorageKind::select(&HostCapabilities::supplied_only()),
            StorageKind::Supplied
        );
        assert_eq!(HostCapabilities::default(), HostCapabilities::native());
    }

    #[tokio::test]
    async fn directory_backend_delegates() {
        let dir = tempdir().unwrap();
        let backend = Backend::for_host(&HostCapabilities::native(), dir.path());
        assert_eq!(backend.kind(), StorageKind::Directory);
        assert_eq!(backend.name(), "directory");
        assert!(backend.as_supplied().is_none());

        backend.write_file("a/b/c", b"v").await.unwrap();
        assert_eq!(&backend.read_file("a/b/c").await.unwrap()[..], b"v");
        assert!(backend.contains("a/b/c").await.unwrap());
        backend.remove_file("a/b/c").await.unwrap();
        assert!(backend.read_file("a/b/c").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn supplied_backend_delegates() {
        let backend = Backend::for_host(&HostCapabilities::supplied_only(), "ignored");
        assert_eq!(backend.kind(), StorageKind::Supplied);

        backend
            .as_supplied()
            .unwrap()
            .add_file(SuppliedFile::new("movie.mp4", vec![7u8; 32]));

        let handle = backend.open_file("/movie.mp4").await.unwrap();
        assert_eq!(handle.size(), 32);
        assert!(matches!(
            backend.write_file("/x", b"y").await,
            Err(StorageError::Unsupported { .. })
        ));
    }
}
