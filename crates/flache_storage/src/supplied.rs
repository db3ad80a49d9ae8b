//! Read-only tree over files handed over by a host.

use crate::error::{StorageError, StorageResult};
use crate::handle::StorageHandle;
use crate::tree::StorageTree;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A file supplied by the host environment, such as one picked by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppliedFile {
    /// File name as reported by the host.
    pub name: String,
    /// File content.
    pub data: Bytes,
}

impl SuppliedFile {
    /// Creates a supplied file.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A flat, read-only storage tree populated from outside the cache.
///
/// Files are registered under `"/" + name`. Lookups accept the path with or
/// without the leading `/`. Nothing here touches the filesystem, and the
/// tree never creates or removes entries on its own: `write_file` fails with
/// [`StorageError::Unsupported`], and so does `remove_file` for a registered
/// path. Removing an unregistered path reports `NotFound`.
///
/// # Example
///
/// ```rust
/// use flache_storage::{SuppliedFile, SuppliedTree, StorageTree};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> flache_storage::StorageResult<()> {
/// let tree = SuppliedTree::new();
/// tree.add_file(SuppliedFile::new("notes.txt", &b"hi"[..]));
///
/// let handle = tree.open_file("/notes.txt").await?;
/// assert_eq!(handle.size(), 2);
/// assert!(tree.write_file("/notes.txt", b"x").await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SuppliedTree {
    files: RwLock<HashMap<String, Bytes>>,
}

impl SuppliedTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tree holding `files`.
    #[must_use]
    pub fn with_files(files: impl IntoIterator<Item = SuppliedFile>) -> Self {
        let tree = Self::new();
        tree.add_files(files);
        tree
    }

    /// Registers one file, replacing any file with the same name.
    pub fn add_file(&self, file: SuppliedFile) {
        let key = Self::key(&file.name);
        self.files.write().insert(key, file.data);
    }

    /// Registers several files.
    pub fn add_files(&self, files: impl IntoIterator<Item = SuppliedFile>) {
        let mut map = self.files.write();
        for file in files {
            map.insert(Self::key(&file.name), file.data);
        }
    }

    /// Number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Returns true if no files are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Registered paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn key(path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        }
    }

    fn lookup(&self, path: &str) -> StorageResult<Bytes> {
        self.files
            .read()
            .get(&Self::key(path))
            .cloned()
            .ok_or_else(|| StorageError::not_found(path))
    }
}

#[async_trait]
impl StorageTree for SuppliedTree {
    fn name(&self) -> &'static str {
        "supplied"
    }

    async fn open_file(&self, path: &str) -> StorageResult<StorageHandle> {
        self.lookup(path).map(StorageHandle::from_bytes)
    }

    async fn read_file(&self, path: &str) -> StorageResult<Bytes> {
        self.lookup(path)
    }

    async fn write_file(&self, _path: &str, _data: &[u8]) -> StorageResult<()> {
        Err(StorageError::unsupported("write_file", self.name()))
    }

    async fn remove_file(&self, path: &str) -> StorageResult<()> {
        self.lookup(path)?;
        Err(StorageError::unsupported("remove_file", self.name()))
    }

    async fn contains(&self, path: &str) -> StorageResult<bool> {
        Ok(self.files.read().contains_key(&Self::key(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SuppliedTree {
        SuppliedTree::with_files([
            SuppliedFile::new("a.bin", (0..100u8).collect::<Vec<_>>()),
            SuppliedFile::new("b.txt", &b"bee"[..]),
        ])
    }

    #[test]
    fn files_are_keyed_with_leading_slash() {
        let tree = sample();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.paths(), vec!["/a.bin".to_string(), "/b.txt".to_string()]);
    }

    #[tokio::test]
    async fn open_by_exact_name() {
        let tree = sample();
        let handle = tree.open_file("/a.bin").await.unwrap();
        assert_eq!(handle.size(), 100);

        let same = tree.open_file("a.bin").await.unwrap();
        assert_eq!(same.size(), 100);
    }

    #[tokio::test]
    async fn open_missing_is_not_found() {
        let tree = sample();
        let err = tree.open_file("/c.txt").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn read_returns_content() {
        let tree = sample();
        assert_eq!(&tree.read_file("/b.txt").await.unwrap()[..], b"bee");
        assert!(tree.read_file("/nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn mutations_are_unsupported() {
        let tree = sample();
        let write = tree.write_file("/b.txt", b"x").await.unwrap_err();
        assert!(matches!(
            write,
            StorageError::Unsupported { operation: "write_file", backend: "supplied" }
        ));

        let remove = tree.remove_file("/b.txt").await.unwrap_err();
        assert!(matches!(remove, StorageError::Unsupported { .. }));

        // Content is untouched.
        assert_eq!(&tree.read_file("/b.txt").await.unwrap()[..], b"bee");
    }

    #[tokio::test]
    async fn removing_unregistered_path_is_not_found() {
        let tree = sample();
        let err = tree.remove_file("/missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(tree.len(), 2);
    }

    #[tokio::test]
    async fn later_files_replace_earlier_ones() {
        let tree = sample();
        tree.add_file(SuppliedFile::new("b.txt", &b"wasp"[..]));
        assert_eq!(tree.len(), 2);
        assert_eq!(&tree.read_file("b.txt").await.unwrap()[..], b"wasp");
    }

    #[tokio::test]
    async fn contains_checks_registration() {
        let tree = sample();
        assert!(tree.contains("/a.bin").await.unwrap());
        assert!(!tree.contains("/z").await.unwrap());
    }
}
