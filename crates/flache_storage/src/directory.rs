//! Filesystem-backed storage tree.

use crate::error::{StorageError, StorageResult};
use crate::handle::StorageHandle;
use crate::path::resolve;
use crate::tree::StorageTree;
use async_trait::async_trait;
use bytes::Bytes;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::sync::OnceCell;
use uuid::Uuid;

/// A storage tree rooted at a directory on the local filesystem.
///
/// ```text
/// <root>/
/// ├─ 3a/
/// │  └─ 7f/
/// │     └─ 3a7f...   # one file per path
/// └─ ...
/// ```
///
/// # Readiness
///
/// Construction does no I/O. The root directory is created by the first
/// operation; every operation awaits that one-time gate, so operations
/// issued concurrently during startup queue behind a single
/// `create_dir_all` instead of racing it.
///
/// # Durability
///
/// `write_file` writes to a uniquely named temporary file next to the
/// target and renames it into place. Readers see either the old or the new
/// content, never a partial write. The last completed rename wins.
///
/// # Example
///
/// ```no_run
/// use flache_storage::{DirectoryTree, StorageTree};
///
/// # async fn demo() -> flache_storage::StorageResult<()> {
/// let tree = DirectoryTree::new("cache");
/// tree.write_file("ab/cd/entry", b"data").await?;
/// assert_eq!(&tree.read_file("ab/cd/entry").await?[..], b"data");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DirectoryTree {
    root: PathBuf,
    ready: OnceCell<()>,
}

impl DirectoryTree {
    /// Creates a tree rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ready: OnceCell::new(),
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Waits for the root directory to exist, creating it on first call.
    ///
    /// A failed attempt is not memoized; the next operation retries.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the root cannot be created.
    pub async fn ready(&self) -> StorageResult<()> {
        self.ready
            .get_or_try_init(|| async {
                fs::create_dir_all(&self.root).await?;
                tracing::debug!(root = %self.root.display(), "storage root ready");
                Ok::<(), StorageError>(())
            })
            .await?;
        Ok(())
    }

    async fn locate(&self, path: &str) -> StorageResult<PathBuf> {
        self.ready().await?;
        resolve(&self.root, path)
    }

    async fn create_parent(target: &Path) -> StorageResult<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    target.with_file_name(name)
}

#[async_trait]
impl StorageTree for DirectoryTree {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn open_file(&self, path: &str) -> StorageResult<StorageHandle> {
        let target = self.locate(path).await?;
        Self::create_parent(&target).await?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&target)
            .await?;
        let size = file.metadata().await?.len();

        Ok(StorageHandle::from_file(file, size))
    }

    async fn read_file(&self, path: &str) -> StorageResult<Bytes> {
        let target = self.locate(path).await?;
        let data = fs::read(&target)
            .await
            .map_err(|err| StorageError::from_io(path, err))?;
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let target = self.locate(path).await?;
        Self::create_parent(&target).await?;

        let temp = temp_path(&target);
        let written = match fs::write(&temp, data).await {
            Ok(()) => fs::rename(&temp, &target).await,
            Err(err) => Err(err),
        };

        if let Err(err) = written {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        temp = %temp.display(),
                        error = %cleanup,
                        "failed to remove temporary file"
                    );
                }
            }
            return Err(err.into());
        }
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> StorageResult<()> {
        let target = self.locate(path).await?;
        fs::remove_file(&target)
            .await
            .map_err(|err| StorageError::from_io(path, err))
    }

    async fn contains(&self, path: &str) -> StorageResult<bool> {
        let target = self.locate(path).await?;
        match fs::metadata(&target).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) => match StorageError::from_io(path, err) {
                e if e.is_not_found() => Ok(false),
                e => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn root_is_created_lazily() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("root");

        let tree = DirectoryTree::new(&root);
        assert!(!root.exists());

        tree.ready().await.unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn concurrent_first_operations_share_the_gate() {
        let dir = tempdir().unwrap();
        let tree = Arc::new(DirectoryTree::new(dir.path().join("root")));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let tree = Arc::clone(&tree);
            tasks.push(tokio::spawn(async move {
                tree.write_file(&format!("{i:02x}/00/entry"), &[i as u8]).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        for i in 0..8u8 {
            let data = tree.read_file(&format!("{i:02x}/00/entry")).await.unwrap();
            assert_eq!(&data[..], &[i]);
        }
    }

    #[tokio::test]
    async fn write_creates_parents_and_reads_back() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path());

        tree.write_file("ab/cd/abcdef", b"hello").await.unwrap();

        assert!(dir.path().join("ab").join("cd").join("abcdef").is_file());
        let data = tree.read_file("ab/cd/abcdef").await.unwrap();
        assert_eq!(&data[..], b"hello");
    }

    #[tokio::test]
    async fn write_overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path());

        tree.write_file("a/b/c", b"first version").await.unwrap();
        tree.write_file("a/b/c", b"second").await.unwrap();

        assert_eq!(&tree.read_file("a/b/c").await.unwrap()[..], b"second");
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("a").join("b"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![OsString::from("c")]);
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path());

        let result = tree.read_file("00/00/missing").await;
        assert!(matches!(result, Err(StorageError::NotFound { ref path }) if path == "00/00/missing"));
    }

    #[tokio::test]
    async fn read_of_directory_is_not_not_found() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path());
        tree.write_file("a/b/c", b"x").await.unwrap();

        let err = tree.read_file("a/b").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn remove_existing_and_missing() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path());

        tree.write_file("a/b/c", b"x").await.unwrap();
        tree.remove_file("a/b/c").await.unwrap();
        assert!(!tree.contains("a/b/c").await.unwrap());

        let err = tree.remove_file("a/b/c").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn open_creates_without_truncating() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path());

        let fresh = tree.open_file("x/y/new").await.unwrap();
        assert_eq!(fresh.size(), 0);
        assert!(dir.path().join("x").join("y").join("new").is_file());

        tree.write_file("x/y/old", b"0123456789").await.unwrap();
        let handle = tree.open_file("x/y/old").await.unwrap();
        assert_eq!(handle.size(), 10);
        assert_eq!(&handle.read_all().await.unwrap()[..], b"0123456789");
    }

    #[tokio::test]
    async fn open_then_write_through_handle() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path());

        let handle = tree.open_file("w/w/log").await.unwrap();
        handle.write(b"abc").await.unwrap();
        handle.write(b"def").await.unwrap();

        assert_eq!(&tree.read_file("w/w/log").await.unwrap()[..], b"abcdef");
    }

    #[tokio::test]
    async fn rejects_paths_outside_root() {
        let dir = tempdir().unwrap();
        let tree = DirectoryTree::new(dir.path().join("root"));

        let err = tree.write_file("../escape", b"x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath { .. }));
        assert!(!dir.path().join("escape").exists());
    }
}
