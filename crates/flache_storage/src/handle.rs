//! Range-bounded handles over open resources.

use crate::error::{StorageError, StorageResult};
use crate::stream::{HandleStream, StreamOptions};
use bytes::Bytes;
use futures::StreamExt;
use std::fmt;
use std::io::SeekFrom;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// The resource a handle points at.
///
/// Cloning is cheap: files are shared behind an `Arc`, buffers are
/// reference counted.
#[derive(Clone)]
pub(crate) enum Resource {
    /// An open OS file. The mutex serializes seek + read/write pairs.
    File(Arc<Mutex<File>>),
    /// An immutable buffer supplied by the host.
    Memory(Bytes),
}

impl Resource {
    /// Reads up to `len` bytes at absolute offset `offset`.
    ///
    /// Returns an empty buffer once the resource is exhausted.
    pub(crate) async fn read_at(&self, offset: u64, len: usize) -> StorageResult<Bytes> {
        match self {
            Resource::File(file) => {
                let mut file = file.lock().await;
                file.seek(SeekFrom::Start(offset)).await?;
                let mut buf = vec![0u8; len];
                let read = file.read(&mut buf).await?;
                buf.truncate(read);
                Ok(Bytes::from(buf))
            }
            Resource::Memory(data) => {
                let size = data.len() as u64;
                if offset >= size {
                    return Ok(Bytes::new());
                }
                let end = offset.saturating_add(len as u64).min(size);
                Ok(data.slice(offset as usize..end as usize))
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Resource::File(_) => "file",
            Resource::Memory(_) => "memory",
        }
    }
}

/// An open, byte-addressable resource viewed through a `[start, end)` range.
///
/// A handle never copies the resource it points at. [`StorageHandle::slice`]
/// produces a narrower view over the same resource, and
/// [`StorageHandle::stream`] reads the range lazily in chunks with
/// backpressure.
///
/// # Example
///
/// ```rust
/// use flache_storage::StorageHandle;
/// use futures::StreamExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> flache_storage::StorageResult<()> {
/// let handle = StorageHandle::from_bytes(b"hello world".to_vec());
/// let world = handle.slice(Some(6), None)?;
/// assert_eq!(world.size(), 5);
/// assert_eq!(&world.read_all().await?[..], b"world");
/// # Ok(())
/// # }
/// ```
pub struct StorageHandle {
    resource: Resource,
    start: u64,
    end: u64,
    /// Length of the resource when it was opened; no view reaches past it.
    limit: u64,
    write_pos: AtomicU64,
}

impl StorageHandle {
    fn new(resource: Resource, start: u64, end: u64, limit: u64) -> Self {
        Self {
            resource,
            start,
            end,
            limit,
            write_pos: AtomicU64::new(start),
        }
    }

    /// Wraps an open file whose current length is `size`.
    pub(crate) fn from_file(file: File, size: u64) -> Self {
        Self::new(Resource::File(Arc::new(Mutex::new(file))), 0, size, size)
    }

    /// Creates a read-only handle over an in-memory buffer.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self::new(Resource::Memory(data), 0, size, size)
    }

    /// Returns the logical size of this view in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true if the view covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Absolute start offset of the view.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Absolute end offset (exclusive) of the view.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Returns true if [`StorageHandle::write`] is supported.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        matches!(self.resource, Resource::File(_))
    }

    /// Returns a view over `[start, end)` of the same resource.
    ///
    /// Offsets are absolute positions in the underlying resource. A missing
    /// bound keeps the corresponding bound of this handle. Both bounds are
    /// clamped to the length the resource had when it was opened, so
    /// [`StorageHandle::size`] always matches the bytes a read delivers.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidRange`] if the requested start lies
    /// past the requested end.
    pub fn slice(&self, start: Option<u64>, end: Option<u64>) -> StorageResult<Self> {
        let start = start.unwrap_or(self.start);
        let end = end.unwrap_or(self.end);
        if start > end {
            return Err(StorageError::InvalidRange { start, end });
        }
        Ok(Self::new(
            self.resource.clone(),
            start.min(self.limit),
            end.min(self.limit),
            self.limit,
        ))
    }

    /// Streams the view with default [`StreamOptions`].
    ///
    /// Must be polled from within a tokio runtime.
    #[must_use]
    pub fn stream(&self) -> HandleStream {
        self.stream_with(StreamOptions::default())
    }

    /// Streams the view with the given chunking and demand limits.
    #[must_use]
    pub fn stream_with(&self, options: StreamOptions) -> HandleStream {
        HandleStream::new(self.resource.clone(), self.start, self.end, options)
    }

    /// Reads the whole view into one buffer.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by the underlying stream.
    pub async fn read_all(&self) -> StorageResult<Bytes> {
        if let Resource::Memory(_) = self.resource {
            return self.resource.read_at(self.start, self.size() as usize).await;
        }

        let capacity = usize::try_from(self.size()).unwrap_or(usize::MAX);
        let mut out = Vec::with_capacity(capacity.min(crate::DEFAULT_CHUNK_SIZE * 16));
        let mut stream = self.stream();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(Bytes::from(out))
    }

    /// Writes `data` at the handle's current write position and advances it.
    ///
    /// The write position starts at [`StorageHandle::start`]. The logical
    /// size of the handle does not change.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unsupported`] for in-memory resources, or an
    /// I/O error if the write fails.
    pub async fn write(&self, data: &[u8]) -> StorageResult<()> {
        let Resource::File(file) = &self.resource else {
            return Err(StorageError::unsupported("write", self.resource.kind()));
        };

        let mut file = file.lock().await;
        let pos = self.write_pos.load(Ordering::Acquire);
        file.seek(SeekFrom::Start(pos)).await?;
        file.write_all(data).await?;
        file.flush().await?;
        self.write_pos
            .store(pos + data.len() as u64, Ordering::Release);
        Ok(())
    }
}

impl fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageHandle")
            .field("resource", &self.resource.kind())
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::fs::OpenOptions;

    fn hundred_bytes() -> Vec<u8> {
        (0..100u8).collect()
    }

    async fn file_handle(dir: &tempfile::TempDir, content: &[u8]) -> StorageHandle {
        let path = dir.path().join("data.bin");
        tokio::fs::write(&path, content).await.unwrap();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .await
            .unwrap();
        StorageHandle::from_file(file, content.len() as u64)
    }

    #[test]
    fn memory_handle_size() {
        let handle = StorageHandle::from_bytes(hundred_bytes());
        assert_eq!(handle.size(), 100);
        assert_eq!(handle.start(), 0);
        assert_eq!(handle.end(), 100);
        assert!(!handle.is_writable());
    }

    #[test]
    fn slice_keeps_missing_bounds() {
        let handle = StorageHandle::from_bytes(hundred_bytes());
        let tail = handle.slice(Some(40), None).unwrap();
        assert_eq!((tail.start(), tail.end()), (40, 100));

        let head = tail.slice(None, Some(50)).unwrap();
        assert_eq!((head.start(), head.end()), (40, 50));
        assert_eq!(head.size(), 10);
    }

    #[test]
    fn slice_from_zero_is_honoured() {
        let handle = StorageHandle::from_bytes(hundred_bytes());
        let tail = handle.slice(Some(60), None).unwrap();
        let widened = tail.slice(Some(0), None).unwrap();
        assert_eq!(widened.start(), 0);
    }

    #[test]
    fn slice_rejects_inverted_range() {
        let handle = StorageHandle::from_bytes(hundred_bytes());
        let result = handle.slice(Some(20), Some(10));
        assert!(matches!(
            result,
            Err(StorageError::InvalidRange { start: 20, end: 10 })
        ));
    }

    #[tokio::test]
    async fn slice_past_the_end_is_clamped() {
        let handle = StorageHandle::from_bytes(hundred_bytes());
        let tail = handle.slice(Some(90), Some(200)).unwrap();
        assert_eq!((tail.start(), tail.end()), (90, 100));
        assert_eq!(tail.size(), 10);
        assert_eq!(tail.read_all().await.unwrap().len(), 10);

        let beyond = handle.slice(Some(150), Some(300)).unwrap();
        assert!(beyond.is_empty());
        assert!(beyond.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_slice_to_max_reads_whole_file() {
        let dir = tempdir().unwrap();
        let handle = file_handle(&dir, &hundred_bytes()).await;
        let all = handle.slice(None, Some(u64::MAX)).unwrap();
        assert_eq!(all.size(), 100);
        assert_eq!(&all.read_all().await.unwrap()[..], &hundred_bytes()[..]);
    }

    #[tokio::test]
    async fn memory_read_all_of_slice() {
        let handle = StorageHandle::from_bytes(hundred_bytes());
        let slice = handle.slice(Some(10), Some(20)).unwrap();
        let data = slice.read_all().await.unwrap();
        assert_eq!(&data[..], &hundred_bytes()[10..20]);
    }

    #[tokio::test]
    async fn memory_write_is_unsupported() {
        let handle = StorageHandle::from_bytes(b"abc".to_vec());
        let result = handle.write(b"x").await;
        assert!(matches!(result, Err(StorageError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn file_slice_reads_range() {
        let dir = tempdir().unwrap();
        let handle = file_handle(&dir, &hundred_bytes()).await;
        let slice = handle.slice(Some(10), Some(20)).unwrap();
        let data = slice.read_all().await.unwrap();
        assert_eq!(data.len(), 10);
        assert_eq!(&data[..], &hundred_bytes()[10..20]);
    }

    #[tokio::test]
    async fn file_write_advances_position() {
        let dir = tempdir().unwrap();
        let handle = file_handle(&dir, b"..........").await;
        let view = handle.slice(Some(2), None).unwrap();

        view.write(b"ab").await.unwrap();
        view.write(b"cd").await.unwrap();

        let content = tokio::fs::read(dir.path().join("data.bin")).await.unwrap();
        assert_eq!(&content, b"..abcd....");
        assert_eq!(view.size(), 8);
    }

    #[tokio::test]
    async fn slices_share_the_resource() {
        let dir = tempdir().unwrap();
        let handle = file_handle(&dir, b"0000000000").await;
        let writer = handle.slice(Some(5), None).unwrap();
        writer.write(b"11").await.unwrap();

        let data = handle.read_all().await.unwrap();
        assert_eq!(&data[..], b"0000011000");
    }
}
