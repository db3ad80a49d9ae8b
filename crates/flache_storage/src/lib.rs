//! # Flache Storage
//!
//! Storage tree abstraction and streamed file handles for Flache.
//!
//! This crate is the lowest layer of the cache. A [`StorageTree`] maps
//! relative paths to resources; a [`StorageHandle`] is an open,
//! range-bounded view onto one resource that can be sliced without copying
//! and streamed with backpressure.
//!
//! ## Design Principles
//!
//! - Trees are opaque byte stores; they never interpret content
//! - A missing path is always [`StorageError::NotFound`], distinguishable
//!   from every other failure
//! - All I/O is async (tokio); trees are `Send + Sync`
//! - Backend choice is explicit, made once from [`HostCapabilities`]
//!
//! ## Available Backends
//!
//! - [`DirectoryTree`] - a directory on the local filesystem
//! - [`SuppliedTree`] - read-only files handed over by a host
//! - [`Backend`] - closed set of the above, selected at startup
//!
//! ## Example
//!
//! ```rust
//! use flache_storage::{StorageHandle, StreamOptions};
//! use futures::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> flache_storage::StorageResult<()> {
//! let handle = StorageHandle::from_bytes((0..100u8).collect::<Vec<_>>());
//! let slice = handle.slice(Some(10), Some(20))?;
//!
//! let mut stream = slice.stream_with(StreamOptions::new().with_chunk_size(4));
//! let mut total = 0;
//! while let Some(chunk) = stream.next().await {
//!     total += chunk?.len();
//! }
//! assert_eq!(total, 10);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod directory;
mod error;
mod handle;
mod path;
mod select;
mod stream;
mod supplied;
mod tree;

pub use directory::DirectoryTree;
pub use error::{StorageError, StorageResult};
pub use handle::StorageHandle;
pub use select::{Backend, HostCapabilities, StorageKind};
pub use stream::{
    HandleStream, StreamOptions, StreamState, DEFAULT_CHUNK_SIZE, DEFAULT_HIGH_WATER_MARK,
};
pub use supplied::{SuppliedFile, SuppliedTree};
pub use tree::StorageTree;
