//! # Flache Core
//!
//! A persistent key-value cache that stores values under content-derived
//! paths.
//!
//! This crate provides:
//! - [`Cache`]: async `get` / `set` / `delete` over any
//!   [`flache_storage::StorageTree`]
//! - [`ShardPath`]: the `xx/yy/<sha1>` entry layout
//! - [`Codec`] and the built-in codecs (JSON by default)
//!
//! ## On-disk layout
//!
//! ```text
//! <root>/
//! └─ f8/
//!    └─ bf/
//!       └─ f8bf1076b5ce0c73ec334c35c19d254996a02d09   # sha1("og")
//! ```
//!
//! Entry content is exactly the codec output. There is no eviction, no
//! size limit and no metadata; entries live until overwritten, deleted, or
//! removed from the filesystem by something else.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
pub mod codec;
mod config;
mod error;
mod shard;

#[cfg(feature = "cbor")]
pub use codec::CborCodec;
pub use cache::Cache;
pub use codec::{BytesCodec, Codec, FnCodec, JsonCodec, TextCodec};
pub use config::{CacheConfig, DEFAULT_CACHE_DIR};
pub use error::{CacheError, CacheResult, CodecError};
pub use shard::{ShardPath, DIGEST_HEX_LEN};

/// Re-export of the storage layer.
pub use flache_storage as storage;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
