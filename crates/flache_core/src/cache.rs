//! The cache itself.

use crate::codec::{Codec, JsonCodec};
use crate::config::CacheConfig;
use crate::error::CacheResult;
use crate::shard::ShardPath;
use flache_storage::{Backend, StorageHandle, StorageTree};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A persistent key-value cache over a [`StorageTree`].
///
/// Each key is hashed to a [`ShardPath`]; the entry at that path holds
/// exactly the codec's bytes for the value. Entries carry no metadata and
/// live until they are overwritten or deleted.
///
/// A missing entry is not an error: [`Cache::get`] returns `None` and
/// [`Cache::delete`] succeeds. Every other storage or codec failure is
/// returned to the caller.
///
/// # Example
///
/// ```rust,no_run
/// use flache_core::{Cache, CacheConfig};
/// use serde_json::json;
///
/// # async fn demo() -> flache_core::CacheResult<()> {
/// let cache: Cache = Cache::new(CacheConfig::new().path("cache"));
/// cache.set("og", &json!({"says": "Hi there"})).await?;
/// assert_eq!(cache.get("og").await?, Some(json!({"says": "Hi there"})));
/// # Ok(())
/// # }
/// ```
pub struct Cache<C: Codec = JsonCodec> {
    tree: Arc<dyn StorageTree>,
    codec: C,
}

impl<C: Codec + Default> Cache<C> {
    /// Opens a cache with the codec's default configuration.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_codec(config, C::default())
    }
}

impl<C: Codec> Cache<C> {
    /// Opens a cache using `codec`, on the backend chosen from
    /// `config.host`.
    ///
    /// When the supplied backend is selected it is populated with
    /// `config.files`.
    #[must_use]
    pub fn with_codec(config: CacheConfig, codec: C) -> Self {
        let backend = Backend::for_host(&config.host, config.path);
        if let Some(tree) = backend.as_supplied() {
            debug!(files = config.files.len(), "loading supplied files");
            tree.add_files(config.files);
        }
        Self::from_tree(Arc::new(backend), codec)
    }

    /// Creates a cache over an existing tree.
    #[must_use]
    pub fn from_tree(tree: Arc<dyn StorageTree>, codec: C) -> Self {
        Self { tree, codec }
    }

    /// Returns the entry path for `key`.
    #[must_use]
    pub fn path_of(&self, key: impl AsRef<[u8]>) -> ShardPath {
        ShardPath::for_key(key)
    }

    /// Returns the codec.
    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Returns the underlying tree.
    #[must_use]
    pub fn tree(&self) -> &Arc<dyn StorageTree> {
        &self.tree
    }

    /// Reads and decodes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be read or decoded.
    pub async fn get(&self, key: impl AsRef<[u8]>) -> CacheResult<Option<C::Value>> {
        let path = ShardPath::for_key(key);
        let bytes = match self.tree.read_file(path.as_str()).await {
            Ok(bytes) => bytes,
            Err(err) if err.is_not_found() => {
                debug!(%path, "cache miss");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        debug!(%path, len = bytes.len(), "cache hit");
        Ok(Some(self.codec.decode(&bytes)?))
    }

    /// Encodes `value` and stores it under `key`, replacing any previous
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the tree rejects the write.
    pub async fn set(&self, key: impl AsRef<[u8]>, value: &C::Value) -> CacheResult<()> {
        let path = ShardPath::for_key(key);
        let bytes = self.codec.encode(value)?;
        self.tree.write_file(path.as_str(), &bytes).await?;
        debug!(%path, len = bytes.len(), "cache set");
        Ok(())
    }

    /// Removes the entry for `key`. Removing a missing entry succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than the entry being absent.
    pub async fn delete(&self, key: impl AsRef<[u8]>) -> CacheResult<()> {
        let path = ShardPath::for_key(key);
        match self.tree.remove_file(path.as_str()).await {
            Ok(()) => {
                debug!(%path, "cache delete");
                Ok(())
            }
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns true if an entry exists for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    pub async fn contains(&self, key: impl AsRef<[u8]>) -> CacheResult<bool> {
        let path = ShardPath::for_key(key);
        Ok(self.tree.contains(path.as_str()).await?)
    }

    /// Opens the entry for `key` as a handle for ranged or streamed reads.
    ///
    /// On the directory backend a missing entry is created empty.
    ///
    /// # Errors
    ///
    /// Returns the tree's error, e.g. `NotFound` on the supplied backend.
    pub async fn open_entry(&self, key: impl AsRef<[u8]>) -> CacheResult<StorageHandle> {
        let path = ShardPath::for_key(key);
        Ok(self.tree.open_file(path.as_str()).await?)
    }
}

impl<C: Codec + fmt::Debug> fmt::Debug for Cache<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.tree.name())
            .field("codec", &self.codec)
            .finish()
    }
}
