//! Test fixtures and cache helpers.

use flache_core::{Cache, CacheConfig, Codec, JsonCodec, TextCodec};
use flache_storage::{SuppliedFile, SuppliedTree};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A directory-backed cache with automatic cleanup.
pub struct TestCache<C: Codec = JsonCodec> {
    /// The cache instance.
    pub cache: Cache<C>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl<C: Codec + Default> TestCache<C> {
    /// Creates a cache in a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = Cache::new(CacheConfig::new().path(temp_dir.path().join("cache")));
        Self { cache, temp_dir }
    }
}

impl TestCache<JsonCodec> {
    /// Creates a JSON cache.
    pub fn json() -> Self {
        Self::new()
    }
}

impl TestCache<TextCodec> {
    /// Creates a plain-text cache.
    pub fn text() -> Self {
        Self::new()
    }
}

impl<C: Codec> TestCache<C> {
    /// Root directory of the cache.
    pub fn root(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("cache")
    }

    /// Reads the raw bytes of the entry for `key`, if present.
    pub fn raw_entry(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.root().join(self.cache.path_of(key).as_str());
        std::fs::read(path).ok()
    }

    /// Counts entry files under the root.
    pub fn entry_count(&self) -> usize {
        count_files(&self.root())
    }
}

impl<C: Codec + Default> Default for TestCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> std::ops::Deref for TestCache<C> {
    type Target = Cache<C>;

    fn deref(&self) -> &Self::Target {
        &self.cache
    }
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

/// Creates a JSON cache over a supplied tree holding `files`.
pub fn supplied_cache(files: impl IntoIterator<Item = SuppliedFile>) -> Cache {
    let tree = Arc::new(SuppliedTree::with_files(files));
    Cache::from_tree(tree, JsonCodec::new())
}

/// Runs `future` to completion on a fresh current-thread runtime.
///
/// Proptest bodies are synchronous; this drives async cache calls from
/// inside them.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build tokio runtime")
        .block_on(future)
}

/// Runs a test with a temporary JSON cache.
///
/// # Example
///
/// ```rust,ignore
/// use flache_testkit::with_temp_cache;
///
/// with_temp_cache(|cache| async move {
///     cache.set("k", &serde_json::json!(1)).await.unwrap();
/// });
/// ```
pub fn with_temp_cache<F, Fut, R>(f: F) -> R
where
    F: FnOnce(Arc<TestCache>) -> Fut,
    Fut: Future<Output = R>,
{
    let cache = Arc::new(TestCache::json());
    block_on(f(cache))
}
