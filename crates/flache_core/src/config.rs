//! Cache configuration.

use flache_storage::{HostCapabilities, SuppliedFile};
use std::path::PathBuf;

/// Root directory used when none is configured.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Configuration for opening a cache.
///
/// Configuration is consumed at construction; a cache never changes its
/// root, backend or codec afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Root directory of the cache (ignored by the supplied backend).
    pub path: PathBuf,

    /// What the hosting environment can do; decides the backend.
    pub host: HostCapabilities,

    /// Files the host hands over up front. Loaded into the supplied backend
    /// when it is selected, ignored otherwise.
    pub files: Vec<SuppliedFile>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CACHE_DIR),
            host: HostCapabilities::native(),
            files: Vec::new(),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the host capabilities.
    #[must_use]
    pub fn host(mut self, host: HostCapabilities) -> Self {
        self.host = host;
        self
    }

    /// Adds files supplied by the host.
    #[must_use]
    pub fn supplied(mut self, files: impl IntoIterator<Item = SuppliedFile>) -> Self {
        self.files.extend(files);
        self
    }
}
