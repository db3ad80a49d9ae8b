//! Content-derived entry paths.
//!
//! A key maps to `"{h0}/{h1}/{h}"` where `h` is the lowercase hex SHA-1 of
//! the key bytes, `h0` its first two characters and `h1` the next two. The
//! two directory levels cap fan-out at 256 entries per directory level.
//! This layout is the on-disk contract; it must not change.

use sha1::{Digest, Sha1};
use std::fmt;

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_HEX_LEN: usize = 40;

/// The sharded relative path of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardPath {
    path: String,
}

impl ShardPath {
    /// Derives the path for `key`.
    ///
    /// Text keys hash their UTF-8 bytes; binary keys hash as-is.
    ///
    /// ```rust
    /// use flache_core::ShardPath;
    ///
    /// let path = ShardPath::for_key("og");
    /// assert_eq!(path.level1(), &path.digest()[..2]);
    /// assert_eq!(path.as_str().len(), 2 + 1 + 2 + 1 + 40);
    /// ```
    pub fn for_key(key: impl AsRef<[u8]>) -> Self {
        let digest = hex::encode(Sha1::digest(key.as_ref()));
        let path = format!("{}/{}/{}", &digest[..2], &digest[2..4], digest);
        Self { path }
    }

    /// Full relative path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The 40-character hex digest (file name).
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.path[6..]
    }

    /// First directory level.
    #[must_use]
    pub fn level1(&self) -> &str {
        &self.path[..2]
    }

    /// Second directory level.
    #[must_use]
    pub fn level2(&self) -> &str {
        &self.path[3..5]
    }
}

impl fmt::Display for ShardPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for ShardPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}
