//! CLI command implementations.

pub mod cat;
pub mod delete;
pub mod get;
pub mod path;
pub mod set;

use flache_core::{Cache, CacheConfig, Codec, JsonCodec, TextCodec};
use std::path::Path;

/// How values are encoded on disk and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Values are JSON documents.
    Json,
    /// Values are stored verbatim as text.
    Raw,
}

/// Opens a cache rooted at `root` with the given codec.
pub fn open<C: Codec + Default>(root: &Path) -> Cache<C> {
    Cache::new(CacheConfig::new().path(root))
}

pub(crate) fn open_json(root: &Path) -> Cache<JsonCodec> {
    open(root)
}

pub(crate) fn open_raw(root: &Path) -> Cache<TextCodec> {
    open(root)
}
