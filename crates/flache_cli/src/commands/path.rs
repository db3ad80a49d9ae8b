//! Path command implementation.

use flache_core::ShardPath;
use serde::Serialize;
use std::path::Path;

/// Where a key lives.
#[derive(Debug, Serialize)]
pub struct PathInfo {
    /// The key.
    pub key: String,
    /// SHA-1 digest of the key.
    pub digest: String,
    /// Path relative to the cache root.
    pub relative: String,
    /// Path on disk.
    pub absolute: String,
}

/// Runs the path command.
pub fn run(root: &Path, key: &str) -> PathInfo {
    let shard = ShardPath::for_key(key);
    let absolute = root
        .join(shard.level1())
        .join(shard.level2())
        .join(shard.digest());
    PathInfo {
        key: key.to_string(),
        digest: shard.digest().to_string(),
        relative: shard.to_string(),
        absolute: absolute.display().to_string(),
    }
}

/// Prints path information in the requested format.
pub fn print(info: &PathInfo, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(info)?),
        "text" => println!("{}", info.absolute),
        other => return Err(format!("unknown format: {other}").into()),
    }
    Ok(())
}
