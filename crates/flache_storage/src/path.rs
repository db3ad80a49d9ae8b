//! Relative path validation.

use crate::error::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

/// Joins a `/`-separated relative path onto `root`.
///
/// Rejects empty paths, absolute paths and any `.` or `..` component so
/// that no tree operation can reach outside its root.
pub(crate) fn resolve(root: &Path, path: &str) -> StorageResult<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(StorageError::invalid_path(path, "empty path"));
    }
    if path.starts_with("//") || path.contains('\\') {
        return Err(StorageError::invalid_path(path, "unsupported separator"));
    }

    let mut resolved = root.to_path_buf();
    for component in trimmed.split('/') {
        match component {
            "" => return Err(StorageError::invalid_path(path, "empty component")),
            "." | ".." => return Err(StorageError::invalid_path(path, "relative component")),
            c if c.contains(':') => {
                return Err(StorageError::invalid_path(path, "drive or stream prefix"))
            }
            c => resolved.push(c),
        }
    }
    Ok(resolved)
}
