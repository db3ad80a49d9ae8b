//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested path does not exist in the tree.
    #[error("no such file: {path}")]
    NotFound {
        /// The relative path that was requested.
        path: String,
    },

    /// The backend does not support the requested operation.
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        /// The operation that was attempted.
        operation: &'static str,
        /// The backend that rejected it.
        backend: &'static str,
    },

    /// The path is not a safe relative path inside the tree.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A slice was requested with `start > end`.
    #[error("invalid range: start {start} is past end {end}")]
    InvalidRange {
        /// Requested start offset.
        start: u64,
        /// Requested end offset.
        end: u64,
    },

    /// The producer of a handle stream stopped unexpectedly.
    #[error("stream producer terminated")]
    StreamClosed,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Creates a not found error for `path`.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(operation: &'static str, backend: &'static str) -> Self {
        Self::Unsupported { operation, backend }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// Converts an I/O error raised while touching `path`, mapping a missing
    /// file to [`StorageError::NotFound`].
    pub fn from_io(path: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::not_found(path)
        } else {
            Self::Io(err)
        }
    }

    /// Returns true if this error means the path is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
