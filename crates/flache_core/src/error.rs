//! Error types for cache operations.

use flache_storage::StorageError;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised while encoding or decoding a cache entry.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization or deserialization failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// CBOR serialization or deserialization failed.
    #[error("cbor: {0}")]
    Cbor(String),

    /// Entry content was expected to be UTF-8 text.
    #[error("entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A caller-supplied codec failed.
    #[error("{0}")]
    Custom(String),
}

impl CodecError {
    /// Creates a custom codec error.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Errors that can occur in cache operations.
///
/// A missing entry is never an error at this level: `get` reports it as
/// `None` and `delete` ignores it. Everything else surfaces here.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Storage tree error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Encoder or decoder error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl CacheError {
    /// Returns true if the error came from the encoder or decoder.
    #[must_use]
    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Codec(_))
    }

    /// Returns the storage error, if this is one.
    #[must_use]
    pub fn as_storage(&self) -> Option<&StorageError> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Codec(_) => None,
        }
    }
}
