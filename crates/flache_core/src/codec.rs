//! Entry codecs.
//!
//! A [`Codec`] turns a value into the bytes stored in an entry and back.
//! The cache owns exactly one codec, fixed when it is constructed.

use crate::error::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

/// Converts values to entry bytes and back.
///
/// Implementations must round-trip: `decode(encode(v))` equals `v` up to
/// the fidelity of the format. Encoding the same value twice should give
/// identical bytes so repeated `set` calls leave entries unchanged.
///
/// # Example
///
/// ```rust
/// use flache_core::{Codec, CodecError};
///
/// struct Upper;
///
/// impl Codec for Upper {
///     type Value = String;
///
///     fn encode(&self, value: &String) -> Result<Vec<u8>, CodecError> {
///         Ok(value.to_uppercase().into_bytes())
///     }
///
///     fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
///         Ok(String::from_utf8(bytes.to_vec())?)
///     }
/// }
/// ```
pub trait Codec: Send + Sync {
    /// The value type stored in the cache.
    type Value;

    /// Encodes a value into entry bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented.
    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, CodecError>;

    /// Decodes entry bytes into a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are malformed.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Value, CodecError>;
}

/// JSON codec using `serde_json`. The default codec.
///
/// Entries are compact JSON text. `T` defaults to [`serde_json::Value`], so
/// any JSON document can be stored without declaring a type.
pub struct JsonCodec<T = serde_json::Value> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    /// Creates a JSON codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<T> Codec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Binary CBOR codec using `ciborium`.
#[cfg(feature = "cbor")]
pub struct CborCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

#[cfg(feature = "cbor")]
impl<T> CborCodec<T> {
    /// Creates a CBOR codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

#[cfg(feature = "cbor")]
impl<T> Default for CborCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cbor")]
impl<T> fmt::Debug for CborCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CborCodec")
    }
}

#[cfg(feature = "cbor")]
impl<T> Codec for CborCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        ciborium::into_writer(value, &mut out).map_err(|e| CodecError::Cbor(e.to_string()))?;
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        ciborium::from_reader(bytes).map_err(|e| CodecError::Cbor(e.to_string()))
    }
}

/// Identity codec for text: entries hold the string's UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    type Value = String;

    fn encode(&self, value: &String) -> Result<Vec<u8>, CodecError> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Identity codec for raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    type Value = Vec<u8>;

    fn encode(&self, value: &Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }
}

/// A codec built from a pair of functions.
///
/// ```rust
/// use flache_core::{Codec, FnCodec};
///
/// let codec = FnCodec::new(
///     |n: &u64| Ok(n.to_string().into_bytes()),
///     |b: &[u8]| {
///         std::str::from_utf8(b)
///             .ok()
///             .and_then(|s| s.parse().ok())
///             .ok_or_else(|| flache_core::CodecError::custom("not a number"))
///     },
/// );
/// assert_eq!(codec.decode(&codec.encode(&42).unwrap()).unwrap(), 42);
/// ```
pub struct FnCodec<V, E, D> {
    encode: E,
    decode: D,
    _marker: PhantomData<fn() -> V>,
}

impl<V, E, D> FnCodec<V, E, D>
where
    E: Fn(&V) -> Result<Vec<u8>, CodecError> + Send + Sync,
    D: Fn(&[u8]) -> Result<V, CodecError> + Send + Sync,
{
    /// Creates a codec from an encoder and a decoder.
    pub fn new(encode: E, decode: D) -> Self {
        Self {
            encode,
            decode,
            _marker: PhantomData,
        }
    }
}

impl<V, E, D> fmt::Debug for FnCodec<V, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCodec")
    }
}

impl<V, E, D> Codec for FnCodec<V, E, D>
where
    E: Fn(&V) -> Result<Vec<u8>, CodecError> + Send + Sync,
    D: Fn(&[u8]) -> Result<V, CodecError> + Send + Sync,
{
    type Value = V;

    fn encode(&self, value: &V) -> Result<Vec<u8>, CodecError> {
        (self.encode)(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<V, CodecError> {
        (self.decode)(bytes)
    }
}
