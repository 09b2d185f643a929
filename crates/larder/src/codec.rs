//! Value ⇄ byte conversion steps
//!
//! Each typed cache is the generic handler composed with one [`Codec`]: a
//! canonical-text codec for the primitive caches, a serde_json codec for the
//! serializable cache, and a codec deferring to the configured
//! [`ObjectConverter`](crate::convert::ObjectConverter) for the object cache.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use crate::convert::ObjectConverter;
use crate::error::{CacheError, Result};

/// A single conversion step between a typed value and persisted bytes
pub trait Codec<T>: Send + Sync {
    /// Convert a value to bytes
    fn encode(&self, value: &T) -> Result<Vec<u8>>;

    /// Convert bytes back to a value
    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

/// Canonical-text codec for primitive types.
///
/// Value ⇄ string via `Display`/`FromStr`, string ⇄ bytes fixed as UTF-8, so
/// a boolean is persisted as `true`/`false` and numbers as decimal text.
pub struct TextCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TextCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TextCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for TextCodec<T>
where
    T: Display + FromStr + Send + Sync,
    T::Err: Display,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>> {
        Ok(value.to_string().into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CacheError::deserialization(format!("not valid UTF-8: {}", e)))?;
        text.parse::<T>()
            .map_err(|e| CacheError::deserialization(format!("cannot parse {:?}: {}", text, e)))
    }
}

/// serde_json codec driving the serializable cache
pub struct SerdeJsonCodec;

impl Codec<serde_json::Value> for SerdeJsonCodec {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CacheError::serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::deserialization(e.to_string()))
    }
}

/// Codec deferring to a configured [`ObjectConverter`]
pub struct ConverterCodec {
    converter: Arc<dyn ObjectConverter>,
}

impl ConverterCodec {
    pub fn new(converter: Arc<dyn ObjectConverter>) -> Self {
        Self { converter }
    }
}

impl Codec<serde_json::Value> for ConverterCodec {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>> {
        self.converter.to_bytes(value)
    }

    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        self.converter.from_bytes(bytes)
    }
}
