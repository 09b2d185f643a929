//! Pluggable converters and the exception hook
//!
//! Three independent seams wrap the handler pipeline: symmetric encryption of
//! persisted bytes, type-erased object serialization, and the hook that
//! receives every swallowed failure.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm,
};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::{CacheError, Result};

/// Symmetric transform applied to bytes immediately before every store write
/// and immediately after every store read, when encryption is enabled.
///
/// `encrypt` and `decrypt` must be true inverses of each other.
pub trait EncryptConverter: Send + Sync {
    /// Encrypt plaintext bytes
    fn encrypt(&self, bytes: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt previously encrypted bytes
    fn decrypt(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Object ⇄ byte serialization used by the object cache.
///
/// `serde_json::Value` is the type-erased interchange form; typed values are
/// lifted in and out of it at the facade.
pub trait ObjectConverter: Send + Sync {
    /// Serialize a value to bytes
    fn to_bytes(&self, value: &serde_json::Value) -> Result<Vec<u8>>;

    /// Deserialize bytes back to a value
    fn from_bytes(&self, bytes: &[u8]) -> Result<serde_json::Value>;
}

/// Receives every I/O, encryption, and conversion failure, synchronously,
/// before the failing operation returns its `false`/`None` sentinel.
///
/// This hook is the only channel through which callers can distinguish
/// "value absent" from "value present but unreadable".
pub trait ExceptionHandler: Send + Sync {
    fn on_error(&self, error: &CacheError);
}

/// AES-256-GCM [`EncryptConverter`].
///
/// A fresh random nonce is drawn per write and prepended to the ciphertext,
/// so equal plaintexts do not produce equal files.
pub struct AesGcmConverter {
    key: [u8; 32],
}

const NONCE_LEN: usize = 12;

impl AesGcmConverter {
    /// Create a converter from a raw 256-bit key
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Derive the key from a passphrase via SHA-256
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(passphrase.as_bytes());
        Self {
            key: hasher.finalize().into(),
        }
    }
}

impl EncryptConverter for AesGcmConverter {
    fn encrypt(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce_bytes);

        let cipher = Aes256Gcm::new(&self.key.into());
        let nonce = aes_gcm::Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, bytes)
            .map_err(|e| CacheError::encryption(e.to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn decrypt(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        if bytes.len() < NONCE_LEN {
            return Err(CacheError::decryption("input shorter than nonce"));
        }
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new(&self.key.into());
        let nonce = aes_gcm::Nonce::from_slice(nonce_bytes);
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| CacheError::decryption(e.to_string()))
    }
}

/// serde_json-backed [`ObjectConverter`]
pub struct JsonConverter;

impl ObjectConverter for JsonConverter {
    fn to_bytes(&self, value: &serde_json::Value) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CacheError::serialization(e.to_string()))
    }

    fn from_bytes(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::deserialization(e.to_string()))
    }
}

/// Default [`ExceptionHandler`]: logs at `warn` level
pub struct LogExceptionHandler;

impl ExceptionHandler for LogExceptionHandler {
    fn on_error(&self, error: &CacheError) {
        warn!("cache operation failed: {}", error);
    }
}

/// [`ExceptionHandler`] that swallows everything
pub struct NoopExceptionHandler;

impl ExceptionHandler for NoopExceptionHandler {
    fn on_error(&self, _error: &CacheError) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes_gcm_round_trip() {
        let converter = AesGcmConverter::from_passphrase("test-passphrase");
        let plaintext = b"some cached payload";

        let encrypted = converter.encrypt(plaintext).unwrap();
        assert_ne!(&encrypted[NONCE_LEN..], plaintext.as_slice());

        let decrypted = converter.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_aes_gcm_nonce_varies_per_write() {
        let converter = AesGcmConverter::new([7u8; 32]);

        let first = converter.encrypt(b"same input").unwrap();
        let second = converter.encrypt(b"same input").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_aes_gcm_wrong_key_fails() {
        let encrypted = AesGcmConverter::from_passphrase("right")
            .encrypt(b"secret")
            .unwrap();

        let result = AesGcmConverter::from_passphrase("wrong").decrypt(&encrypted);
        assert!(matches!(result, Err(CacheError::Decryption { .. })));
    }

    #[test]
    fn test_aes_gcm_tampered_ciphertext_fails() {
        let converter = AesGcmConverter::new([1u8; 32]);
        let mut encrypted = converter.encrypt(b"secret").unwrap();
        let last = encrypted.len() - 1;
        encrypted[last] ^= 0xff;

        assert!(converter.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_aes_gcm_truncated_input_fails() {
        let converter = AesGcmConverter::new([1u8; 32]);
        assert!(converter.decrypt(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_json_converter_round_trip() {
        let converter = JsonConverter;
        let value = serde_json::json!({"name": "larder", "launches": 3});

        let bytes = converter.to_bytes(&value).unwrap();
        let restored = converter.from_bytes(&bytes).unwrap();
        assert_eq!(restored, value);
    }

    #[test]
    fn test_json_converter_malformed_bytes() {
        let converter = JsonConverter;
        let result = converter.from_bytes(b"not json at all{{");
        assert!(matches!(result, Err(CacheError::Deserialization { .. })));
    }
}
