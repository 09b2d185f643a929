//! Byte-level cache persistence

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CacheError, IoOperation, Result};

/// Raw byte-level persistence contract, keyed by the full cache key.
///
/// Implementations are stateless per call: no handles are retained between
/// operations. Errors carry context; converting them to the public
/// `false`/`None` sentinels and routing them to the exception hook happens
/// once, in the handler pipeline.
pub trait CacheStore: Send + Sync {
    /// Write `value` under `key`, overwriting any previous entry
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Full stored bytes for `key`; `Ok(None)` when no entry exists
    /// (a normal miss, not an error)
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Delete the entry for `key`.
    ///
    /// Returns `Ok(true)` when an entry existed and was deleted, `Ok(false)`
    /// when no entry existed. Absence is never an error, so calling this
    /// twice is safe and returns `true` then `false`.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Whether an entry exists for `key`, without reading its contents
    fn contains(&self, key: &str) -> Result<bool>;

    /// Directory availability: storage exists (created if missing) and is
    /// writable. Every other operation fails when this does not hold.
    fn check(&self) -> bool;

    /// Total bytes of all stored entries
    fn size_bytes(&self) -> Result<u64>;

    /// Remove the storage location and all entries in it
    fn clear(&self) -> Result<()>;
}

/// File-per-entry [`CacheStore`]: one flat directory, each entry stored at
/// `directory/hex(sha256(key))`.
///
/// Files hold the raw post-encryption bytes with no embedded metadata; type
/// disambiguation relies entirely on the caller supplying the same prefixed
/// key and target type on read.
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Create a store over `directory`. The directory is created lazily on
    /// first write.
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// The cache directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.directory)
            .map_err(|e| CacheError::directory_unavailable(self.directory.clone(), e))
    }

    /// Resolve a cache key to its file path
    fn key_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.directory.join(hex::encode(digest))
    }
}

impl CacheStore for FileStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.ensure_directory()?;

        let path = self.key_path(key);
        fs::write(&path, value)
            .map_err(|e| CacheError::io_error(path.clone(), IoOperation::Write, e))?;

        debug!("wrote {} bytes for key: {}", value.len(), key);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_directory()?;

        let path = self.key_path(key);

        if !path.exists() {
            debug!("cache miss for key: {}", key);
            return Ok(None);
        }

        let bytes =
            fs::read(&path).map_err(|e| CacheError::io_error(path.clone(), IoOperation::Read, e))?;

        debug!("cache hit for key: {}", key);
        Ok(Some(bytes))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.ensure_directory()?;

        let path = self.key_path(key);

        if !path.exists() {
            debug!("no entry to remove for key: {}", key);
            return Ok(false);
        }

        fs::remove_file(&path)
            .map_err(|e| CacheError::io_error(path.clone(), IoOperation::Delete, e))?;

        debug!("removed entry for key: {}", key);
        Ok(true)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        self.ensure_directory()?;
        Ok(self.key_path(key).exists())
    }

    fn check(&self) -> bool {
        if self.ensure_directory().is_err() {
            return false;
        }
        fs::metadata(&self.directory)
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    fn size_bytes(&self) -> Result<u64> {
        if !self.directory.exists() {
            return Ok(0);
        }

        let mut total = 0u64;
        let entries = fs::read_dir(&self.directory)
            .map_err(|e| CacheError::io_error(self.directory.clone(), IoOperation::Read, e))?;

        for entry in entries {
            let entry = entry
                .map_err(|e| CacheError::io_error(self.directory.clone(), IoOperation::Read, e))?;
            if entry.path().is_file() {
                if let Ok(metadata) = entry.metadata() {
                    total += metadata.len();
                }
            }
        }
        Ok(total)
    }

    fn clear(&self) -> Result<()> {
        if !self.directory.exists() {
            return Ok(());
        }

        fs::remove_dir_all(&self.directory)
            .map_err(|e| CacheError::io_error(self.directory.clone(), IoOperation::Delete, e))?;

        debug!("deleted cache directory: {}", self.directory.display());
        Ok(())
    }
}
