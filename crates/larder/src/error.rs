//! Cache-related error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Cache operation errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache directory missing or not creatable
    #[error("cache directory unavailable at {}: {source}", path.display())]
    DirectoryUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File read/write/delete failed
    #[error("IO error on {} ({operation}): {source}", path.display())]
    Io {
        path: PathBuf,
        operation: IoOperation,
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("deserialization error: {message}")]
    Deserialization { message: String },

    #[error("encryption error: {message}")]
    Encryption { message: String },

    #[error("decryption error: {message}")]
    Decryption { message: String },

    /// Empty or otherwise unusable cache key
    #[error("invalid cache key: {key:?}")]
    InvalidKey { key: String },

    /// Programmer misuse; never routed through the exception handler
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

/// IO operation type for error context
#[derive(Debug, Clone, Copy)]
pub enum IoOperation {
    Read,
    Write,
    Delete,
}

impl std::fmt::Display for IoOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoOperation::Read => write!(f, "read"),
            IoOperation::Write => write!(f, "write"),
            IoOperation::Delete => write!(f, "delete"),
        }
    }
}

impl CacheError {
    /// Create a directory unavailable error
    pub fn directory_unavailable(path: PathBuf, source: std::io::Error) -> Self {
        CacheError::DirectoryUnavailable { path, source }
    }

    /// Create an IO error
    pub fn io_error(path: PathBuf, operation: IoOperation, source: std::io::Error) -> Self {
        CacheError::Io {
            path,
            operation,
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        CacheError::Serialization {
            message: message.into(),
        }
    }

    /// Create a deserialization error
    pub fn deserialization(message: impl Into<String>) -> Self {
        CacheError::Deserialization {
            message: message.into(),
        }
    }

    /// Create an encryption error
    pub fn encryption(message: impl Into<String>) -> Self {
        CacheError::Encryption {
            message: message.into(),
        }
    }

    /// Create a decryption error
    pub fn decryption(message: impl Into<String>) -> Self {
        CacheError::Decryption {
            message: message.into(),
        }
    }

    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>) -> Self {
        CacheError::InvalidKey { key: key.into() }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        CacheError::Configuration {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        CacheError::Storage {
            message: message.into(),
        }
    }
}
