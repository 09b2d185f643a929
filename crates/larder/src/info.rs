//! Shared cache configuration

use std::sync::Arc;

use crate::convert::{EncryptConverter, ExceptionHandler, LogExceptionHandler, ObjectConverter};
use crate::error::{CacheError, Result};

/// Configuration bundle read by every handler and store call.
///
/// Built once by [`DiskCacheBuilder`](crate::disk::DiskCacheBuilder) and
/// immutable afterwards.
pub struct CacheInfo {
    encrypt: bool,
    memory_support: bool,
    encrypt_converter: Option<Arc<dyn EncryptConverter>>,
    object_converter: Option<Arc<dyn ObjectConverter>>,
    exception_handler: Arc<dyn ExceptionHandler>,
}

impl CacheInfo {
    /// Validates the configuration: enabling encryption without a converter
    /// is a configuration error.
    pub(crate) fn new(
        encrypt: bool,
        memory_support: bool,
        encrypt_converter: Option<Arc<dyn EncryptConverter>>,
        object_converter: Option<Arc<dyn ObjectConverter>>,
        exception_handler: Option<Arc<dyn ExceptionHandler>>,
    ) -> Result<Self> {
        if encrypt && encrypt_converter.is_none() {
            return Err(CacheError::configuration(
                "encryption enabled but no EncryptConverter is configured",
            ));
        }

        Ok(Self {
            encrypt,
            memory_support,
            encrypt_converter,
            object_converter,
            exception_handler: exception_handler.unwrap_or_else(|| Arc::new(LogExceptionHandler)),
        })
    }

    /// Whether persisted bytes are wrapped with the encrypt converter
    pub fn encrypt(&self) -> bool {
        self.encrypt
    }

    /// Whether decoded values are mirrored in process memory
    pub fn memory_support(&self) -> bool {
        self.memory_support
    }

    /// The active encrypt converter; a configuration error when absent.
    ///
    /// Construction guarantees presence while `encrypt` is true, so handler
    /// code reaching the error arm indicates misuse, not an I/O condition.
    pub fn encrypt_converter(&self) -> Result<&Arc<dyn EncryptConverter>> {
        self.encrypt_converter.as_ref().ok_or_else(|| {
            CacheError::configuration("no EncryptConverter is configured")
        })
    }

    /// The configured object converter, if any
    pub fn object_converter(&self) -> Option<&Arc<dyn ObjectConverter>> {
        self.object_converter.as_ref()
    }

    /// The exception hook; never absent
    pub fn exception_handler(&self) -> &Arc<dyn ExceptionHandler> {
        &self.exception_handler
    }
}
