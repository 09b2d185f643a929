//! # Larder
//!
//! Typed, file-backed key-value caching with pluggable encryption,
//! serialization, and exception handling.
//!
//! ## Features
//!
//! - **Typed facades**: bool, i32, i64, f32, f64, String, plus
//!   serde-serializable and converter-backed object caches
//! - **File-per-entry layout**: one flat directory, filenames are SHA-256
//!   digests of the prefixed cache key
//! - **Optional encryption**: a symmetric converter wrapped around every
//!   write and read
//! - **Optional memory mirror**: an in-process cache of decoded values
//!   consulted before disk
//! - **Swallowed failures**: I/O and conversion errors are routed to a
//!   pluggable hook and surface as `false`/`None`, never as panics
//!
//! ## Example
//!
//! ```no_run
//! use larder::DiskCache;
//!
//! # fn main() -> larder::Result<()> {
//! let cache = DiskCache::builder("/tmp/app-cache")
//!     .memory_support(true)
//!     .build()?;
//!
//! cache.bool_cache().put("first_run", false);
//! let first_run = cache.bool_cache().get_or("first_run", true);
//! # let _ = first_run;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod convert;
pub mod disk;
pub mod error;
pub mod handler;
pub mod info;
pub mod store;

pub use codec::{Codec, ConverterCodec, SerdeJsonCodec, TextCodec};
pub use convert::{
    AesGcmConverter, EncryptConverter, ExceptionHandler, JsonConverter, LogExceptionHandler,
    NoopExceptionHandler, ObjectConverter,
};
pub use disk::{CommonCache, DiskCache, DiskCacheBuilder, TypeKeyedCache};
pub use error::CacheError;
pub use handler::MemoryMirror;
pub use info::CacheInfo;
pub use store::{CacheStore, FileStore};

/// Re-export commonly used Result type
pub type Result<T> = std::result::Result<T, CacheError>;
