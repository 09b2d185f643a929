//! Disk cache facade and typed cache surfaces

use std::any::type_name;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{ConverterCodec, SerdeJsonCodec, TextCodec};
use crate::convert::{EncryptConverter, ExceptionHandler, ObjectConverter};
use crate::error::{CacheError, Result};
use crate::handler::Handler;
use crate::info::CacheInfo;
use crate::store::{CacheStore, FileStore};

const BOOLEAN_PREFIX: &str = "boolean_";
const INTEGER_PREFIX: &str = "integer_";
const LONG_PREFIX: &str = "long_";
const FLOAT_PREFIX: &str = "float_";
const DOUBLE_PREFIX: &str = "double_";
const STRING_PREFIX: &str = "string_";
const SERIALIZABLE_PREFIX: &str = "serializable_";
const OBJECT_PREFIX: &str = "object_";

/// Per-key typed cache for primitive values.
///
/// Operations never fail loudly: I/O and conversion problems are routed to
/// the configured exception handler and surface as `false`/`None`.
pub struct CommonCache<T> {
    handler: Handler<T>,
}

impl<T: Clone> CommonCache<T> {
    fn new(handler: Handler<T>) -> Self {
        Self { handler }
    }

    /// Store `value` under `key`
    pub fn put(&self, key: &str, value: T) -> bool {
        self.handler.put(key, &value)
    }

    /// The cached value for `key`, if present and readable
    pub fn get(&self, key: &str) -> Option<T> {
        self.handler.get(key)
    }

    /// The cached value for `key`, or `default` when absent or unreadable
    pub fn get_or(&self, key: &str, default: T) -> T {
        self.handler.get(key).unwrap_or(default)
    }

    /// Delete the entry for `key`; `true` when an entry existed and was
    /// deleted, `false` otherwise
    pub fn remove(&self, key: &str) -> bool {
        self.handler.remove(key)
    }

    /// Whether an entry exists for `key`, without decoding it
    pub fn contains(&self, key: &str) -> bool {
        self.handler.contains(key)
    }
}

/// Cache keyed by the fully-qualified type name of the stored value: at most
/// one value per concrete type, last write wins.
///
/// This is a deliberate simplification, not a general object store; callers
/// needing several values of one type use the per-key typed caches.
pub struct TypeKeyedCache {
    handler: Handler<serde_json::Value>,
}

impl TypeKeyedCache {
    fn new(handler: Handler<serde_json::Value>) -> Self {
        Self { handler }
    }

    /// Store `value` in the slot for its concrete type
    pub fn put<T: Serialize>(&self, value: &T) -> bool {
        let json = match serde_json::to_value(value) {
            Ok(json) => json,
            Err(error) => {
                self.handler
                    .report(CacheError::serialization(error.to_string()));
                return false;
            }
        };
        self.handler.put(type_name::<T>(), &json)
    }

    /// The value cached for type `T`, if present and readable
    pub fn get<T: DeserializeOwned>(&self) -> Option<T> {
        let json = self.handler.get(type_name::<T>())?;
        match serde_json::from_value(json) {
            Ok(value) => Some(value),
            Err(error) => {
                self.handler
                    .report(CacheError::deserialization(error.to_string()));
                None
            }
        }
    }

    /// Delete the slot for type `T`
    pub fn remove<T>(&self) -> bool {
        self.handler.remove(type_name::<T>())
    }

    /// Whether a value is cached for type `T`
    pub fn contains<T>(&self) -> bool {
        self.handler.contains(type_name::<T>())
    }
}

/// Builder for [`DiskCache`]
pub struct DiskCacheBuilder {
    directory: std::path::PathBuf,
    encrypt: bool,
    memory_support: bool,
    encrypt_converter: Option<Arc<dyn EncryptConverter>>,
    object_converter: Option<Arc<dyn ObjectConverter>>,
    exception_handler: Option<Arc<dyn ExceptionHandler>>,
    store: Option<Arc<dyn CacheStore>>,
}

impl DiskCacheBuilder {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            encrypt: false,
            memory_support: false,
            encrypt_converter: None,
            object_converter: None,
            exception_handler: None,
            store: None,
        }
    }

    /// Wrap every store write/read with the encrypt converter
    pub fn encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Mirror decoded values in process memory
    pub fn memory_support(mut self, memory_support: bool) -> Self {
        self.memory_support = memory_support;
        self
    }

    /// Set the encryption converter; required when `encrypt` is enabled
    pub fn encrypt_converter(mut self, converter: Arc<dyn EncryptConverter>) -> Self {
        self.encrypt_converter = Some(converter);
        self
    }

    /// Set the object converter; required only when the object cache is used
    pub fn object_converter(mut self, converter: Arc<dyn ObjectConverter>) -> Self {
        self.object_converter = Some(converter);
        self
    }

    /// Replace the default logging exception handler
    pub fn exception_handler(mut self, handler: Arc<dyn ExceptionHandler>) -> Self {
        self.exception_handler = Some(handler);
        self
    }

    /// Replace the default [`FileStore`] with a custom byte store
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the cache.
    ///
    /// Fails with a configuration error when encryption is enabled without a
    /// converter.
    pub fn build(self) -> Result<DiskCache> {
        let info = Arc::new(CacheInfo::new(
            self.encrypt,
            self.memory_support,
            self.encrypt_converter,
            self.object_converter,
            self.exception_handler,
        )?);
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(FileStore::new(&self.directory)));

        Ok(DiskCache::assemble(store, info))
    }
}

/// Typed, file-backed key-value cache over one directory.
///
/// One handler per supported type is created up front and reused for every
/// operation, so memory mirrors survive across calls on the same facade.
/// Concurrent operations on the same key are not synchronized against each
/// other; callers needing that add their own per-key discipline.
pub struct DiskCache {
    store: Arc<dyn CacheStore>,
    booleans: CommonCache<bool>,
    integers: CommonCache<i32>,
    longs: CommonCache<i64>,
    floats: CommonCache<f32>,
    doubles: CommonCache<f64>,
    strings: CommonCache<String>,
    serializables: TypeKeyedCache,
    objects: Option<TypeKeyedCache>,
}

impl DiskCache {
    /// Open a cache over `directory` with default configuration: no
    /// encryption, no memory mirror, logging exception handler.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self> {
        DiskCacheBuilder::new(directory).build()
    }

    /// Start building a cache over `directory`
    pub fn builder(directory: impl AsRef<Path>) -> DiskCacheBuilder {
        DiskCacheBuilder::new(directory)
    }

    fn assemble(store: Arc<dyn CacheStore>, info: Arc<CacheInfo>) -> Self {
        let objects = info.object_converter().cloned().map(|converter| {
            TypeKeyedCache::new(Handler::new(
                OBJECT_PREFIX,
                Box::new(ConverterCodec::new(converter)),
                store.clone(),
                info.clone(),
            ))
        });

        Self {
            booleans: CommonCache::new(Handler::new(
                BOOLEAN_PREFIX,
                Box::new(TextCodec::new()),
                store.clone(),
                info.clone(),
            )),
            integers: CommonCache::new(Handler::new(
                INTEGER_PREFIX,
                Box::new(TextCodec::new()),
                store.clone(),
                info.clone(),
            )),
            longs: CommonCache::new(Handler::new(
                LONG_PREFIX,
                Box::new(TextCodec::new()),
                store.clone(),
                info.clone(),
            )),
            floats: CommonCache::new(Handler::new(
                FLOAT_PREFIX,
                Box::new(TextCodec::new()),
                store.clone(),
                info.clone(),
            )),
            doubles: CommonCache::new(Handler::new(
                DOUBLE_PREFIX,
                Box::new(TextCodec::new()),
                store.clone(),
                info.clone(),
            )),
            strings: CommonCache::new(Handler::new(
                STRING_PREFIX,
                Box::new(TextCodec::new()),
                store.clone(),
                info.clone(),
            )),
            serializables: TypeKeyedCache::new(Handler::new(
                SERIALIZABLE_PREFIX,
                Box::new(SerdeJsonCodec),
                store.clone(),
                info,
            )),
            objects,
            store,
        }
    }

    /// Boolean cache (`boolean_` prefix)
    pub fn bool_cache(&self) -> &CommonCache<bool> {
        &self.booleans
    }

    /// 32-bit integer cache (`integer_` prefix)
    pub fn i32_cache(&self) -> &CommonCache<i32> {
        &self.integers
    }

    /// 64-bit integer cache (`long_` prefix)
    pub fn i64_cache(&self) -> &CommonCache<i64> {
        &self.longs
    }

    /// 32-bit float cache (`float_` prefix)
    pub fn f32_cache(&self) -> &CommonCache<f32> {
        &self.floats
    }

    /// 64-bit float cache (`double_` prefix)
    pub fn f64_cache(&self) -> &CommonCache<f64> {
        &self.doubles
    }

    /// String cache (`string_` prefix)
    pub fn string_cache(&self) -> &CommonCache<String> {
        &self.strings
    }

    /// serde-backed cache holding one value per concrete type
    /// (`serializable_` prefix)
    pub fn serializable_cache(&self) -> &TypeKeyedCache {
        &self.serializables
    }

    /// Converter-backed cache holding one value per concrete type
    /// (`object_` prefix).
    ///
    /// Fails with a configuration error when no
    /// [`ObjectConverter`] was configured; programmer misuse, so the error is
    /// loud and never routed through the exception handler.
    pub fn object_cache(&self) -> Result<&TypeKeyedCache> {
        self.objects.as_ref().ok_or_else(|| {
            CacheError::configuration(
                "object cache requires an ObjectConverter; none is configured",
            )
        })
    }

    /// Whether the cache directory exists (created if missing) and is
    /// writable
    pub fn check_directory(&self) -> bool {
        self.store.check()
    }

    /// Total bytes of all cache files in the directory
    pub fn size(&self) -> Result<u64> {
        self.store.size_bytes()
    }

    /// Remove the cache directory and everything in it
    pub fn delete(&self) -> Result<()> {
        self.store.clear()
    }
}
