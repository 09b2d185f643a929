//! Generic orchestration pipeline
//!
//! One [`Handler`] per typed cache. A put flows value → codec encode →
//! optional encrypt → store write; a get runs the inverse, consulting the
//! memory mirror first when enabled. Every store, encryption, or codec
//! failure is routed to the configured exception hook and collapses to
//! `false`/`None` here; nothing propagates past the cache API.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::Codec;
use crate::error::{CacheError, Result};
use crate::info::CacheInfo;
use crate::store::CacheStore;

/// In-process mirror of decoded values, keyed by full cache key.
///
/// Unbounded and process-lifetime; entries leave only through explicit
/// removes. The lock guards memory safety, not per-key atomicity: concurrent
/// put/get/remove on the same key may interleave with disk state arbitrarily.
pub struct MemoryMirror<T> {
    entries: RwLock<HashMap<String, T>>,
}

impl<T: Clone> MemoryMirror<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: T) {
        self.entries.write().insert(key.to_string(), value);
    }

    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl<T: Clone> Default for MemoryMirror<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed put/get/remove pipeline over a byte store.
///
/// Composed, not subclassed: the per-type behavior is the injected codec and
/// key prefix.
pub(crate) struct Handler<T> {
    prefix: &'static str,
    codec: Box<dyn Codec<T>>,
    store: Arc<dyn CacheStore>,
    info: Arc<CacheInfo>,
    mirror: Option<MemoryMirror<T>>,
}

impl<T: Clone> Handler<T> {
    pub(crate) fn new(
        prefix: &'static str,
        codec: Box<dyn Codec<T>>,
        store: Arc<dyn CacheStore>,
        info: Arc<CacheInfo>,
    ) -> Self {
        let mirror = info.memory_support().then(MemoryMirror::new);
        Self {
            prefix,
            codec,
            store,
            info,
            mirror,
        }
    }

    /// Full cache key: per-type prefix + caller key. Prefixes keep caches of
    /// different types from colliding inside one directory.
    fn full_key(&self, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(CacheError::invalid_key(key));
        }
        Ok(format!("{}{}", self.prefix, key))
    }

    /// Route a swallowed failure to the exception hook
    pub(crate) fn report(&self, error: CacheError) {
        self.info.exception_handler().on_error(&error);
    }

    pub(crate) fn put(&self, key: &str, value: &T) -> bool {
        match self.try_put(key, value) {
            Ok(()) => true,
            Err(error) => {
                self.report(error);
                false
            }
        }
    }

    fn try_put(&self, key: &str, value: &T) -> Result<()> {
        let full_key = self.full_key(key)?;

        let mut bytes = self.codec.encode(value)?;
        if self.info.encrypt() {
            bytes = self.info.encrypt_converter()?.encrypt(&bytes)?;
        }
        self.store.put(&full_key, &bytes)?;

        if let Some(mirror) = &self.mirror {
            mirror.insert(&full_key, value.clone());
        }
        Ok(())
    }

    pub(crate) fn get(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(error) => {
                self.report(error);
                None
            }
        }
    }

    fn try_get(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.full_key(key)?;

        if let Some(mirror) = &self.mirror {
            if let Some(value) = mirror.get(&full_key) {
                debug!("memory mirror hit for key: {}", full_key);
                return Ok(Some(value));
            }
        }

        let mut bytes = match self.store.get(&full_key)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        if self.info.encrypt() {
            bytes = self.info.encrypt_converter()?.decrypt(&bytes)?;
        }
        let value = self.codec.decode(&bytes)?;

        if let Some(mirror) = &self.mirror {
            mirror.insert(&full_key, value.clone());
        }
        Ok(Some(value))
    }

    pub(crate) fn remove(&self, key: &str) -> bool {
        let full_key = match self.full_key(key) {
            Ok(full_key) => full_key,
            Err(error) => {
                self.report(error);
                return false;
            }
        };

        // the mirror entry goes away regardless of the disk outcome
        if let Some(mirror) = &self.mirror {
            mirror.remove(&full_key);
        }

        match self.store.remove(&full_key) {
            Ok(removed) => removed,
            Err(error) => {
                self.report(error);
                false
            }
        }
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        let full_key = match self.full_key(key) {
            Ok(full_key) => full_key,
            Err(error) => {
                self.report(error);
                return false;
            }
        };

        if let Some(mirror) = &self.mirror {
            if mirror.contains(&full_key) {
                return true;
            }
        }

        match self.store.contains(&full_key) {
            Ok(found) => found,
            Err(error) => {
                self.report(error);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TextCodec;
    use crate::convert::ExceptionHandler;
    use crate::store::FileStore;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct CollectingHandler {
        errors: Mutex<Vec<String>>,
    }

    impl ExceptionHandler for CollectingHandler {
        fn on_error(&self, error: &CacheError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    fn handler_with(
        dir: &TempDir,
        memory_support: bool,
        hook: Arc<CollectingHandler>,
    ) -> Handler<i32> {
        let info = Arc::new(
            CacheInfo::new(
                false,
                memory_support,
                None,
                None,
                Some(hook as Arc<dyn ExceptionHandler>),
            )
            .unwrap(),
        );
        let store = Arc::new(FileStore::new(dir.path()));
        Handler::new("integer_", Box::new(TextCodec::new()), store, info)
    }

    #[test]
    fn test_put_get_remove() {
        let dir = TempDir::new().unwrap();
        let hook = Arc::new(CollectingHandler::default());
        let handler = handler_with(&dir, false, hook.clone());

        assert!(handler.put("count", &7));
        assert_eq!(handler.get("count"), Some(7));
        assert!(handler.contains("count"));

        assert!(handler.remove("count"));
        assert_eq!(handler.get("count"), None);
        assert!(!handler.contains("count"));
        assert!(hook.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_double_remove_true_then_false() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(&dir, false, Arc::new(CollectingHandler::default()));

        handler.put("k", &1);
        assert!(handler.remove("k"));
        assert!(!handler.remove("k"));
    }

    #[test]
    fn test_empty_key_routed_as_invalid() {
        let dir = TempDir::new().unwrap();
        let hook = Arc::new(CollectingHandler::default());
        let handler = handler_with(&dir, false, hook.clone());

        assert!(!handler.put("", &1));
        assert_eq!(handler.get(""), None);
        let errors = hook.errors.lock().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("invalid cache key"));
    }

    #[test]
    fn test_corrupted_file_routed_and_returns_none() {
        let dir = TempDir::new().unwrap();
        let hook = Arc::new(CollectingHandler::default());
        let handler = handler_with(&dir, false, hook.clone());

        handler.put("k", &42);
        // corrupt the stored bytes behind the handler's back
        let store = FileStore::new(dir.path());
        store.put("integer_k", b"garbage").unwrap();

        assert_eq!(handler.get("k"), None);
        let errors = hook.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("deserialization"));
    }

    #[test]
    fn test_mirror_serves_reads_without_disk() {
        let dir = TempDir::new().unwrap();
        let hook = Arc::new(CollectingHandler::default());
        let handler = handler_with(&dir, true, hook.clone());

        handler.put("k", &42);
        // corrupt the file; the mirror must still answer
        let store = FileStore::new(dir.path());
        store.put("integer_k", b"garbage").unwrap();

        assert_eq!(handler.get("k"), Some(42));
        assert!(hook.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mirror_populated_on_read() {
        let dir = TempDir::new().unwrap();

        // write through one handler, read through a fresh one sharing the dir
        let writer = handler_with(&dir, false, Arc::new(CollectingHandler::default()));
        writer.put("k", &9);

        let reader = handler_with(&dir, true, Arc::new(CollectingHandler::default()));
        assert_eq!(reader.get("k"), Some(9));

        // now corrupt disk; the populated mirror still serves the value
        FileStore::new(dir.path()).put("integer_k", b"garbage").unwrap();
        assert_eq!(reader.get("k"), Some(9));
    }

    #[test]
    fn test_remove_evicts_mirror() {
        let dir = TempDir::new().unwrap();
        let handler = handler_with(&dir, true, Arc::new(CollectingHandler::default()));

        handler.put("k", &1);
        assert!(handler.remove("k"));
        assert_eq!(handler.get("k"), None);
        assert!(!handler.contains("k"));
    }
}
