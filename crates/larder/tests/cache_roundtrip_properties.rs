//! Property tests: typed round-trips hold for arbitrary keys and values,
//! with and without encryption and the memory mirror

use std::sync::Arc;

use larder::{AesGcmConverter, DiskCache};
use proptest::prelude::*;
use tempfile::TempDir;

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./-]{1,48}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn i64_round_trips(key in key_strategy(), value in any::<i64>()) {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        prop_assert!(cache.i64_cache().put(&key, value));
        prop_assert_eq!(cache.i64_cache().get(&key), Some(value));
    }

    #[test]
    fn i32_round_trips(key in key_strategy(), value in any::<i32>()) {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        prop_assert!(cache.i32_cache().put(&key, value));
        prop_assert_eq!(cache.i32_cache().get(&key), Some(value));
    }

    #[test]
    fn non_nan_f64_round_trips(
        key in key_strategy(),
        value in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL
            | prop::num::f64::ZERO | prop::num::f64::INFINITE,
    ) {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        prop_assert!(cache.f64_cache().put(&key, value));
        prop_assert_eq!(cache.f64_cache().get(&key), Some(value));
    }

    #[test]
    fn string_round_trips(key in key_strategy(), value in ".*") {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        prop_assert!(cache.string_cache().put(&key, value.clone()));
        prop_assert_eq!(cache.string_cache().get(&key), Some(value));
    }

    #[test]
    fn encrypted_string_round_trips(key in key_strategy(), value in ".*") {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::builder(dir.path())
            .encrypt(true)
            .encrypt_converter(Arc::new(AesGcmConverter::from_passphrase("prop")))
            .build()
            .unwrap();

        prop_assert!(cache.string_cache().put(&key, value.clone()));
        prop_assert_eq!(cache.string_cache().get(&key), Some(value));
    }

    #[test]
    fn mirrored_reads_agree_with_disk_reads(key in key_strategy(), value in any::<i64>()) {
        let dir = TempDir::new().unwrap();
        let mirrored = DiskCache::builder(dir.path())
            .memory_support(true)
            .build()
            .unwrap();

        prop_assert!(mirrored.i64_cache().put(&key, value));
        // first read may come from the mirror, the fresh facade reads disk
        prop_assert_eq!(mirrored.i64_cache().get(&key), Some(value));
        let plain = DiskCache::new(dir.path()).unwrap();
        prop_assert_eq!(plain.i64_cache().get(&key), Some(value));
    }

    #[test]
    fn distinct_keys_do_not_interfere(
        first_key in key_strategy(),
        second_key in key_strategy(),
        first in any::<i64>(),
        second in any::<i64>(),
    ) {
        prop_assume!(first_key != second_key);

        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        cache.i64_cache().put(&first_key, first);
        cache.i64_cache().put(&second_key, second);

        prop_assert_eq!(cache.i64_cache().get(&first_key), Some(first));
        prop_assert_eq!(cache.i64_cache().get(&second_key), Some(second));
    }

    #[test]
    fn same_key_isolated_across_type_prefixes(key in key_strategy(), value in any::<i64>()) {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        cache.i64_cache().put(&key, value);
        cache.string_cache().put(&key, "text".to_string());

        prop_assert_eq!(cache.i64_cache().get(&key), Some(value));
        prop_assert_eq!(cache.string_cache().get(&key), Some("text".to_string()));
    }

    #[test]
    fn removed_keys_stay_gone(key in key_strategy(), value in any::<i64>()) {
        let dir = TempDir::new().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        cache.i64_cache().put(&key, value);
        prop_assert!(cache.i64_cache().remove(&key));
        prop_assert_eq!(cache.i64_cache().get(&key), None);
        prop_assert!(!cache.i64_cache().remove(&key));
    }
}
