//! Cache storage.
//!
//! [`CacheStore`] is the narrow contract to the external key/value backend:
//! opaque blobs under `(namespace, key)` with a TTL, plus coarse per-namespace
//! clearing. [`MemoryStore`] is the in-process default, a bounded LRU per
//! namespace with per-entry expiry.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use thiserror::Error;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// External blob store with TTL semantics.
///
/// Implementations must treat values as opaque and must never return a
/// partially written blob: `get` yields a complete prior `set` or nothing.
pub trait CacheStore: Send + Sync {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, CacheStoreError>;
    fn set(
        &self,
        namespace: &str,
        key: &str,
        value: Bytes,
        ttl: Duration,
    ) -> Result<(), CacheStoreError>;
    fn clear(&self, namespace: &str) -> Result<(), CacheStoreError>;
}

struct Entry {
    value: Bytes,
    expires_at: Instant,
}

/// In-memory store: one bounded LRU per namespace.
pub struct MemoryStore {
    namespaces: RwLock<HashMap<String, LruCache<String, Entry>>>,
    capacity: NonZeroUsize,
}

impl MemoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            capacity: config.namespace_capacity_non_zero(),
        }
    }

    /// Number of live entries in a namespace, expired ones included.
    pub fn len(&self, namespace: &str) -> usize {
        rw_read(&self.namespaces, SOURCE, "len")
            .get(namespace)
            .map(LruCache::len)
            .unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<Bytes>, CacheStoreError> {
        let mut namespaces = rw_write(&self.namespaces, SOURCE, "get");
        let Some(cache) = namespaces.get_mut(namespace) else {
            return Ok(None);
        };
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                cache.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(
        &self,
        namespace: &str,
        key: &str,
        value: Bytes,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        let mut namespaces = rw_write(&self.namespaces, SOURCE, "set");
        let cache = namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| LruCache::new(self.capacity));
        cache.put(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn clear(&self, namespace: &str) -> Result<(), CacheStoreError> {
        let mut namespaces = rw_write(&self.namespaces, SOURCE, "clear");
        if let Some(cache) = namespaces.get_mut(namespace) {
            cache.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn get_set_roundtrip() {
        let store = MemoryStore::default();

        assert!(store.get("structure", "structure").expect("get").is_none());

        store
            .set("structure", "structure", Bytes::from("blob"), TTL)
            .expect("set");

        let cached = store.get("structure", "structure").expect("get");
        assert_eq!(cached, Some(Bytes::from("blob")));
    }

    #[test]
    fn expired_entry_is_dropped() {
        let store = MemoryStore::default();
        store
            .set("page", "a", Bytes::from("old"), Duration::ZERO)
            .expect("set");

        assert!(store.get("page", "a").expect("get").is_none());
        assert_eq!(store.len("page"), 0);
    }

    #[test]
    fn clear_only_touches_one_namespace() {
        let store = MemoryStore::default();
        store
            .set("structure", "structure", Bytes::from("s"), TTL)
            .expect("set");
        store
            .set("routing", "routes", Bytes::from("r"), TTL)
            .expect("set");

        store.clear("structure").expect("clear");

        assert!(store.get("structure", "structure").expect("get").is_none());
        assert_eq!(store.get("routing", "routes").expect("get"), Some(Bytes::from("r")));
    }

    #[test]
    fn lru_eviction_respects_capacity() {
        let config = CacheConfig {
            namespace_capacity: 2,
            ..Default::default()
        };
        let store = MemoryStore::new(&config);

        store.set("page", "a", Bytes::from("a"), TTL).expect("set");
        store.set("page", "b", Bytes::from("b"), TTL).expect("set");
        store.set("page", "c", Bytes::from("c"), TTL).expect("set");

        assert!(store.get("page", "a").expect("get").is_none()); // Evicted
        assert!(store.get("page", "b").expect("get").is_some());
        assert!(store.get("page", "c").expect("get").is_some());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let store = MemoryStore::default();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .namespaces
                .write()
                .expect("namespaces lock should be acquired");
            panic!("poison namespaces lock");
        }));

        store.set("page", "a", Bytes::from("a"), TTL).expect("set");
        assert!(store.get("page", "a").expect("get").is_some());
    }
}
