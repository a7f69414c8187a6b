//! Cache manager: fetch-or-compute over a [`CacheStore`].

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use tracing::{debug, warn};

use crate::error::Error;

use super::artifact::Cacheable;
use super::store::CacheStore;

const SOURCE: &str = "cache::manager";

/// Cheaply cloneable handle to the cache store.
///
/// The handle is passed explicitly to everything that caches; there is no
/// ambient global manager.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Return the cached value for the artifact, computing it on miss.
    ///
    /// Store failures degrade to a direct computation; a computed value that
    /// cannot be written back is still returned (the write failure is logged
    /// and ignored). A blob that no longer decodes is treated as a miss.
    pub fn fetch<C: Cacheable>(&self, cacheable: &C) -> Result<C::Output, Error> {
        let namespace = cacheable.cache_name();
        let key = cacheable.cache_key();

        let mut store_degraded = false;
        match self.store.get(namespace, &key) {
            Ok(Some(blob)) => match serde_json::from_slice(&blob) {
                Ok(value) => {
                    counter!("ramo_cache_fetch_total", "namespace" => namespace, "result" => "hit")
                        .increment(1);
                    return Ok(value);
                }
                Err(error) => {
                    warn!(
                        target_module = SOURCE,
                        namespace,
                        key,
                        %error,
                        "Cached blob no longer decodes, recomputing"
                    );
                }
            },
            Ok(None) => {}
            Err(error) => {
                store_degraded = true;
                warn!(
                    target_module = SOURCE,
                    namespace,
                    key,
                    %error,
                    "Cache store unavailable, computing directly"
                );
            }
        }

        counter!(
            "ramo_cache_fetch_total",
            "namespace" => namespace,
            "result" => if store_degraded { "bypass" } else { "miss" },
        )
        .increment(1);

        let value = cacheable.compute(self)?;

        if !store_degraded {
            match serde_json::to_vec(&value) {
                Ok(encoded) => {
                    if let Err(error) =
                        self.store
                            .set(namespace, &key, Bytes::from(encoded), cacheable.ttl())
                    {
                        warn!(
                            target_module = SOURCE,
                            namespace,
                            key,
                            %error,
                            "Computed value could not be cached"
                        );
                    }
                }
                Err(error) => {
                    warn!(
                        target_module = SOURCE,
                        namespace,
                        key,
                        %error,
                        "Computed value could not be encoded for caching"
                    );
                }
            }
        }

        Ok(value)
    }

    /// Clear every key under a namespace.
    ///
    /// Coarse by design: structural mutations invalidate whole namespaces
    /// rather than chasing the precise set of affected keys.
    pub fn invalidate(&self, namespace: &str) -> Result<(), Error> {
        self.store.clear(namespace)?;
        counter!("ramo_cache_invalidate_total", "namespace" => namespace.to_string()).increment(1);
        debug!(target_module = SOURCE, namespace, "Invalidated cache namespace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::super::store::{CacheStoreError, MemoryStore};
    use super::*;

    struct Doubler {
        input: u64,
        computations: AtomicUsize,
    }

    impl Doubler {
        fn new(input: u64) -> Self {
            Self {
                input,
                computations: AtomicUsize::new(0),
            }
        }

        fn computations(&self) -> usize {
            self.computations.load(Ordering::SeqCst)
        }
    }

    impl Cacheable for Doubler {
        type Output = u64;

        fn cache_name(&self) -> &'static str {
            "doubler"
        }

        fn cache_key(&self) -> String {
            self.input.to_string()
        }

        fn compute(&self, _cache: &CacheManager) -> Result<u64, Error> {
            self.computations.fetch_add(1, Ordering::SeqCst);
            Ok(self.input * 2)
        }
    }

    /// Fails every store operation; fetch must still produce values.
    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn get(&self, _: &str, _: &str) -> Result<Option<Bytes>, CacheStoreError> {
            Err(CacheStoreError::Unavailable("get refused".to_string()))
        }

        fn set(&self, _: &str, _: &str, _: Bytes, _: Duration) -> Result<(), CacheStoreError> {
            Err(CacheStoreError::Unavailable("set refused".to_string()))
        }

        fn clear(&self, _: &str) -> Result<(), CacheStoreError> {
            Err(CacheStoreError::Unavailable("clear refused".to_string()))
        }
    }

    #[test]
    fn second_fetch_is_a_hit() {
        let manager = CacheManager::new(Arc::new(MemoryStore::default()));
        let artifact = Doubler::new(21);

        assert_eq!(manager.fetch(&artifact).expect("first fetch"), 42);
        assert_eq!(manager.fetch(&artifact).expect("second fetch"), 42);
        assert_eq!(artifact.computations(), 1);
    }

    #[test]
    fn invalidate_forces_recomputation() {
        let manager = CacheManager::new(Arc::new(MemoryStore::default()));
        let artifact = Doubler::new(7);

        manager.fetch(&artifact).expect("first fetch");
        manager.invalidate("doubler").expect("invalidate");
        manager.fetch(&artifact).expect("fetch after invalidate");

        assert_eq!(artifact.computations(), 2);
    }

    #[test]
    fn unavailable_store_falls_back_to_computation() {
        let manager = CacheManager::new(Arc::new(BrokenStore));
        let artifact = Doubler::new(5);

        assert_eq!(manager.fetch(&artifact).expect("degraded fetch"), 10);
        assert_eq!(manager.fetch(&artifact).expect("degraded fetch"), 10);
        assert_eq!(artifact.computations(), 2);
    }

    #[test]
    fn undecodable_blob_is_recomputed() {
        let store = Arc::new(MemoryStore::default());
        let manager = CacheManager::new(store.clone());
        let artifact = Doubler::new(3);

        store
            .set("doubler", "3", Bytes::from("not json"), Duration::from_secs(60))
            .expect("seed garbage");

        assert_eq!(manager.fetch(&artifact).expect("fetch"), 6);
        assert_eq!(artifact.computations(), 1);

        // The recomputed value replaced the garbage.
        assert_eq!(manager.fetch(&artifact).expect("fetch"), 6);
        assert_eq!(artifact.computations(), 1);
    }

    #[test]
    fn nested_fetch_does_not_deadlock() {
        struct Outer;

        impl Cacheable for Outer {
            type Output = u64;

            fn cache_name(&self) -> &'static str {
                "outer"
            }

            fn cache_key(&self) -> String {
                "outer".to_string()
            }

            fn compute(&self, cache: &CacheManager) -> Result<u64, Error> {
                cache.fetch(&Doubler::new(4))
            }
        }

        let manager = CacheManager::new(Arc::new(MemoryStore::default()));
        assert_eq!(manager.fetch(&Outer).expect("nested fetch"), 8);
    }
}
