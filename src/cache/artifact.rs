//! The cacheable-artifact contract.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Error;

use super::manager::CacheManager;

/// Default artifact TTL, matching the reference cache policy.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A named, keyed, TTL-bounded, lazily recomputed value.
///
/// `compute` receives the cache manager handle so recomputation can fetch
/// other artifacts (the route table fetches the structure snapshot, which
/// fetches pages). The manager holds no lock across a `compute` call, so
/// such nesting cannot deadlock.
///
/// Recomputation must be pure with respect to shared state: two racing
/// fetches of the same `(cache_name, cache_key)` may both compute, and both
/// results must be logically identical.
pub trait Cacheable {
    type Output: Serialize + DeserializeOwned;

    /// The cache namespace. Invalidation clears a whole namespace.
    fn cache_name(&self) -> &'static str;

    /// The key within the namespace.
    fn cache_key(&self) -> String;

    fn ttl(&self) -> Duration {
        DEFAULT_TTL
    }

    fn compute(&self, cache: &CacheManager) -> Result<Self::Output, Error>;
}
