//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_ARTIFACT_TTL_SECS: u64 = 3600;
const DEFAULT_NAMESPACE_CAPACITY: usize = 1024;

/// Cache policy knobs.
///
/// The TTL applies to every derived artifact (structure snapshot, pages,
/// route table); invalidation on structural mutation is what keeps caches
/// coherent, the TTL only bounds staleness after missed invalidations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a cached artifact stays fresh without invalidation.
    pub artifact_ttl_secs: u64,
    /// Maximum entries per namespace in the in-memory store.
    pub namespace_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            artifact_ttl_secs: DEFAULT_ARTIFACT_TTL_SECS,
            namespace_capacity: DEFAULT_NAMESPACE_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn artifact_ttl(&self) -> Duration {
        Duration::from_secs(self.artifact_ttl_secs)
    }

    /// Returns the namespace capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn namespace_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.namespace_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
