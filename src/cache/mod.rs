//! Cacheable-artifact abstraction.
//!
//! Expensive derived values (the materialized structure, individual pages,
//! the compiled route table) are wrapped as [`Cacheable`] artifacts: named,
//! keyed, TTL-bounded computations fetched through a [`CacheManager`] over a
//! pluggable blob [`CacheStore`]. Invalidation is coarse: a structural
//! mutation clears whole namespaces.

mod artifact;
mod artifacts;
mod config;
pub(crate) mod lock;
mod manager;
mod store;

pub use artifact::{Cacheable, DEFAULT_TTL};
pub use artifacts::{
    NS_PAGE, NS_ROUTING, NS_STRUCTURE, PageCacheable, RouteCollectionCacheable, StructureCacheable,
};
pub use config::CacheConfig;
pub use manager::CacheManager;
pub use store::{CacheStore, CacheStoreError, MemoryStore};
