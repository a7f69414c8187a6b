//! Tree navigation container over a materialized structure.
//!
//! [`Item`] wraps one node plus lazy, cache-backed access to its page
//! records; [`Container`] holds an ordered set of items and offers
//! side-effect-free query transforms. Items reference their node by id into
//! the shared snapshot and own their child items, so there are no cyclic
//! references anywhere in the tree.

mod container;
mod item;
mod search;

use std::sync::Arc;
use std::time::Duration;

use crate::application::repos::RowSource;
use crate::cache::CacheManager;
use crate::domain::page_types::PageTypeRegistry;
use crate::structure::MaterializedStructure;

pub use container::{Container, Walk};
pub use item::{Item, TreeError};
pub use search::Search;

/// Shared read-path context: the snapshot plus everything an item needs to
/// resolve its records on demand.
pub struct TreeContext {
    structure: Arc<MaterializedStructure>,
    cache: CacheManager,
    rows: Arc<dyn RowSource>,
    page_types: Arc<PageTypeRegistry>,
    page_ttl: Duration,
}

impl TreeContext {
    pub fn new(
        structure: Arc<MaterializedStructure>,
        cache: CacheManager,
        rows: Arc<dyn RowSource>,
        page_types: Arc<PageTypeRegistry>,
        page_ttl: Duration,
    ) -> Self {
        Self {
            structure,
            cache,
            rows,
            page_types,
            page_ttl,
        }
    }

    pub fn structure(&self) -> &Arc<MaterializedStructure> {
        &self.structure
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub(crate) fn rows(&self) -> &Arc<dyn RowSource> {
        &self.rows
    }

    pub fn page_types(&self) -> &Arc<PageTypeRegistry> {
        &self.page_types
    }

    pub(crate) fn page_ttl(&self) -> Duration {
        self.page_ttl
    }
}
