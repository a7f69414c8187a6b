//! The concrete cached artifacts of the read path.
//!
//! Three namespaces exist: `structure` holds the single materialized
//! snapshot, `page` holds individual page variants keyed by id, and
//! `routing` holds the compiled route table. The route table is the deepest
//! artifact: computing it fetches the structure snapshot through the same
//! manager, which is exactly the nesting [`CacheManager`](super::CacheManager)
//! is built to allow.

use std::sync::Arc;
use std::time::Duration;

use crate::application::repos::RowSource;
use crate::domain::error::DomainError;
use crate::domain::locale::LocaleProvider;
use crate::domain::page_types::PageTypeRegistry;
use crate::domain::pages::{PageId, PageVariant};
use crate::error::Error;
use crate::router::{ReplacementChain, RouteTable, compile};
use crate::structure::{MaterializedStructure, materialize};
use crate::tree::{Container, TreeContext};

use super::artifact::{Cacheable, DEFAULT_TTL};
use super::manager::CacheManager;

pub const NS_STRUCTURE: &str = "structure";
pub const NS_PAGE: &str = "page";
pub const NS_ROUTING: &str = "routing";

/// The materialized structure snapshot. One key per installation.
pub struct StructureCacheable {
    rows: Arc<dyn RowSource>,
    ttl: Duration,
}

impl StructureCacheable {
    pub fn new(rows: Arc<dyn RowSource>) -> Self {
        Self {
            rows,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Cacheable for StructureCacheable {
    type Output = MaterializedStructure;

    fn cache_name(&self) -> &'static str {
        NS_STRUCTURE
    }

    fn cache_key(&self) -> String {
        "structure".to_string()
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn compute(&self, _cache: &CacheManager) -> Result<MaterializedStructure, Error> {
        let sitemap = self.rows.load_sitemap_rows()?;
        let pages = self.rows.load_page_rows()?;
        let navigation = self.rows.load_navigation_rows()?;
        Ok(materialize(&sitemap, &pages, &navigation)?)
    }
}

/// A single page variant, keyed by its page id.
pub struct PageCacheable {
    rows: Arc<dyn RowSource>,
    page_id: PageId,
    ttl: Duration,
}

impl PageCacheable {
    pub fn new(rows: Arc<dyn RowSource>, page_id: PageId) -> Self {
        Self {
            rows,
            page_id,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Cacheable for PageCacheable {
    type Output = PageVariant;

    fn cache_name(&self) -> &'static str {
        NS_PAGE
    }

    fn cache_key(&self) -> String {
        self.page_id.to_string()
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn compute(&self, _cache: &CacheManager) -> Result<PageVariant, Error> {
        self.rows
            .find_page(&self.page_id)?
            .ok_or_else(|| DomainError::PageNotFound(self.page_id).into())
    }
}

/// The compiled route table over every active locale.
///
/// Computation fetches the structure snapshot through the manager, so a warm
/// structure cache is reused and a cold one is filled as a side effect.
pub struct RouteCollectionCacheable {
    rows: Arc<dyn RowSource>,
    page_types: Arc<PageTypeRegistry>,
    locales: Arc<dyn LocaleProvider>,
    chain: Arc<ReplacementChain>,
    ttl: Duration,
}

impl RouteCollectionCacheable {
    pub fn new(
        rows: Arc<dyn RowSource>,
        page_types: Arc<PageTypeRegistry>,
        locales: Arc<dyn LocaleProvider>,
        chain: Arc<ReplacementChain>,
    ) -> Self {
        Self {
            rows,
            page_types,
            locales,
            chain,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Cacheable for RouteCollectionCacheable {
    type Output = RouteTable;

    fn cache_name(&self) -> &'static str {
        NS_ROUTING
    }

    fn cache_key(&self) -> String {
        "routes".to_string()
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    fn compute(&self, cache: &CacheManager) -> Result<RouteTable, Error> {
        let structure = cache.fetch(&StructureCacheable::new(self.rows.clone()).with_ttl(self.ttl))?;
        let ctx = Arc::new(TreeContext::new(
            Arc::new(structure),
            cache.clone(),
            self.rows.clone(),
            self.page_types.clone(),
            self.ttl,
        ));
        let root = Container::from_structure(&ctx);
        compile(&root, &self.locales.active_locales(), &self.chain)
    }
}
