//! Application layer: persistence contracts and mutation services.
//!
//! Reads flow through the cache module's artifacts; every mutation flows
//! through a service here so the matching cache invalidation can never be
//! forgotten.

pub mod pages;
pub mod repos;
pub mod sitemap;

pub use pages::PageService;
pub use repos::{
    MemoryRepository, PageRepository, RepositoryError, RowSource, SitemapRepository,
};
pub use sitemap::{MoveTarget, SitemapService};
