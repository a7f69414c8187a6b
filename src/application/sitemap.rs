//! Sitemap mutations: move and copy with page-type validation.

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheManager, NS_ROUTING, NS_STRUCTURE};
use crate::domain::error::DomainError;
use crate::domain::page_types::PageTypeRegistry;
use crate::domain::sitemap::{SitemapId, SitemapRow};
use crate::error::Error;

use super::repos::{RepositoryError, SitemapRepository};

const SOURCE: &str = "application::sitemap";

/// Where a moved or copied subtree lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveTarget {
    FirstChildOf(SitemapId),
    NextSiblingOf(SitemapId),
    FirstRoot,
}

/// Validated sitemap mutations.
///
/// The repository executes the raw nested-set surgery; this service owns the
/// page-type placement rules and the cache invalidation that must follow
/// every structural change. Invalidation is synchronous: when a call
/// returns, no reader can still see the old tree from the cache.
pub struct SitemapService {
    repo: Arc<dyn SitemapRepository>,
    page_types: Arc<PageTypeRegistry>,
    cache: CacheManager,
}

impl SitemapService {
    pub fn new(
        repo: Arc<dyn SitemapRepository>,
        page_types: Arc<PageTypeRegistry>,
        cache: CacheManager,
    ) -> Self {
        Self {
            repo,
            page_types,
            cache,
        }
    }

    /// Move a subtree to a new position.
    pub fn move_sitemap(&self, id: &SitemapId, target: MoveTarget) -> Result<(), Error> {
        let moved = self.require_row(id)?;
        self.validate_placement(&moved, &target)?;

        match target {
            MoveTarget::FirstChildOf(parent) => self.repo.move_as_first_child(id, &parent)?,
            MoveTarget::NextSiblingOf(sibling) => self.repo.move_as_next_sibling(id, &sibling)?,
            MoveTarget::FirstRoot => self.repo.move_to_first_root(id)?,
        }

        info!(
            target_module = SOURCE,
            sitemap_id = %id,
            ?target,
            "Moved sitemap subtree"
        );
        self.invalidate_structure()
    }

    /// Duplicate a subtree below `new_parent` (or as a new root).
    /// Returns the id of the copy's root node.
    pub fn copy_sitemap(
        &self,
        id: &SitemapId,
        new_parent: Option<&SitemapId>,
    ) -> Result<SitemapId, Error> {
        let copied = self.require_row(id)?;
        if let Some(parent) = new_parent {
            self.validate_placement(&copied, &MoveTarget::FirstChildOf(*parent))?;
        }

        let new_root = self.repo.copy_subtree(id, new_parent)?;
        info!(
            target_module = SOURCE,
            sitemap_id = %id,
            copy_root = %new_root,
            "Copied sitemap subtree"
        );
        self.invalidate_structure()?;
        Ok(new_root)
    }

    fn require_row(&self, id: &SitemapId) -> Result<SitemapRow, Error> {
        Ok(self
            .repo
            .find_sitemap(id)?
            .ok_or(RepositoryError::SitemapNotFound(*id))?)
    }

    /// Placement rules: a root-only type never leaves the root level, and a
    /// parent must accept the moved type as a child.
    fn validate_placement(&self, moved: &SitemapRow, target: &MoveTarget) -> Result<(), Error> {
        let moved_type = self.page_types.get(&moved.page_type)?;

        let parent_id = match target {
            MoveTarget::FirstChildOf(parent) => Some(*parent),
            MoveTarget::NextSiblingOf(sibling) => self.require_row(sibling)?.parent_id,
            MoveTarget::FirstRoot => None,
        };

        let Some(parent_id) = parent_id else {
            // Any type may sit at the root level.
            return Ok(());
        };

        if moved_type.root_only {
            return Err(DomainError::validation(format!(
                "page type `{}` is only allowed at the root level",
                moved_type.name
            ))
            .into());
        }

        let parent = self.require_row(&parent_id)?;
        let parent_type = self.page_types.get(&parent.page_type)?;
        if !parent_type.allows_child(&moved_type.name) {
            return Err(DomainError::validation(format!(
                "page type `{}` does not accept `{}` children",
                parent_type.name, moved_type.name
            ))
            .into());
        }
        Ok(())
    }

    fn invalidate_structure(&self) -> Result<(), Error> {
        self.cache.invalidate(NS_STRUCTURE)?;
        self.cache.invalidate(NS_ROUTING)?;
        Ok(())
    }
}
