use std::sync::Arc;

use thiserror::Error;

use crate::cache::PageCacheable;
use crate::domain::error::DomainError;
use crate::domain::locale::Locale;
use crate::domain::page_types::PageTypeDefinition;
use crate::domain::pages::{PageId, PageVariant};
use crate::domain::sitemap::SitemapId;
use crate::error::Error;
use crate::structure::StructureNode;

use super::TreeContext;
use super::container::Container;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("sitemap node {sitemap_id} has no page for locale `{locale}`")]
    PageNotFoundForLocale {
        sitemap_id: SitemapId,
        locale: Locale,
    },
}

/// One tree node plus lazy accessors to its records.
///
/// Items are values: every transform produces new items, never mutates in
/// place. The wrapped node lives in the shared snapshot; only the child
/// list and the active flag are per-item state, because transforms rewrite
/// them.
#[derive(Clone)]
pub struct Item {
    ctx: Arc<TreeContext>,
    id: SitemapId,
    active: bool,
    children: Vec<Item>,
}

impl Item {
    pub(crate) fn build(ctx: &Arc<TreeContext>, id: SitemapId) -> Self {
        let children = ctx
            .structure()
            .node(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
            .into_iter()
            .map(|child| Item::build(ctx, child))
            .collect();
        Self {
            ctx: ctx.clone(),
            id,
            active: false,
            children,
        }
    }

    /// Same node, different derived state. Used by the container transforms.
    pub(crate) fn with_parts(&self, children: Vec<Item>, active: bool) -> Self {
        Self {
            ctx: self.ctx.clone(),
            id: self.id,
            active,
            children,
        }
    }

    fn node(&self) -> &StructureNode {
        // Items are only ever built from ids present in their own snapshot.
        self.ctx
            .structure()
            .node(&self.id)
            .expect("item id present in structure snapshot")
    }

    pub fn sitemap_id(&self) -> SitemapId {
        self.id
    }

    pub fn level(&self) -> u32 {
        self.node().level
    }

    pub fn handle(&self) -> Option<&str> {
        self.node().handle.as_deref()
    }

    pub fn page_type_name(&self) -> &str {
        &self.node().page_type
    }

    pub fn page_type(&self) -> Result<&PageTypeDefinition, DomainError> {
        self.ctx.page_types().get(self.page_type_name())
    }

    pub fn has_page(&self, locale: &Locale) -> bool {
        self.node().pages.contains_key(locale)
    }

    pub fn page_id(&self, locale: &Locale) -> Option<&PageId> {
        self.node().page_id(locale)
    }

    /// All owned page ids across locales, in locale order.
    pub fn page_ids(&self) -> impl Iterator<Item = &PageId> {
        self.node().pages.values()
    }

    /// Resolve the owned page variant for a locale through the cache.
    pub fn page(&self, locale: &Locale) -> Result<PageVariant, Error> {
        let Some(page_id) = self.page_id(locale) else {
            return Err(TreeError::PageNotFoundForLocale {
                sitemap_id: self.id,
                locale: locale.clone(),
            }
            .into());
        };
        self.ctx.cache().fetch(
            &PageCacheable::new(self.ctx.rows().clone(), *page_id).with_ttl(self.ctx.page_ttl()),
        )
    }

    /// Navigation names the locale's page is a member of.
    pub fn navigation(&self, locale: &Locale) -> &[String] {
        self.node()
            .navigation
            .get(locale)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether this node lies on the path to `current` (inclusive), judged
    /// by nested-set containment.
    pub fn is_active_for(&self, current: &SitemapId) -> bool {
        if self.id == *current {
            return true;
        }
        match self.ctx.structure().node(current) {
            Some(node) => self.node().interval().contains(&node.interval()),
            None => false,
        }
    }

    /// The active flag set by [`Container::with_active_state`].
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn children(&self) -> &[Item] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The subtree below this item as a fresh container.
    pub fn below(&self) -> Container {
        Container::new(self.children.clone())
    }
}
