//! The materialized structure snapshot.
//!
//! An arena of nodes keyed by sitemap id. Parent/child relations are ids,
//! not references, so the snapshot is a plain value: cheap to serialize into
//! a cache blob and safe to share behind an `Arc` once built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::locale::Locale;
use crate::domain::pages::PageId;
use crate::domain::sitemap::{NestedInterval, SitemapId};

/// One node of the materialized tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    pub sitemap_id: SitemapId,
    pub parent: Option<SitemapId>,
    pub nested_left: i64,
    pub nested_right: i64,
    pub page_type: String,
    pub handle: Option<String>,
    /// Depth from root; roots are level 0.
    pub level: u32,
    /// Direct children, ordered by `nested_left`.
    pub children: Vec<SitemapId>,
    /// The page variant owned per locale.
    pub pages: BTreeMap<Locale, PageId>,
    /// Precomputed navigation membership per locale: the names of the
    /// navigations the locale's page belongs to.
    pub navigation: BTreeMap<Locale, Vec<String>>,
}

impl StructureNode {
    pub fn interval(&self) -> NestedInterval {
        NestedInterval {
            left: self.nested_left,
            right: self.nested_right,
        }
    }

    pub fn page_id(&self, locale: &Locale) -> Option<&PageId> {
        self.pages.get(locale)
    }
}

/// Immutable snapshot of the whole tree, built once per cache miss.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedStructure {
    nodes: BTreeMap<SitemapId, StructureNode>,
    /// Root node ids, ordered by `nested_left`.
    roots: Vec<SitemapId>,
}

impl MaterializedStructure {
    pub(crate) fn from_parts(
        nodes: BTreeMap<SitemapId, StructureNode>,
        roots: Vec<SitemapId>,
    ) -> Self {
        Self { nodes, roots }
    }

    pub fn node(&self, id: &SitemapId) -> Option<&StructureNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> &[SitemapId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<&StructureNode> {
        self.iter_preorder()
            .find(|node| node.handle.as_deref() == Some(handle))
    }

    /// Pre-order traversal over the whole forest.
    pub fn iter_preorder(&self) -> impl Iterator<Item = &StructureNode> {
        let mut stack: Vec<&SitemapId> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = self.nodes.get(id)?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Re-emit `(id, nested_left, nested_right)` in pre-order.
    ///
    /// For a snapshot built from a valid row set this reproduces the
    /// original interval ordering, which is the materialization round-trip
    /// property the tests lean on.
    pub fn flatten(&self) -> Vec<(SitemapId, i64, i64)> {
        self.iter_preorder()
            .map(|node| (node.sitemap_id, node.nested_left, node.nested_right))
            .collect()
    }
}
