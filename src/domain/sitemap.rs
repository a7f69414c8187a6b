//! Sitemap rows and nested-set intervals.
//!
//! The persistence layer encodes the page tree as a nested set: every node
//! carries a `[nested_left, nested_right]` interval, and interval containment
//! encodes the ancestor/descendant relation. Rows arrive flat; the
//! `structure` module turns them into a tree.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SitemapId(Uuid);

impl SitemapId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SitemapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One persisted sitemap node, exactly as the row source hands it over.
///
/// `parent_id` and the nested-set interval encode the same tree twice; the
/// materializer cross-checks them and rejects row sets where they disagree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapRow {
    pub id: SitemapId,
    pub parent_id: Option<SitemapId>,
    pub nested_left: i64,
    pub nested_right: i64,
    pub page_type: String,
    pub handle: Option<String>,
}

impl SitemapRow {
    pub fn interval(&self) -> NestedInterval {
        NestedInterval {
            left: self.nested_left,
            right: self.nested_right,
        }
    }
}

/// A `[left, right]` nested-set interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedInterval {
    pub left: i64,
    pub right: i64,
}

impl NestedInterval {
    /// A well-formed interval has room for its own two bounds.
    pub fn is_well_formed(&self) -> bool {
        self.left < self.right
    }

    /// Strict containment: `other` lies fully inside `self`.
    pub fn contains(&self, other: &NestedInterval) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// Two intervals overlap without one containing the other.
    pub fn crosses(&self, other: &NestedInterval) -> bool {
        (self.left < other.left && other.left < self.right && self.right < other.right)
            || (other.left < self.left && self.left < other.right && other.right < self.right)
    }
}
