//! Nested-set rows → materialized tree.
//!
//! A single pass over the sitemap rows sorted by `nested_left`, keeping a
//! stack of open intervals. The stack top is the direct parent of the row
//! under the cursor; the stack depth is its level. Any row that does not fit
//! strictly inside the open interval chain means the persisted encoding is
//! corrupt, and the whole build fails rather than guessing a patch.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::debug;

use crate::domain::navigation::NavigationRow;
use crate::domain::pages::{PageId, PageVariant};
use crate::domain::sitemap::{SitemapId, SitemapRow};

use super::snapshot::{MaterializedStructure, StructureNode};

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("nested-set integrity violated: {detail}")]
    Integrity { detail: String },
}

impl StructureError {
    fn integrity(detail: impl Into<String>) -> Self {
        Self::Integrity {
            detail: detail.into(),
        }
    }
}

/// Build a [`MaterializedStructure`] from a complete, consistent row set.
///
/// Deterministic: the same rows always produce the same snapshot, with
/// children ordered by `nested_left` ascending.
pub fn materialize(
    sitemap_rows: &[SitemapRow],
    page_rows: &[PageVariant],
    navigation_rows: &[NavigationRow],
) -> Result<MaterializedStructure, StructureError> {
    let mut ordered: Vec<&SitemapRow> = sitemap_rows.iter().collect();
    ordered.sort_by_key(|row| row.nested_left);

    let mut nodes: BTreeMap<SitemapId, StructureNode> = BTreeMap::new();
    let mut roots: Vec<SitemapId> = Vec::new();
    // Open ancestor chain: (id, nested_left, nested_right).
    let mut stack: Vec<(SitemapId, i64, i64)> = Vec::new();

    for row in ordered {
        let interval = row.interval();
        if !interval.is_well_formed() {
            return Err(StructureError::integrity(format!(
                "node {} has degenerate interval [{}, {}]",
                row.id, row.nested_left, row.nested_right
            )));
        }
        if nodes.contains_key(&row.id) {
            return Err(StructureError::integrity(format!(
                "node {} appears more than once",
                row.id
            )));
        }

        while let Some((_, _, right)) = stack.last() {
            if row.nested_left > *right {
                stack.pop();
            } else {
                break;
            }
        }

        let parent = match stack.last() {
            Some((parent_id, parent_left, parent_right)) => {
                // Containment must be strict on both bounds; rows arrive
                // sorted by nested_left, so equality is the only way the
                // left bound can fail.
                if row.nested_left <= *parent_left {
                    return Err(StructureError::integrity(format!(
                        "node {} shares its left bound with enclosing node {}",
                        row.id, parent_id
                    )));
                }
                if row.nested_right >= *parent_right {
                    return Err(StructureError::integrity(format!(
                        "interval of node {} crosses its enclosing node {}",
                        row.id, parent_id
                    )));
                }
                Some(*parent_id)
            }
            None => None,
        };

        if parent != row.parent_id {
            return Err(StructureError::integrity(format!(
                "node {} declares parent {:?} but its interval places it under {:?}",
                row.id, row.parent_id, parent
            )));
        }

        let level = stack.len() as u32;
        match parent {
            Some(parent_id) => {
                // The parent was opened before any of its descendants, so it
                // is already in the arena.
                if let Some(parent_node) = nodes.get_mut(&parent_id) {
                    parent_node.children.push(row.id);
                }
            }
            None => roots.push(row.id),
        }

        nodes.insert(
            row.id,
            StructureNode {
                sitemap_id: row.id,
                parent,
                nested_left: row.nested_left,
                nested_right: row.nested_right,
                page_type: row.page_type.clone(),
                handle: row.handle.clone(),
                level,
                children: Vec::new(),
                pages: BTreeMap::new(),
                navigation: BTreeMap::new(),
            },
        );
        stack.push((row.id, row.nested_left, row.nested_right));
    }

    attach_pages(&mut nodes, page_rows)?;
    attach_navigation(&mut nodes, navigation_rows);

    debug!(
        nodes = nodes.len(),
        roots = roots.len(),
        pages = page_rows.len(),
        "Materialized structure snapshot"
    );

    Ok(MaterializedStructure::from_parts(nodes, roots))
}

fn attach_pages(
    nodes: &mut BTreeMap<SitemapId, StructureNode>,
    page_rows: &[PageVariant],
) -> Result<(), StructureError> {
    for page in page_rows {
        let Some(node) = nodes.get_mut(&page.sitemap_id) else {
            return Err(StructureError::integrity(format!(
                "page {} references unknown sitemap node {}",
                page.id, page.sitemap_id
            )));
        };
        if node.pages.insert(page.locale.clone(), page.id).is_some() {
            return Err(StructureError::integrity(format!(
                "sitemap node {} has more than one page for locale {}",
                page.sitemap_id, page.locale
            )));
        }
    }
    Ok(())
}

fn attach_navigation(
    nodes: &mut BTreeMap<SitemapId, StructureNode>,
    navigation_rows: &[NavigationRow],
) {
    let mut by_page: HashMap<PageId, Vec<String>> = HashMap::new();
    for row in navigation_rows {
        by_page
            .entry(row.page_id)
            .or_default()
            .push(row.navigation.clone());
    }
    for names in by_page.values_mut() {
        names.sort();
        names.dedup();
    }

    for node in nodes.values_mut() {
        for (locale, page_id) in &node.pages {
            if let Some(names) = by_page.get(page_id) {
                node.navigation.insert(locale.clone(), names.clone());
            }
        }
    }
}
