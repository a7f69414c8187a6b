//! External persistence contracts and the in-memory reference repository.
//!
//! The core never talks to a database. It consumes three narrow traits:
//! [`RowSource`] supplies consistent row snapshots for materialization,
//! [`SitemapRepository`] executes nested-set mutations under the store's own
//! transactional discipline, and [`PageRepository`] flips publish state.
//! [`MemoryRepository`] implements all of them; it doubles as the reference
//! semantics for nested-set moves and as the fixture backend in tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::cache::lock::{rw_read, rw_write};
use crate::domain::error::DomainError;
use crate::domain::navigation::{NavigationLookup, NavigationRow};
use crate::domain::pages::{PageId, PageVariant};
use crate::domain::sitemap::{SitemapId, SitemapRow};

const SOURCE: &str = "application::repos";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("sitemap node {0} not found")]
    SitemapNotFound(SitemapId),
    #[error("page {0} not found")]
    PageNotFound(PageId),
    #[error("invalid move: {0}")]
    InvalidMove(String),
    #[error("persisted tree is corrupt: {0}")]
    Corrupt(String),
}

/// Supplies complete, consistent row snapshots.
///
/// Both load calls must observe the same committed state; a reader must
/// never see half of a move.
pub trait RowSource: Send + Sync {
    fn load_sitemap_rows(&self) -> Result<Vec<SitemapRow>, RepositoryError>;
    fn load_page_rows(&self) -> Result<Vec<PageVariant>, RepositoryError>;
    fn load_navigation_rows(&self) -> Result<Vec<NavigationRow>, RepositoryError>;

    fn find_page(&self, id: &PageId) -> Result<Option<PageVariant>, RepositoryError> {
        Ok(self
            .load_page_rows()?
            .into_iter()
            .find(|page| page.id == *id))
    }
}

/// Transactional nested-set mutations, owned by the persistence layer.
///
/// Every move reassigns `parent_id` and the intervals for the whole
/// affected subtree atomically; a partially moved subtree is never visible.
pub trait SitemapRepository: Send + Sync {
    fn find_sitemap(&self, id: &SitemapId) -> Result<Option<SitemapRow>, RepositoryError>;
    fn move_as_first_child(
        &self,
        id: &SitemapId,
        parent: &SitemapId,
    ) -> Result<(), RepositoryError>;
    fn move_as_next_sibling(
        &self,
        id: &SitemapId,
        sibling: &SitemapId,
    ) -> Result<(), RepositoryError>;
    /// Reorder a root node to the first position among roots.
    fn move_to_first_root(&self, id: &SitemapId) -> Result<(), RepositoryError>;
    /// Duplicate a subtree (nodes and page variants, fresh ids) below
    /// `new_parent`, or as a new last root when `None`. Returns the id of
    /// the copied subtree's root.
    fn copy_subtree(
        &self,
        id: &SitemapId,
        new_parent: Option<&SitemapId>,
    ) -> Result<SitemapId, RepositoryError>;
}

/// Publish-state mutations on page variants.
pub trait PageRepository: Send + Sync {
    fn set_online(&self, id: &PageId, online: bool) -> Result<(), RepositoryError>;
    fn set_publish_window(
        &self,
        id: &PageId,
        from: Option<OffsetDateTime>,
        until: Option<OffsetDateTime>,
    ) -> Result<(), RepositoryError>;
}

struct State {
    sitemap: Vec<SitemapRow>,
    pages: Vec<PageVariant>,
    navigation: Vec<NavigationRow>,
}

/// In-memory implementation of every persistence contract.
pub struct MemoryRepository {
    state: RwLock<State>,
}

impl MemoryRepository {
    pub fn new(
        sitemap: Vec<SitemapRow>,
        pages: Vec<PageVariant>,
        navigation: Vec<NavigationRow>,
    ) -> Self {
        Self {
            state: RwLock::new(State {
                sitemap,
                pages,
                navigation,
            }),
        }
    }
}

impl RowSource for MemoryRepository {
    fn load_sitemap_rows(&self) -> Result<Vec<SitemapRow>, RepositoryError> {
        Ok(rw_read(&self.state, SOURCE, "load_sitemap_rows").sitemap.clone())
    }

    fn load_page_rows(&self) -> Result<Vec<PageVariant>, RepositoryError> {
        Ok(rw_read(&self.state, SOURCE, "load_page_rows").pages.clone())
    }

    fn load_navigation_rows(&self) -> Result<Vec<NavigationRow>, RepositoryError> {
        Ok(rw_read(&self.state, SOURCE, "load_navigation_rows")
            .navigation
            .clone())
    }
}

impl NavigationLookup for MemoryRepository {
    fn members(&self, navigation: &str) -> Result<BTreeSet<PageId>, DomainError> {
        Ok(rw_read(&self.state, SOURCE, "navigation_members")
            .navigation
            .iter()
            .filter(|row| row.navigation == navigation)
            .map(|row| row.page_id)
            .collect())
    }
}

impl SitemapRepository for MemoryRepository {
    fn find_sitemap(&self, id: &SitemapId) -> Result<Option<SitemapRow>, RepositoryError> {
        Ok(rw_read(&self.state, SOURCE, "find_sitemap")
            .sitemap
            .iter()
            .find(|row| row.id == *id)
            .cloned())
    }

    fn move_as_first_child(
        &self,
        id: &SitemapId,
        parent: &SitemapId,
    ) -> Result<(), RepositoryError> {
        let mut state = rw_write(&self.state, SOURCE, "move_as_first_child");
        let mut forest = Forest::build(&state.sitemap)?;
        forest.detach(id)?;
        forest.guard_not_descendant(id, parent)?;
        forest
            .children
            .get_mut(parent)
            .ok_or(RepositoryError::SitemapNotFound(*parent))?
            .insert(0, *id);
        forest.renumber(&mut state.sitemap);
        Ok(())
    }

    fn move_as_next_sibling(
        &self,
        id: &SitemapId,
        sibling: &SitemapId,
    ) -> Result<(), RepositoryError> {
        let mut state = rw_write(&self.state, SOURCE, "move_as_next_sibling");
        let mut forest = Forest::build(&state.sitemap)?;
        forest.detach(id)?;
        forest.guard_not_descendant(id, sibling)?;
        let siblings = forest.siblings_of_mut(sibling)?;
        let position = siblings
            .iter()
            .position(|candidate| candidate == sibling)
            .ok_or(RepositoryError::SitemapNotFound(*sibling))?;
        siblings.insert(position + 1, *id);
        forest.renumber(&mut state.sitemap);
        Ok(())
    }

    fn move_to_first_root(&self, id: &SitemapId) -> Result<(), RepositoryError> {
        let mut state = rw_write(&self.state, SOURCE, "move_to_first_root");
        let mut forest = Forest::build(&state.sitemap)?;
        forest.detach(id)?;
        forest.roots.insert(0, *id);
        forest.renumber(&mut state.sitemap);
        Ok(())
    }

    fn copy_subtree(
        &self,
        id: &SitemapId,
        new_parent: Option<&SitemapId>,
    ) -> Result<SitemapId, RepositoryError> {
        let mut state = rw_write(&self.state, SOURCE, "copy_subtree");
        let mut forest = Forest::build(&state.sitemap)?;
        if let Some(parent) = new_parent {
            forest.guard_not_descendant(id, parent)?;
        }

        let subtree = forest.subtree(id)?;
        let id_map: HashMap<SitemapId, SitemapId> = subtree
            .iter()
            .map(|old| (*old, SitemapId::new(Uuid::new_v4())))
            .collect();

        let copied_rows: Vec<SitemapRow> = state
            .sitemap
            .iter()
            .filter(|row| id_map.contains_key(&row.id))
            .map(|row| SitemapRow {
                id: id_map[&row.id],
                // The subtree root attaches to its new parent; inner nodes
                // keep their (remapped) parents.
                parent_id: if row.id == *id {
                    new_parent.copied()
                } else {
                    row.parent_id.map(|p| id_map[&p])
                },
                ..row.clone()
            })
            .collect();

        let copied_pages: Vec<PageVariant> = state
            .pages
            .iter()
            .filter(|page| id_map.contains_key(&page.sitemap_id))
            .map(|page| PageVariant {
                id: PageId::new(Uuid::new_v4()),
                sitemap_id: id_map[&page.sitemap_id],
                ..page.clone()
            })
            .collect();

        for old in &subtree {
            let new = id_map[old];
            let children = forest.children[old]
                .iter()
                .map(|child| id_map[child])
                .collect();
            forest.children.insert(new, children);
        }
        let new_root = id_map[id];
        match new_parent {
            Some(parent) => forest
                .children
                .get_mut(parent)
                .ok_or(RepositoryError::SitemapNotFound(*parent))?
                .push(new_root),
            None => forest.roots.push(new_root),
        }

        state.sitemap.extend(copied_rows);
        state.pages.extend(copied_pages);
        forest.renumber(&mut state.sitemap);
        Ok(new_root)
    }
}

impl PageRepository for MemoryRepository {
    fn set_online(&self, id: &PageId, online: bool) -> Result<(), RepositoryError> {
        let mut state = rw_write(&self.state, SOURCE, "set_online");
        let page = state
            .pages
            .iter_mut()
            .find(|page| page.id == *id)
            .ok_or(RepositoryError::PageNotFound(*id))?;
        page.online = online;
        Ok(())
    }

    fn set_publish_window(
        &self,
        id: &PageId,
        from: Option<OffsetDateTime>,
        until: Option<OffsetDateTime>,
    ) -> Result<(), RepositoryError> {
        let mut state = rw_write(&self.state, SOURCE, "set_publish_window");
        let page = state
            .pages
            .iter_mut()
            .find(|page| page.id == *id)
            .ok_or(RepositoryError::PageNotFound(*id))?;
        page.publish_from = from;
        page.publish_until = until;
        Ok(())
    }
}

/// Mutable forest view over the rows: ordered child lists plus roots.
/// Mutations edit the lists, then `renumber` rewrites every interval and
/// parent pointer in one DFS pass.
struct Forest {
    children: BTreeMap<SitemapId, Vec<SitemapId>>,
    roots: Vec<SitemapId>,
}

impl Forest {
    fn build(rows: &[SitemapRow]) -> Result<Self, RepositoryError> {
        let structure = crate::structure::materialize(rows, &[], &[])
            .map_err(|error| RepositoryError::Corrupt(error.to_string()))?;
        let mut children = BTreeMap::new();
        for row in rows {
            let node = structure
                .node(&row.id)
                .ok_or_else(|| RepositoryError::Corrupt(format!("node {} vanished", row.id)))?;
            children.insert(row.id, node.children.clone());
        }
        Ok(Self {
            children,
            roots: structure.roots().to_vec(),
        })
    }

    /// Remove the node from its current position, keeping its subtree.
    fn detach(&mut self, id: &SitemapId) -> Result<(), RepositoryError> {
        if !self.children.contains_key(id) {
            return Err(RepositoryError::SitemapNotFound(*id));
        }
        self.roots.retain(|root| root != id);
        for list in self.children.values_mut() {
            list.retain(|child| child != id);
        }
        Ok(())
    }

    fn guard_not_descendant(
        &self,
        id: &SitemapId,
        target: &SitemapId,
    ) -> Result<(), RepositoryError> {
        if id == target || self.subtree(id)?.contains(target) {
            return Err(RepositoryError::InvalidMove(format!(
                "target {target} lies inside the subtree of {id}"
            )));
        }
        Ok(())
    }

    /// Pre-order ids of the subtree rooted at `id`.
    fn subtree(&self, id: &SitemapId) -> Result<Vec<SitemapId>, RepositoryError> {
        if !self.children.contains_key(id) {
            return Err(RepositoryError::SitemapNotFound(*id));
        }
        let mut ids = Vec::new();
        let mut stack = vec![*id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            if let Some(children) = self.children.get(&current) {
                stack.extend(children.iter().rev());
            }
        }
        Ok(ids)
    }

    /// Rewrite every row's interval and parent pointer from the edited
    /// forest, numbering the whole forest with one global counter.
    fn renumber(&self, rows: &mut [SitemapRow]) {
        let mut assignments: BTreeMap<SitemapId, (Option<SitemapId>, i64, i64)> = BTreeMap::new();
        let mut counter = 1;
        for root in &self.roots {
            self.assign(root, None, &mut counter, &mut assignments);
        }
        for row in rows {
            if let Some((parent, left, right)) = assignments.get(&row.id) {
                row.parent_id = *parent;
                row.nested_left = *left;
                row.nested_right = *right;
            }
        }
    }

    fn assign(
        &self,
        id: &SitemapId,
        parent: Option<SitemapId>,
        counter: &mut i64,
        assignments: &mut BTreeMap<SitemapId, (Option<SitemapId>, i64, i64)>,
    ) {
        let left = *counter;
        *counter += 1;
        if let Some(children) = self.children.get(id) {
            for child in children {
                self.assign(child, Some(*id), counter, assignments);
            }
        }
        let right = *counter;
        *counter += 1;
        assignments.insert(*id, (parent, left, right));
    }
}

impl Forest {
    /// The child list the sibling lives in (its parent's, or the roots).
    fn siblings_of_mut(
        &mut self,
        sibling: &SitemapId,
    ) -> Result<&mut Vec<SitemapId>, RepositoryError> {
        if self.roots.contains(sibling) {
            return Ok(&mut self.roots);
        }
        let parent = self
            .children
            .iter()
            .find(|(_, children)| children.contains(sibling))
            .map(|(parent, _)| *parent)
            .ok_or(RepositoryError::SitemapNotFound(*sibling))?;
        Ok(self
            .children
            .get_mut(&parent)
            .expect("parent id found by scanning children"))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::locale::Locale;
    use crate::structure::materialize;

    use super::*;

    fn id(n: u128) -> SitemapId {
        SitemapId::new(Uuid::from_u128(n))
    }

    fn pid(n: u128) -> PageId {
        PageId::new(Uuid::from_u128(n))
    }

    fn row(n: u128, parent: Option<u128>, left: i64, right: i64) -> SitemapRow {
        SitemapRow {
            id: id(n),
            parent_id: parent.map(id),
            nested_left: left,
            nested_right: right,
            page_type: "default".to_string(),
            handle: None,
        }
    }

    fn page(n: u128, sitemap: u128) -> PageVariant {
        PageVariant {
            id: pid(n),
            sitemap_id: id(sitemap),
            locale: Locale::new("en"),
            name: format!("page-{n}"),
            slug: None,
            online: true,
            publish_from: None,
            publish_until: None,
        }
    }

    /// a(1) { b(2), c(3) }, d(4)
    fn repo() -> MemoryRepository {
        MemoryRepository::new(
            vec![
                row(1, None, 1, 6),
                row(2, Some(1), 2, 3),
                row(3, Some(1), 4, 5),
                row(4, None, 7, 8),
            ],
            vec![page(10, 1), page(20, 2)],
            Vec::new(),
        )
    }

    fn ordering(repo: &MemoryRepository) -> Vec<SitemapId> {
        let rows = repo.load_sitemap_rows().expect("rows");
        materialize(&rows, &[], &[])
            .expect("rows stay consistent")
            .flatten()
            .into_iter()
            .map(|(node_id, _, _)| node_id)
            .collect()
    }

    #[test]
    fn move_as_first_child_reorders_subtree() {
        let repo = repo();
        repo.move_as_first_child(&id(4), &id(1)).expect("move");
        assert_eq!(ordering(&repo), vec![id(1), id(4), id(2), id(3)]);
    }

    #[test]
    fn move_as_next_sibling_inserts_after() {
        let repo = repo();
        repo.move_as_next_sibling(&id(4), &id(2)).expect("move");
        assert_eq!(ordering(&repo), vec![id(1), id(2), id(4), id(3)]);
    }

    #[test]
    fn move_to_first_root_renumbers_from_one() {
        let repo = repo();
        repo.move_to_first_root(&id(4)).expect("move");
        assert_eq!(ordering(&repo), vec![id(4), id(1), id(2), id(3)]);

        let rows = repo.load_sitemap_rows().expect("rows");
        let moved = rows.iter().find(|r| r.id == id(4)).expect("moved row");
        assert_eq!(moved.nested_left, 1);
    }

    #[test]
    fn moving_into_own_subtree_is_rejected() {
        let repo = repo();
        let err = repo
            .move_as_first_child(&id(1), &id(2))
            .expect_err("cycle move");
        assert!(matches!(err, RepositoryError::InvalidMove(_)));
        // State is untouched.
        assert_eq!(ordering(&repo), vec![id(1), id(2), id(3), id(4)]);
    }

    #[test]
    fn copy_subtree_duplicates_nodes_and_pages() {
        let repo = repo();
        let copy_root = repo.copy_subtree(&id(1), None).expect("copy");

        let rows = repo.load_sitemap_rows().expect("rows");
        assert_eq!(rows.len(), 7);
        let structure = materialize(&rows, &[], &[]).expect("still consistent");
        let copied = structure.node(&copy_root).expect("copied root");
        assert_eq!(copied.children.len(), 2);
        assert_eq!(copied.level, 0);

        let pages = repo.load_page_rows().expect("pages");
        assert_eq!(pages.len(), 4);
        // Copied pages carry fresh ids.
        let ids: BTreeSet<PageId> = pages.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn publish_state_mutations() {
        let repo = repo();
        repo.set_online(&pid(10), false).expect("set offline");
        let pages = repo.load_page_rows().expect("pages");
        assert!(!pages.iter().find(|p| p.id == pid(10)).expect("page").online);

        let err = repo
            .set_online(&PageId::random(), true)
            .expect_err("unknown page");
        assert!(matches!(err, RepositoryError::PageNotFound(_)));
    }

    #[test]
    fn navigation_membership() {
        let repo = MemoryRepository::new(
            Vec::new(),
            Vec::new(),
            vec![
                NavigationRow {
                    page_id: pid(1),
                    navigation: "main".to_string(),
                },
                NavigationRow {
                    page_id: pid(2),
                    navigation: "footer".to_string(),
                },
            ],
        );
        let members = repo.members("main").expect("lookup");
        assert_eq!(members.into_iter().collect::<Vec<_>>(), vec![pid(1)]);
    }
}
