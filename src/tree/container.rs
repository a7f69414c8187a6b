use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::warn;

use crate::domain::navigation::NavigationLookup;
use crate::domain::pages::PageId;

use super::TreeContext;
use super::item::Item;
use super::search::Search;

const SOURCE: &str = "tree::container";

/// An ordered set of tree items with composable, side-effect-free query
/// transforms. Every transform returns a new container; the wrapped
/// snapshot is never touched.
#[derive(Clone, Default)]
pub struct Container {
    items: Vec<Item>,
}

impl Container {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// The root container of a snapshot: one item per root node.
    pub fn from_structure(ctx: &Arc<TreeContext>) -> Self {
        let items = ctx
            .structure()
            .roots()
            .iter()
            .map(|id| Item::build(ctx, *id))
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Depth-first pre-order walk over every item in the container.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.items.iter().rev().collect(),
        }
    }

    /// Keep only subtrees whose root matches the predicate; descent stops at
    /// the first non-matching node.
    pub fn filter(&self, search: &Search<'_>) -> Container {
        fn prune(items: &[Item], search: &Search<'_>) -> Vec<Item> {
            items
                .iter()
                .filter(|item| search.matches(item))
                .map(|item| {
                    let children = prune(item.children(), search);
                    item.with_parts(children, item.is_active())
                })
                .collect()
        }
        Container::new(prune(&self.items, search))
    }

    /// First matching item anywhere in the tree, pre-order.
    pub fn find(&self, search: &Search<'_>) -> Option<&Item> {
        self.walk().find(|item| search.matches(item))
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<&Item> {
        self.find(&Search::Handle(handle))
    }

    /// Collect the items sitting exactly at depth `level`, reached by
    /// descending only through shallower ancestors. Collected items keep
    /// their subtrees.
    pub fn with_minimum_level(&self, level: u32) -> Container {
        fn collect(items: &[Item], level: u32, collector: &mut Vec<Item>) {
            for item in items {
                if item.level() == level {
                    collector.push(item.clone());
                } else if item.level() < level {
                    collect(item.children(), level, collector);
                }
            }
        }
        let mut collector = Vec::new();
        collect(&self.items, level, &mut collector);
        Container::new(collector)
    }

    /// Truncate every branch below depth `level`.
    pub fn with_maximum_level(&self, level: u32) -> Container {
        fn truncate(items: &[Item], level: u32) -> Vec<Item> {
            items
                .iter()
                .map(|item| {
                    let children = if item.level() >= level {
                        Vec::new()
                    } else {
                        truncate(item.children(), level)
                    };
                    item.with_parts(children, item.is_active())
                })
                .collect()
        }
        Container::new(truncate(&self.items, level))
    }

    /// Mark the item owning `page` as active and propagate the flag up
    /// through its ancestors. Repeated application with the same page is a
    /// no-op beyond the first.
    pub fn with_active_state(&self, page: &PageId) -> Container {
        fn mark(items: &[Item], page: &PageId) -> Vec<Item> {
            items
                .iter()
                .map(|item| {
                    let children = mark(item.children(), page);
                    let matched = item
                        .page_ids()
                        .any(|candidate| candidate == page);
                    let active = matched || children.iter().any(Item::is_active);
                    item.with_parts(children, active)
                })
                .collect()
        }
        Container::new(mark(&self.items, page))
    }

    /// The first active child, if any.
    pub fn with_only_active_branch(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.is_active())
    }

    /// The active branch reduced to a linear root-to-leaf chain.
    ///
    /// `None` when nothing is active; otherwise every item in the chain has
    /// at most one child and the chain length is the active leaf's level + 1.
    pub fn with_breadcrumb(&self) -> Option<Item> {
        fn descend(items: &[Item]) -> Option<Item> {
            let active = items.iter().find(|item| item.is_active())?;
            let child = descend(active.children());
            let children = child.map(|c| vec![c]).unwrap_or_default();
            Some(active.with_parts(children, true))
        }
        descend(&self.items)
    }

    /// Keep only subtrees whose pages are members of the named navigation.
    ///
    /// A failing lookup degrades to an empty membership set: navigation
    /// filtering is a rendering concern and must not take the page down.
    pub fn with_navigation(&self, navigation: &str, lookup: &dyn NavigationLookup) -> Container {
        let members: BTreeSet<PageId> = match lookup.members(navigation) {
            Ok(members) => members,
            Err(error) => {
                warn!(
                    target_module = SOURCE,
                    navigation,
                    %error,
                    "Navigation lookup failed, treating membership as empty"
                );
                BTreeSet::new()
            }
        };

        fn keep(items: &[Item], members: &BTreeSet<PageId>) -> Vec<Item> {
            items
                .iter()
                .filter(|item| item.page_ids().any(|page| members.contains(page)))
                .map(|item| {
                    let children = keep(item.children(), members);
                    item.with_parts(children, item.is_active())
                })
                .collect()
        }
        Container::new(keep(&self.items, &members))
    }

    /// Every item of the tree as a flat, pre-ordered container.
    pub fn flatten(&self) -> Container {
        let items = self
            .walk()
            .map(|item| item.with_parts(Vec::new(), item.is_active()))
            .collect();
        Container::new(items)
    }

    /// Reorder the top-level items.
    pub fn sort_by<F>(&self, mut compare: F) -> Container
    where
        F: FnMut(&Item, &Item) -> Ordering,
    {
        let mut items = self.items.clone();
        items.sort_by(&mut compare);
        Container::new(items)
    }
}

/// Depth-first pre-order iterator.
pub struct Walk<'a> {
    stack: Vec<&'a Item>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Item;

    fn next(&mut self) -> Option<&'a Item> {
        let item = self.stack.pop()?;
        self.stack.extend(item.children().iter().rev());
        Some(item)
    }
}
