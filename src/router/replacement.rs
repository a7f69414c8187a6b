//! Pluggable URL replacement strategies.
//!
//! Strategies transform a [`RouteSpecification`] during compilation, e.g.
//! substituting the slug token. The chain is an explicit list assembled at
//! startup from configuration; priority gives it a total order, with
//! registration order breaking ties.

use std::sync::Arc;

use crate::domain::locale::Locale;
use crate::domain::page_types::SLUG_TOKEN;
use crate::error::Error;
use crate::tree::Item;

use super::specification::RouteSpecification;

/// A pure, composable route-specification transform.
pub trait ReplacementStrategy: Send + Sync {
    fn priority(&self) -> i32;

    fn apply(
        &self,
        specification: RouteSpecification,
        locale: &Locale,
        item: &Item,
    ) -> Result<RouteSpecification, Error>;
}

/// The ordered strategy chain the compiler runs at every node.
#[derive(Clone, Default)]
pub struct ReplacementChain {
    strategies: Vec<Arc<dyn ReplacementStrategy>>,
}

impl ReplacementChain {
    pub fn new(strategies: impl IntoIterator<Item = Arc<dyn ReplacementStrategy>>) -> Self {
        let mut strategies: Vec<_> = strategies.into_iter().collect();
        // Stable sort keeps registration order among equal priorities.
        strategies.sort_by_key(|strategy| strategy.priority());
        Self { strategies }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ReplacementStrategy>> {
        self.strategies.iter()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Substitutes the slug token with the page variant's slug in every URI.
///
/// A variant without a slug leaves the token untouched; the compiler then
/// suppresses the affected routes.
pub struct SlugReplacement;

impl ReplacementStrategy for SlugReplacement {
    fn priority(&self) -> i32 {
        1
    }

    fn apply(
        &self,
        specification: RouteSpecification,
        locale: &Locale,
        item: &Item,
    ) -> Result<RouteSpecification, Error> {
        let page = item.page(locale)?;
        let Some(slug) = page.slug else {
            return Ok(specification);
        };

        let mut replaced = specification.clone();
        for (name, uri) in specification.uris() {
            if uri.contains(SLUG_TOKEN) {
                replaced = replaced.with_uri(uri.replace(SLUG_TOKEN, slug.as_str()), name.clone());
            }
        }
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(i32);

    impl ReplacementStrategy for Fixed {
        fn priority(&self) -> i32 {
            self.0
        }

        fn apply(
            &self,
            specification: RouteSpecification,
            _locale: &Locale,
            _item: &Item,
        ) -> Result<RouteSpecification, Error> {
            Ok(specification)
        }
    }

    #[test]
    fn chain_orders_by_priority() {
        let chain = ReplacementChain::new([
            Arc::new(Fixed(5)) as Arc<dyn ReplacementStrategy>,
            Arc::new(Fixed(1)),
            Arc::new(Fixed(5)),
        ]);

        let order: Vec<i32> = chain.iter().map(|s| s.priority()).collect();
        assert_eq!(order, vec![1, 5, 5]);
    }
}
