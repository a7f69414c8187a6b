//! The compiled, locale-aware routing table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::locale::Locale;
use crate::domain::pages::PageId;

/// One emitted route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledRoute {
    pub name: String,
    pub path: String,
    pub page_id: PageId,
    pub locale: Locale,
    pub middleware: Vec<String>,
}

/// Immutable routing table, one name→route map per locale.
///
/// BTreeMaps throughout keep compilation deterministic: identical input
/// yields a byte-identical serialized table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    locales: BTreeMap<Locale, BTreeMap<String, CompiledRoute>>,
}

impl RouteTable {
    pub(crate) fn insert_locale(
        &mut self,
        locale: Locale,
        routes: BTreeMap<String, CompiledRoute>,
    ) {
        self.locales.insert(locale, routes);
    }

    pub fn route(&self, locale: &Locale, name: &str) -> Option<&CompiledRoute> {
        self.locales.get(locale)?.get(name)
    }

    /// The main route path of a page in a locale, the way `pageUrl`-style
    /// link helpers resolve it.
    pub fn url_for_page(&self, page_id: &PageId, locale: &Locale) -> Option<&str> {
        self.route(locale, &main_route_name(page_id))
            .map(|route| route.path.as_str())
    }

    pub fn routes(&self, locale: &Locale) -> impl Iterator<Item = &CompiledRoute> {
        self.locales.get(locale).into_iter().flatten().map(|(_, route)| route)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Locale, &BTreeMap<String, CompiledRoute>)> {
        self.locales.iter()
    }

    pub fn len(&self) -> usize {
        self.locales.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Route name of a page's main URI: `page.{page_id}`.
pub fn main_route_name(page_id: &PageId) -> String {
    format!("page.{page_id}")
}

/// Route name of a named URI variant: `page.{name}.{page_id}`.
pub fn variant_route_name(variant: &str, page_id: &PageId) -> String {
    format!("page.{variant}.{page_id}")
}
