//! The predicate capability set for container filtering.
//!
//! A closed enum instead of a runtime-discovered predicate registry: every
//! capability the read path filters on is named here, and ad-hoc needs go
//! through [`Search::Predicate`].

use time::OffsetDateTime;

use crate::domain::locale::Locale;
use crate::domain::sitemap::SitemapId;

use super::item::Item;

pub enum Search<'a> {
    /// The item's handle equals the given name.
    Handle(&'a str),
    /// The item sits at or above the given depth.
    MaxLevel(u32),
    /// The item sits at or below the given depth.
    MinLevel(u32),
    /// The locale's page variant exists and is online at `now`.
    Online {
        locale: &'a Locale,
        now: OffsetDateTime,
    },
    /// The item lies on the path to the given sitemap node.
    Active { current: &'a SitemapId },
    /// Arbitrary caller-supplied predicate.
    Predicate(&'a dyn Fn(&Item) -> bool),
}

impl Search<'_> {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Search::Handle(handle) => item.handle() == Some(handle),
            Search::MaxLevel(level) => item.level() <= *level,
            Search::MinLevel(level) => item.level() >= *level,
            Search::Online { locale, now } => item
                .page(locale)
                .map(|page| page.is_online_at(*now))
                .unwrap_or(false),
            Search::Active { current } => item.is_active_for(current),
            Search::Predicate(predicate) => predicate(item),
        }
    }
}
