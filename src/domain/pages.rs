//! Localized page variants.
//!
//! A sitemap node owns at most one page variant per locale. The variant
//! carries everything routing and navigation need: the slug, the online
//! flag, and the publish window.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::locale::Locale;
use super::sitemap::SitemapId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
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

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A URL path segment. Slugs arrive pre-normalized from the authoring layer;
/// this type only rejects values that could never be a single path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(SlugError::Empty);
        }
        if raw.contains('/') || raw.contains(' ') || raw.contains("${") {
            return Err(SlugError::InvalidCharacter);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug contains characters invalid in a path segment")]
    InvalidCharacter,
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Slug::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

/// One locale's variant of a page, as persisted.
///
/// `(sitemap_id, locale)` is unique across the row set; materialization
/// rejects duplicates. `slug` is optional because only page types whose
/// routing template references the slug token require one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVariant {
    pub id: PageId,
    pub sitemap_id: SitemapId,
    pub locale: Locale,
    pub name: String,
    pub slug: Option<Slug>,
    pub online: bool,
    pub publish_from: Option<OffsetDateTime>,
    pub publish_until: Option<OffsetDateTime>,
}

impl PageVariant {
    /// Whether the variant is publicly visible at `now`: the online flag is
    /// set and `now` falls inside the publish window (open bounds pass).
    pub fn is_online_at(&self, now: OffsetDateTime) -> bool {
        if !self.online {
            return false;
        }
        if let Some(from) = self.publish_from
            && now < from
        {
            return false;
        }
        if let Some(until) = self.publish_until
            && now >= until
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn variant(online: bool) -> PageVariant {
        PageVariant {
            id: PageId::random(),
            sitemap_id: SitemapId::random(),
            locale: Locale::new("en"),
            name: "About us".to_string(),
            slug: Some(Slug::new("about-us").expect("valid slug")),
            online,
            publish_from: None,
            publish_until: None,
        }
    }

    #[test]
    fn offline_flag_wins_over_window() {
        let v = variant(false);
        assert!(!v.is_online_at(datetime!(2024-06-01 12:00 UTC)));
    }

    #[test]
    fn publish_window_bounds() {
        let mut v = variant(true);
        v.publish_from = Some(datetime!(2024-06-01 00:00 UTC));
        v.publish_until = Some(datetime!(2024-07-01 00:00 UTC));

        assert!(!v.is_online_at(datetime!(2024-05-31 23:59 UTC)));
        assert!(v.is_online_at(datetime!(2024-06-01 00:00 UTC)));
        assert!(v.is_online_at(datetime!(2024-06-15 12:00 UTC)));
        assert!(!v.is_online_at(datetime!(2024-07-01 00:00 UTC)));
    }

    #[test]
    fn open_window_is_always_inside() {
        let v = variant(true);
        assert!(v.is_online_at(datetime!(1999-01-01 0:00 UTC)));
    }

    #[test]
    fn slug_rejects_path_separators_and_tokens() {
        assert!(Slug::new("about/us").is_err());
        assert!(Slug::new("${SLUG}").is_err());
        assert!(Slug::new("  ").is_err());
        assert!(Slug::new("about-us").is_ok());
    }
}
