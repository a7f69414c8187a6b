//! Named navigation membership.
//!
//! Editors assign pages to named navigations ("main", "footer", …). The
//! tree container filters against those sets through [`NavigationLookup`];
//! ownership of the data stays with the persistence layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::pages::PageId;

/// One persisted membership: `page_id` appears in the navigation `name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRow {
    pub page_id: PageId,
    pub navigation: String,
}

/// Resolves a navigation name to the set of member page ids.
pub trait NavigationLookup: Send + Sync {
    fn members(&self, navigation: &str) -> Result<BTreeSet<PageId>, DomainError>;
}
