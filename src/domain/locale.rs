use std::fmt;

use serde::{Deserialize, Serialize};

/// A locale tag such as `en` or `de-at`, normalized to lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enumerates the locales a route table must be compiled for.
///
/// Owned by the hosting application; each active locale drives one full
/// compilation pass.
pub trait LocaleProvider: Send + Sync {
    fn active_locales(&self) -> Vec<Locale>;
}

/// A fixed locale list, useful when the active set comes from configuration.
#[derive(Clone, Debug)]
pub struct StaticLocales(Vec<Locale>);

impl StaticLocales {
    pub fn new(locales: impl IntoIterator<Item = Locale>) -> Self {
        Self(locales.into_iter().collect())
    }
}

impl LocaleProvider for StaticLocales {
    fn active_locales(&self) -> Vec<Locale> {
        self.0.clone()
    }
}
