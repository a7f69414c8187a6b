//! Per-page route specification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::pages::PageId;

/// Name of the distinguished main URI.
pub const NAME_MAIN: &str = "*";

/// Reserved pseudo-URI children derive their parent path from. Never
/// registered as a real route.
pub const NAME_INHERITANCE: &str = "inheritance";

/// The named URI templates and middleware chain of one page, threaded
/// through the replacement strategies during compilation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpecification {
    page_id: PageId,
    uris: BTreeMap<String, String>,
    middleware: Vec<String>,
}

impl RouteSpecification {
    pub fn new(page_id: PageId) -> Self {
        Self {
            page_id,
            uris: BTreeMap::new(),
            middleware: Vec::new(),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Store a URI under a name, trimming the trailing slash so nested
    /// concatenation stays clean. The root path normalizes back to `/` at
    /// emission time.
    pub fn with_uri(mut self, uri: impl AsRef<str>, name: impl Into<String>) -> Self {
        let trimmed = uri.as_ref().trim_end_matches('/').to_string();
        self.uris.insert(name.into(), trimmed);
        self
    }

    /// Look up a named URI; with `fallback` the main URI answers for
    /// missing names.
    pub fn uri(&self, name: &str, fallback: bool) -> Option<&str> {
        self.uris
            .get(name)
            .or_else(|| {
                if fallback {
                    self.uris.get(NAME_MAIN)
                } else {
                    None
                }
            })
            .map(String::as_str)
    }

    pub fn uris(&self) -> &BTreeMap<String, String> {
        &self.uris
    }

    pub fn middleware(&self) -> &[String] {
        &self.middleware
    }

    pub fn with_middleware(mut self, middleware: Vec<String>) -> Self {
        self.middleware = middleware;
        self
    }
}
