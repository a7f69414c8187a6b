//! Page-type registry.
//!
//! Every sitemap node names a page type. The registry maps that
//! discriminator to a behavior bundle: the routing template, the middleware
//! chain, the allowed-children policy, and placement flags. It is built
//! explicitly at startup; nothing is discovered at runtime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// The slug placeholder token understood by the routing templates.
pub const SLUG_TOKEN: &str = "${SLUG}";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTypeDefinition {
    pub name: String,
    /// Template for the main route, relative to the parent path, e.g.
    /// `/${SLUG}` or `/imprint`. May contain placeholder tokens.
    pub route_template: String,
    /// Additional named route templates (e.g. an `rss` variant). A template
    /// registered under the reserved `inheritance` name overrides the path
    /// children build on, without ever becoming a route itself.
    pub route_variants: BTreeMap<String, String>,
    /// Middleware names dispatched before the terminal render step. Empty
    /// means the compiler's default chain.
    pub middleware: Vec<String>,
    /// Page types allowed below this one. `None` allows any.
    pub allowed_children: Option<Vec<String>>,
    /// The type lives only at tree roots.
    pub root_only: bool,
    /// The type never has children.
    pub terminal: bool,
}

impl PageTypeDefinition {
    pub fn new(name: impl Into<String>, route_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route_template: route_template.into(),
            route_variants: BTreeMap::new(),
            middleware: Vec::new(),
            allowed_children: None,
            root_only: false,
            terminal: false,
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.route_variants.insert(name.into(), template.into());
        self
    }

    pub fn with_middleware(mut self, middleware: impl IntoIterator<Item = String>) -> Self {
        self.middleware = middleware.into_iter().collect();
        self
    }

    pub fn with_allowed_children(mut self, children: impl IntoIterator<Item = String>) -> Self {
        self.allowed_children = Some(children.into_iter().collect());
        self
    }

    pub fn root_only(mut self) -> Self {
        self.root_only = true;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn allows_child(&self, child_type: &str) -> bool {
        if self.terminal {
            return false;
        }
        match &self.allowed_children {
            Some(allowed) => allowed.iter().any(|name| name == child_type),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct PageTypeRegistry {
    types: BTreeMap<String, PageTypeDefinition>,
}

impl PageTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: PageTypeDefinition) -> Result<(), DomainError> {
        if self.types.contains_key(&definition.name) {
            return Err(DomainError::DuplicatePageType(definition.name));
        }
        self.types.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&PageTypeDefinition, DomainError> {
        self.types
            .get(name)
            .ok_or_else(|| DomainError::UnknownPageType(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
