//! Route compilation.
//!
//! One pre-order walk of the materialized tree per active locale. Each node
//! resolves its page type's templates against the accumulated parent path,
//! runs the replacement chain, and either emits its routes or is silently
//! suppressed. Per node and locale the pipeline is: resolve → replace →
//! emit or suppress; suppression is terminal and never an error.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::domain::locale::Locale;
use crate::error::Error;
use crate::tree::{Container, Item};

use super::replacement::ReplacementChain;
use super::specification::{NAME_INHERITANCE, NAME_MAIN, RouteSpecification};
use super::table::{CompiledRoute, RouteTable, main_route_name, variant_route_name};

const SOURCE: &str = "router::compiler";

/// Middleware dispatched when a page type declares none of its own.
pub const DEFAULT_MIDDLEWARE: &[&str] = &["cms.resolve-page"];

/// Terminal step appended to every chain.
pub const RENDER_MIDDLEWARE: &str = "cms.render";

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route name `{name}` is already registered for locale `{locale}`")]
    NameCollision { name: String, locale: Locale },
}

/// What a node hands its children as path context.
enum PathState {
    /// Accumulated inheritance path of the nearest routable ancestor
    /// (empty at the roots).
    Base(String),
    /// An ancestor kept an unresolved placeholder; the whole subtree stays
    /// unroutable for this locale.
    Unroutable,
}

/// Compile the routing table for every locale in `locales`.
///
/// Fatal errors (name collision, unknown page type) abort the whole
/// compilation; callers keep serving the previously cached table.
pub fn compile(
    root: &Container,
    locales: &[Locale],
    chain: &ReplacementChain,
) -> Result<RouteTable, Error> {
    let mut table = RouteTable::default();
    for locale in locales {
        let mut routes = BTreeMap::new();
        for item in root.items() {
            compile_node(item, locale, chain, &PathState::Base(String::new()), &mut routes)?;
        }
        debug!(
            target_module = SOURCE,
            locale = %locale,
            routes = routes.len(),
            "Compiled locale routes"
        );
        table.insert_locale(locale.clone(), routes);
    }
    Ok(table)
}

fn compile_node(
    item: &Item,
    locale: &Locale,
    chain: &ReplacementChain,
    parent: &PathState,
    routes: &mut BTreeMap<String, CompiledRoute>,
) -> Result<(), Error> {
    let state = match (parent, item.page_id(locale)) {
        (PathState::Unroutable, _) => PathState::Unroutable,
        // A node without a variant for this locale emits nothing but stays
        // transparent: children build on the same accumulated path.
        (PathState::Base(base), None) => {
            debug!(
                target_module = SOURCE,
                sitemap_id = %item.sitemap_id(),
                locale = %locale,
                reason = "no_page_variant",
                "Route suppressed"
            );
            PathState::Base(base.clone())
        }
        (PathState::Base(base), Some(&page_id)) => {
            let definition = item.page_type()?;

            let mut specification = RouteSpecification::new(page_id)
                .with_uri(format!("{base}{}", definition.route_template), NAME_MAIN);
            for (name, template) in &definition.route_variants {
                specification = specification.with_uri(format!("{base}{template}"), name.clone());
            }

            let mut middleware: Vec<String> = if definition.middleware.is_empty() {
                DEFAULT_MIDDLEWARE.iter().map(|s| s.to_string()).collect()
            } else {
                definition.middleware.clone()
            };
            middleware.push(RENDER_MIDDLEWARE.to_string());
            specification = specification.with_middleware(middleware);

            for strategy in chain.iter() {
                specification = strategy.apply(specification, locale, item)?;
            }

            emit(&specification, locale, routes)?;

            // Children inherit the post-replacement path; the reserved
            // inheritance entry overrides, falling back to main.
            let child_base = specification
                .uri(NAME_INHERITANCE, true)
                .unwrap_or_default()
                .to_string();
            if has_placeholder(&child_base) {
                PathState::Unroutable
            } else {
                PathState::Base(child_base)
            }
        }
    };

    for child in item.children() {
        compile_node(child, locale, chain, &state, routes)?;
    }
    Ok(())
}

fn emit(
    specification: &RouteSpecification,
    locale: &Locale,
    routes: &mut BTreeMap<String, CompiledRoute>,
) -> Result<(), Error> {
    let page_id = specification.page_id();
    for (name, uri) in specification.uris() {
        if name == NAME_INHERITANCE {
            continue;
        }
        if has_placeholder(uri) {
            debug!(
                target_module = SOURCE,
                page_id = %page_id,
                locale = %locale,
                uri_name = name.as_str(),
                reason = "unresolved_placeholder",
                "Route suppressed"
            );
            continue;
        }

        let route_name = if name == NAME_MAIN {
            main_route_name(&page_id)
        } else {
            variant_route_name(name, &page_id)
        };
        if routes.contains_key(&route_name) {
            return Err(RouteError::NameCollision {
                name: route_name,
                locale: locale.clone(),
            }
            .into());
        }

        let path = if uri.is_empty() { "/" } else { uri.as_str() };
        routes.insert(
            route_name.clone(),
            CompiledRoute {
                name: route_name,
                path: path.to_string(),
                page_id,
                locale: locale.clone(),
                middleware: specification.middleware().to_vec(),
            },
        );
    }
    Ok(())
}

fn has_placeholder(uri: &str) -> bool {
    uri.contains("${")
}
