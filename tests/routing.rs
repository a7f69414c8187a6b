//! End-to-end: rows in, cached route table out, invalidation on mutation.

use std::sync::{Arc, Once};

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use ramo::application::{
    MemoryRepository, MoveTarget, RowSource, SitemapRepository, SitemapService,
};
use ramo::cache::{
    CacheManager, MemoryStore, NS_ROUTING, NS_STRUCTURE, RouteCollectionCacheable,
};
use ramo::domain::locale::{Locale, StaticLocales};
use ramo::domain::page_types::{PageTypeDefinition, PageTypeRegistry};
use ramo::domain::pages::{PageId, PageVariant, Slug};
use ramo::domain::sitemap::{SitemapId, SitemapRow};
use ramo::router::{ReplacementChain, ReplacementStrategy, SlugReplacement, main_route_name};

static TRACING: Once = Once::new();

/// Opt-in log output for debugging test failures (RUST_LOG=debug).
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn sid(n: u128) -> SitemapId {
    SitemapId::new(Uuid::from_u128(n))
}

fn pid(n: u128) -> PageId {
    PageId::new(Uuid::from_u128(1000 + n))
}

fn node(n: u128, parent: Option<u128>, left: i64, right: i64, page_type: &str) -> SitemapRow {
    SitemapRow {
        id: sid(n),
        parent_id: parent.map(sid),
        nested_left: left,
        nested_right: right,
        page_type: page_type.to_string(),
        handle: None,
    }
}

fn page(n: u128, slug: Option<&str>) -> PageVariant {
    PageVariant {
        id: pid(n),
        sitemap_id: sid(n),
        locale: Locale::new("en"),
        name: format!("node-{n}"),
        slug: slug.map(|s| Slug::new(s).expect("valid slug")),
        online: true,
        publish_from: None,
        publish_until: None,
    }
}

/// home(1) { about(2), blog(3) { post(4) } }
fn repository() -> Arc<MemoryRepository> {
    Arc::new(MemoryRepository::new(
        vec![
            node(1, None, 1, 8, "home"),
            node(2, Some(1), 2, 3, "default"),
            node(3, Some(1), 4, 7, "default"),
            node(4, Some(3), 5, 6, "default"),
        ],
        vec![
            page(1, None),
            page(2, Some("about-us")),
            page(3, Some("blog")),
            page(4, Some("first-post")),
        ],
        Vec::new(),
    ))
}

fn registry() -> Arc<PageTypeRegistry> {
    let mut registry = PageTypeRegistry::new();
    registry
        .register(PageTypeDefinition::new("home", "").root_only())
        .expect("register home");
    registry
        .register(PageTypeDefinition::new("default", "/${SLUG}"))
        .expect("register default");
    Arc::new(registry)
}

struct Harness {
    repo: Arc<MemoryRepository>,
    cache: CacheManager,
    artifact: RouteCollectionCacheable,
    page_types: Arc<PageTypeRegistry>,
}

fn harness() -> Harness {
    init_tracing();
    let repo = repository();
    let cache = CacheManager::new(Arc::new(MemoryStore::default()));
    let page_types = registry();
    let chain = Arc::new(ReplacementChain::new([
        Arc::new(SlugReplacement) as Arc<dyn ReplacementStrategy>,
    ]));
    let artifact = RouteCollectionCacheable::new(
        repo.clone() as Arc<dyn RowSource>,
        page_types.clone(),
        Arc::new(StaticLocales::new([Locale::new("en")])),
        chain,
    );
    Harness {
        repo,
        cache,
        artifact,
        page_types,
    }
}

#[test]
fn rows_compile_into_a_routable_table() {
    let h = harness();
    let table = h.cache.fetch(&h.artifact).expect("compile");
    let en = Locale::new("en");

    assert_eq!(table.url_for_page(&pid(1), &en), Some("/"));
    assert_eq!(table.url_for_page(&pid(2), &en), Some("/about-us"));
    assert_eq!(table.url_for_page(&pid(3), &en), Some("/blog"));
    assert_eq!(table.url_for_page(&pid(4), &en), Some("/blog/first-post"));

    let route = table
        .route(&en, &main_route_name(&pid(4)))
        .expect("post route");
    assert_eq!(route.middleware, vec!["cms.resolve-page", "cms.render"]);
    assert_eq!(route.page_id, pid(4));
}

#[test]
fn moving_a_subtree_reroutes_it_after_invalidation() {
    let h = harness();
    let en = Locale::new("en");
    h.cache.fetch(&h.artifact).expect("warm table");

    let service = SitemapService::new(
        h.repo.clone() as Arc<dyn SitemapRepository>,
        h.page_types.clone(),
        h.cache.clone(),
    );
    service
        .move_sitemap(&sid(2), MoveTarget::FirstChildOf(sid(3)))
        .expect("move about below blog");

    let table = h.cache.fetch(&h.artifact).expect("recompiled table");
    assert_eq!(table.url_for_page(&pid(2), &en), Some("/blog/about-us"));
    assert_eq!(table.url_for_page(&pid(4), &en), Some("/blog/first-post"));
}

#[test]
fn stale_table_survives_until_invalidated() {
    let h = harness();
    let en = Locale::new("en");
    h.cache.fetch(&h.artifact).expect("warm table");

    // Mutate behind the service's back: no invalidation happens.
    h.repo
        .move_as_first_child(&sid(2), &sid(3))
        .expect("raw move");

    let stale = h.cache.fetch(&h.artifact).expect("stale table");
    assert_eq!(stale.url_for_page(&pid(2), &en), Some("/about-us"));

    h.cache.invalidate(NS_STRUCTURE).expect("clear structure");
    h.cache.invalidate(NS_ROUTING).expect("clear routing");

    let fresh = h.cache.fetch(&h.artifact).expect("fresh table");
    assert_eq!(fresh.url_for_page(&pid(2), &en), Some("/blog/about-us"));
}

#[test]
fn compilation_is_deterministic() {
    let h = harness();
    let first = h.cache.fetch(&h.artifact).expect("first");
    h.cache.invalidate(NS_ROUTING).expect("clear routing");
    h.cache.invalidate(NS_STRUCTURE).expect("clear structure");
    let second = h.cache.fetch(&h.artifact).expect("second");

    let a = serde_json::to_vec(&first).expect("encode first");
    let b = serde_json::to_vec(&second).expect("encode second");
    assert_eq!(a, b);
}
