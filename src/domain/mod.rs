//! Domain layer: rows, entities, and invariants.

pub mod error;
pub mod locale;
pub mod navigation;
pub mod page_types;
pub mod pages;
pub mod sitemap;
