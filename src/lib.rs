//! Core of a tree-shaped content management system.
//!
//! The persistence layer hands over flat nested-set rows; [`structure`]
//! materializes them into a validated snapshot, [`tree`] wraps the snapshot
//! in a navigable container with lazy page resolution, and [`router`]
//! compiles the container into a deterministic per-locale route table.
//! Every expensive derivation is a [`cache::Cacheable`] artifact fetched
//! through an explicit [`cache::CacheManager`]; [`application`] services own
//! mutations and the cache invalidation each one requires.

pub mod application;
pub mod cache;
pub mod domain;
pub mod error;
pub mod router;
pub mod structure;
pub mod tree;

pub use error::Error;
