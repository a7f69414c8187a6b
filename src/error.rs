//! Crate-wide error type.

use thiserror::Error;

use crate::application::repos::RepositoryError;
use crate::cache::CacheStoreError;
use crate::domain::error::DomainError;
use crate::router::RouteError;
use crate::structure::StructureError;
use crate::tree::TreeError;

/// Union of every layer's failure, used at the crate's public seams.
///
/// Inner layers keep their own error enums; this type only aggregates them
/// so callers can carry one error through `?`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    CacheStore(#[from] CacheStoreError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
