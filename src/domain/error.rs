use thiserror::Error;

use super::pages::PageId;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unknown page type `{0}`")]
    UnknownPageType(String),
    #[error("page type `{0}` is already registered")]
    DuplicatePageType(String),
    #[error("page `{0}` not found")]
    PageNotFound(PageId),
    #[error("navigation lookup failed: {message}")]
    NavigationLookup { message: String },
    #[error("domain validation failed: {message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn navigation_lookup(message: impl Into<String>) -> Self {
        Self::NavigationLookup {
            message: message.into(),
        }
    }
}
