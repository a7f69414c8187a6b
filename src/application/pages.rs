//! Page publish-state mutations.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::cache::{CacheManager, NS_PAGE, NS_ROUTING};
use crate::domain::error::DomainError;
use crate::domain::pages::PageId;
use crate::error::Error;

use super::repos::PageRepository;

const SOURCE: &str = "application::pages";

/// Publish-state changes with the cache invalidation they require.
///
/// Flipping `online` or the publish window changes what the online filter
/// and the route table may expose, so both the page namespace and the
/// routing namespace are cleared synchronously.
pub struct PageService {
    repo: Arc<dyn PageRepository>,
    cache: CacheManager,
}

impl PageService {
    pub fn new(repo: Arc<dyn PageRepository>, cache: CacheManager) -> Self {
        Self { repo, cache }
    }

    pub fn set_online(&self, id: &PageId, online: bool) -> Result<(), Error> {
        self.repo.set_online(id, online)?;
        info!(target_module = SOURCE, page_id = %id, online, "Changed page online flag");
        self.invalidate()
    }

    pub fn set_publish_window(
        &self,
        id: &PageId,
        from: Option<OffsetDateTime>,
        until: Option<OffsetDateTime>,
    ) -> Result<(), Error> {
        if let (Some(from), Some(until)) = (from, until)
            && until <= from
        {
            return Err(DomainError::validation(
                "publish window must end after it starts",
            )
            .into());
        }
        self.repo.set_publish_window(id, from, until)?;
        info!(target_module = SOURCE, page_id = %id, "Changed page publish window");
        self.invalidate()
    }

    fn invalidate(&self) -> Result<(), Error> {
        self.cache.invalidate(NS_PAGE)?;
        self.cache.invalidate(NS_ROUTING)?;
        Ok(())
    }
}
