//! Snapshot reads: pages, single records and comment lists.

use std::sync::Arc;

use feed_core::PageRequest;
use feed_types::{Comment, FeedItem, ItemId, PageCursor};
use tracing::debug;

use crate::error::ClientError;
use crate::session::SessionGuard;
use crate::transport::FeedApi;

/// Fetches snapshot data. Holds no feed state; callers merge the results.
pub struct PagedFetcher<A> {
    api: Arc<A>,
    session: Option<Arc<SessionGuard<A>>>,
}

impl<A: FeedApi> PagedFetcher<A> {
    /// Fetcher for anonymous reads.
    pub fn new(api: Arc<A>) -> Self {
        Self { api, session: None }
    }

    /// Fetcher whose reads go through the session guard.
    pub fn with_session(session: Arc<SessionGuard<A>>) -> Self {
        Self {
            api: session.api(),
            session: Some(session),
        }
    }

    /// The session guard, if reads are authenticated.
    pub fn session(&self) -> Option<&Arc<SessionGuard<A>>> {
        self.session.as_ref()
    }

    /// Fetch one page, newest first.
    ///
    /// The result is not deduplicated here, and a failure changes nothing;
    /// the caller keeps its cursor and `has_more` as they were.
    pub async fn load_page(
        &self,
        cursor: PageCursor,
        size: u32,
    ) -> Result<Vec<FeedItem>, ClientError> {
        let request = PageRequest { cursor, size };
        let items = match &self.session {
            Some(session) => {
                let api = session.api();
                session
                    .authorized(|credential| async move {
                        api.fetch_page(request, credential.as_ref()).await
                    })
                    .await?
            }
            None => self.api.fetch_page(request, None).await?,
        };
        debug!(page = cursor.page(), received = items.len(), "page loaded");
        Ok(items)
    }

    /// Fetch one record. A missing record is `Ok(None)`.
    pub async fn load_item(&self, id: ItemId) -> Result<Option<FeedItem>, ClientError> {
        let result = match &self.session {
            Some(session) => {
                let api = session.api();
                session
                    .authorized(|credential| async move {
                        api.fetch_item(id, credential.as_ref()).await
                    })
                    .await
            }
            None => self.api.fetch_item(id, None).await.map_err(ClientError::from),
        };
        match result {
            Ok(item) => Ok(Some(item)),
            Err(ClientError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch every comment attached to a record, in server order.
    pub async fn load_comments(&self, id: ItemId) -> Result<Vec<Comment>, ClientError> {
        match &self.session {
            Some(session) => {
                let api = session.api();
                session
                    .authorized(|credential| async move {
                        api.fetch_comments(id, credential.as_ref()).await
                    })
                    .await
            }
            None => Ok(self.api.fetch_comments(id, None).await?),
        }
    }
}

impl<A> Clone for PagedFetcher<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            session: self.session.clone(),
        }
    }
}
