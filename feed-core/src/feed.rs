//! Combined state of one mounted feed.

use feed_types::Keyed;

use crate::merge::FeedStore;
use crate::pagination::{PageRequest, Pagination};
use crate::stream::StreamStatus;

/// Everything one feed view owns: the merged records, paging state and the
/// status of its live stream.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    store: FeedStore<T>,
    pagination: Pagination,
    stream_status: StreamStatus,
}

impl<T: Keyed> FeedState<T> {
    /// Create an empty feed state.
    pub fn new(page_size: u32) -> Self {
        Self {
            store: FeedStore::new(),
            pagination: Pagination::new(page_size),
            stream_status: StreamStatus::Init,
        }
    }

    /// Apply a completed page: append its records, then advance the cursor
    /// and recompute `has_more`. Returns how many records were new.
    ///
    /// Stale completions are merged like any other.
    pub fn apply_page(&mut self, request: PageRequest, items: Vec<T>) -> usize {
        let received = items.len();
        let added = self.store.append(items);
        self.pagination.complete(request, received);
        added
    }

    /// Release the loading gate after a failed page load.
    pub fn fail_page(&mut self, request: PageRequest) {
        self.pagination.fail(request);
    }

    /// Apply one stream-delivered record at the head. Returns false if it
    /// was already present.
    pub fn apply_stream_item(&mut self, item: T) -> bool {
        self.store.prepend(item)
    }

    /// Record the live stream's status.
    pub fn set_stream_status(&mut self, status: StreamStatus) {
        self.stream_status = status;
    }

    /// The ordered records.
    pub fn items(&self) -> &[T] {
        self.store.items()
    }

    /// The merged store.
    pub fn store(&self) -> &FeedStore<T> {
        &self.store
    }

    /// Paging state.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Mutable paging state, for scroll-triggered loads.
    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    /// Whether another page may exist.
    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    /// Whether a page load is in flight.
    pub fn is_loading_page(&self) -> bool {
        self.pagination.is_loading()
    }

    /// Current live stream status.
    pub fn stream_status(&self) -> StreamStatus {
        self.stream_status
    }
}
