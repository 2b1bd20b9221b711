//! Page cursor and `has_more` tracking for the paged snapshot.
//!
//! The collection exposes no total count. Whether another page exists is
//! inferred from the length of the last response: a full page means "maybe
//! more", a short page (including an empty one) means "done". An exactly
//! full final page therefore costs one extra, empty fetch to terminate.

use feed_types::PageCursor;

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Whether more pages may exist after a response of `received` items.
///
/// False exactly when the response was strictly shorter than `page_size`.
pub fn has_more_after(received: usize, page_size: u32) -> bool {
    received >= page_size as usize
}

/// A page load to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page to request.
    pub cursor: PageCursor,
    /// Requested page size.
    pub size: u32,
}

/// Paging state of one feed: cursor, `has_more` and the loading gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    cursor: PageCursor,
    page_size: u32,
    has_more: bool,
    loading: bool,
}

impl Pagination {
    /// Start at the first page. A zero page size is raised to one so the
    /// heuristic can terminate.
    pub fn new(page_size: u32) -> Self {
        Self {
            cursor: PageCursor::first(),
            page_size: page_size.max(1),
            has_more: true,
            loading: false,
        }
    }

    /// Claim the loading gate and return the request to perform.
    ///
    /// Returns `None` while a page is already loading or once the feed is
    /// known to be exhausted. Suppressed attempts are not queued.
    pub fn begin(&mut self) -> Option<PageRequest> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(PageRequest {
            cursor: self.cursor,
            size: self.page_size,
        })
    }

    /// Record a completed page of `received` items.
    ///
    /// Releases the gate and recomputes `has_more` from this response.
    /// The cursor only advances past pages that returned something and
    /// never moves backwards, so a stale completion cannot rewind it.
    pub fn complete(&mut self, request: PageRequest, received: usize) {
        self.loading = false;
        self.has_more = has_more_after(received, request.size);
        if received > 0 {
            self.cursor = self.cursor.max(request.cursor.next());
        }
    }

    /// Record a failed page load. Cursor and `has_more` are unchanged so
    /// the next trigger retries the same page.
    pub fn fail(&mut self, _request: PageRequest) {
        self.loading = false;
    }

    /// Next page to request.
    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Configured page size.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Whether another page may exist.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Whether a page load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
