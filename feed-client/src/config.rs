//! Configuration for the feed client.

use std::time::Duration;

use feed_core::{DEFAULT_PAGE_SIZE, DEFAULT_SCROLL_THRESHOLD};
use feed_types::ItemId;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Default collection path segment.
pub const DEFAULT_COLLECTION: &str = "boards";

/// Configuration for the HTTP and stream transports and the feed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Collection path segment under the API root.
    pub collection: String,
    /// Items per page.
    pub page_size: u32,
    /// Remaining scroll distance that triggers the next page.
    pub scroll_threshold: u32,
    /// Delay before the stream transport reconnects, unless the server
    /// sends its own `retry:` hint.
    pub stream_retry: Duration,
    /// Timeout for request/response calls.
    pub request_timeout: Duration,
}

impl FeedConfig {
    /// Create a configuration for the given API root.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            stream_retry: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set the collection path segment.
    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collection = collection.trim_matches('/').to_string();
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the scroll threshold.
    pub fn with_scroll_threshold(mut self, threshold: u32) -> Self {
        self.scroll_threshold = threshold;
        self
    }

    /// Set the default stream reconnection delay.
    pub fn with_stream_retry(mut self, retry: Duration) -> Self {
        self.stream_retry = retry;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Path of the new-items stream, relative to the API root.
    pub fn new_posts_path(&self) -> String {
        format!("{}/new-posts", self.collection)
    }

    /// Path of an item's comment stream, relative to the API root.
    pub fn comment_stream_path(&self, item: ItemId) -> String {
        format!("{}/{}/comments/stream", self.collection, item)
    }

    /// Absolute URL for a path relative to the API root.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
