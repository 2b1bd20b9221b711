//! Scroll-triggered paging.
//!
//! A front end reports viewport geometry on every scroll or resize. When the
//! end of the rendered list comes within the threshold, the controller asks
//! [`Pagination`] for the next page; the gate there makes repeated signals
//! during a load harmless.

use crate::pagination::{PageRequest, Pagination};

/// Default distance from the end of the list that triggers the next page.
pub const DEFAULT_SCROLL_THRESHOLD: u32 = 1000;

/// Viewport geometry at the time of a scroll or resize signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    /// Offset of the top of the viewport within the content.
    pub scroll_top: u32,
    /// Height of the viewport.
    pub viewport_height: u32,
    /// Total height of the rendered list.
    pub content_height: u32,
}

impl ScrollMetrics {
    /// Create metrics from raw geometry.
    pub fn new(scroll_top: u32, viewport_height: u32, content_height: u32) -> Self {
        Self {
            scroll_top,
            viewport_height,
            content_height,
        }
    }

    /// Metrics for a viewport already at the end of the content.
    pub fn at_end() -> Self {
        Self::default()
    }

    /// Distance from the bottom of the viewport to the end of the list.
    pub fn remaining(&self) -> u32 {
        self.content_height
            .saturating_sub(self.scroll_top.saturating_add(self.viewport_height))
    }
}

/// Decides when scrolling should load the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollController {
    threshold: u32,
}

impl ScrollController {
    /// Create a controller with the given trigger threshold.
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    /// The trigger threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether the viewport is close enough to the end to want more.
    pub fn near_end(&self, metrics: &ScrollMetrics) -> bool {
        metrics.remaining() <= self.threshold
    }

    /// Handle a scroll or resize signal.
    ///
    /// Returns the page to load when the viewport is near the end, no page
    /// is loading and more pages may exist. The returned request has already
    /// claimed the loading gate.
    pub fn on_scroll(
        &self,
        metrics: &ScrollMetrics,
        pagination: &mut Pagination,
    ) -> Option<PageRequest> {
        if !self.near_end(metrics) {
            return None;
        }
        pagination.begin()
    }
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD)
    }
}
