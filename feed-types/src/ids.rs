//! Identity and ordering types for livefeed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A server-assigned identifier for an item or comment.
///
/// Stable for the lifetime of the record. Two records with the same
/// `ItemId` are the same record, whichever source delivered them.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Create a new ItemId with the given value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this ItemId.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

/// Index of the next page to request from the paged collection.
///
/// Pages are zero-based. The collection exposes no total count, so the
/// cursor only ever moves forward.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct PageCursor(u32);

impl PageCursor {
    /// Create a new PageCursor with the given page index.
    pub fn new(page: u32) -> Self {
        Self(page)
    }

    /// The first page.
    pub fn first() -> Self {
        Self(0)
    }

    /// Get the page index.
    pub fn page(&self) -> u32 {
        self.0
    }

    /// The page after this one.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageCursor({})", self.0)
    }
}
