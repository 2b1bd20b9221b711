//! Id-based merge of the paged snapshot and the live stream.
//!
//! Both sources deliver immutable records keyed by a server-assigned id.
//! Merging only consults id set membership, so applying a page and a
//! stream delivery in either order yields the same set of ids.

use std::collections::HashSet;

use feed_types::{ItemId, Keyed};

/// Where surviving incoming records are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// At the head, for stream-origin records (most recent first).
    Prepend,
    /// At the tail, for page-origin records (in response order).
    Append,
}

/// Merge `incoming` into `existing`, returning the new ordered sequence.
///
/// Incoming records whose id is already present in `existing`, or that
/// repeat an earlier incoming id, are dropped. Survivors keep their given
/// order and go to the head or tail according to `placement`.
pub fn merge<T, I>(existing: &[T], incoming: I, placement: Placement) -> Vec<T>
where
    T: Keyed + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen: HashSet<ItemId> = existing.iter().map(Keyed::key).collect();
    let survivors: Vec<T> = incoming
        .into_iter()
        .filter(|item| seen.insert(item.key()))
        .collect();

    let mut merged = Vec::with_capacity(existing.len() + survivors.len());
    match placement {
        Placement::Prepend => {
            merged.extend(survivors);
            merged.extend_from_slice(existing);
        }
        Placement::Append => {
            merged.extend_from_slice(existing);
            merged.extend(survivors);
        }
    }
    merged
}

/// An ordered, deduplicated collection of records.
///
/// Keeps an id index next to the ordered items so membership checks do not
/// rescan the list on every stream event.
#[derive(Debug, Clone)]
pub struct FeedStore<T> {
    items: Vec<T>,
    ids: HashSet<ItemId>,
}

impl<T: Keyed> FeedStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Merge records into the store. Returns how many were new.
    pub fn merge<I>(&mut self, incoming: I, placement: Placement) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let survivors: Vec<T> = incoming
            .into_iter()
            .filter(|item| self.ids.insert(item.key()))
            .collect();
        let added = survivors.len();
        if added == 0 {
            return 0;
        }

        match placement {
            Placement::Prepend => {
                let tail = std::mem::replace(&mut self.items, survivors);
                self.items.extend(tail);
            }
            Placement::Append => self.items.extend(survivors),
        }
        added
    }

    /// Insert one stream-origin record at the head. Returns false if its id
    /// was already present.
    pub fn prepend(&mut self, item: T) -> bool {
        self.merge(std::iter::once(item), Placement::Prepend) == 1
    }

    /// Append page-origin records at the tail. Returns how many were new.
    pub fn append<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.merge(items, Placement::Append)
    }

    /// Check whether a record with this id is present.
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// The ordered records.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the ids in display order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(Keyed::key)
    }
}

impl<T: Keyed> Default for FeedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
