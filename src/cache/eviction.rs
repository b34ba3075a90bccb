//! Eviction Tracker Module
//!
//! Tracks insertion order for capacity eviction.

use std::collections::VecDeque;

// == Insertion Tracker ==
/// Tracks the order in which keys were inserted.
///
/// Keys are stored in a VecDeque where:
/// - Front = oldest insertion
/// - Back = newest insertion
///
/// Reads never reorder keys; only an insert (or overwrite, which resets the
/// entry's expiry as well) moves a key to the back.
#[derive(Debug, Default)]
pub struct InsertionTracker {
    /// Keys ordered by insertion time
    order: VecDeque<String>,
}

impl InsertionTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Records an insert of `key`, moving it to the newest position.
    ///
    /// An overwrite counts as a fresh insertion.
    pub fn record(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the oldest-inserted key.
    ///
    /// Returns None if the tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest-inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    // == Clear ==
    /// Drops all tracked keys.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
