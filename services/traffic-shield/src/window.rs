//! Bounded most-recent-first sequence
//!
//! New entries go to the head. Once the window holds `capacity` entries,
//! each insertion evicts the oldest entry from the tail.

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// A bounded, most-recent-first sequence
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create an empty window holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the head, evicting from the tail beyond capacity
    pub fn push(&mut self, entry: T) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent entry
    pub fn latest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Iterate from most recent to oldest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Mutable access to the first entry matching `pred`, without reordering
    pub fn find_mut(&mut self, pred: impl Fn(&T) -> bool) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| pred(e))
    }

    /// Copy entries out, most recent first
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.entries.iter().cloned().collect()
    }
}

impl<T: Serialize> Serialize for RollingWindow<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}
