//! Point-in-time view of a cache's contents.
//!
//! A [`CacheSnapshot`] copies every resident entry out of the cache in recency
//! order, together with the capacity and size at the moment it was taken. For
//! [`ConcurrentLruCache`](crate::ConcurrentLruCache) the copy is made while the
//! lock is held, so a snapshot always matches a state reachable by some serial
//! sequence of `get`/`put` calls.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

/// Entries of a cache ordered from most to least recently used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot<K, V> {
    capacity: usize,
    entries: Vec<(K, V)>,
}

impl<K, V> CacheSnapshot<K, V> {
    pub(crate) fn new(capacity: usize, entries: Vec<(K, V)>) -> Self {
        Self { capacity, entries }
    }

    /// Capacity of the cache the snapshot was taken from.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries resident when the snapshot was taken.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache was empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from most to least recently used.
    pub fn entries(&self) -> &[(K, V)] {
        &self.entries
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Consumes the snapshot, returning the entries.
    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

/// Renders as `LRU Cache (Capacity: 3, Size: 2): [(a: 1) (b: 2)]`.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for CacheSnapshot<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LRU Cache (Capacity: {}, Size: {}): [",
            self.capacity,
            self.entries.len()
        )?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "({}: {})", key, value)?;
        }
        f.write_str("]")
    }
}
