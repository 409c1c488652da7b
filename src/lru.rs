//! Least Recently Used (LRU) Cache Implementation
//!
//! This module provides an LRU cache with O(1) operations for lookup,
//! insertion, update, recency reordering and eviction.
//!
//! # Algorithm
//!
//! Two structures are kept in lockstep:
//!
//! - a **recency list** that owns every entry, most recently used at the head
//!   and least recently used at the tail;
//! - an **index** mapping each key to the [`NodeId`] of its node in the list.
//!
//! A hash map alone cannot keep recency order cheaply and a list alone cannot
//! find a key cheaply; together they give O(1) for every operation.
//!
//! ```text
//!   index (HashMap<K, NodeId>)          recency list (arena slots)
//!   ┌────────────┬────────┐
//!   │ "company"  │ slot 0 ├──────┐      head                          tail
//!   │ "course"   │ slot 2 ├───┐  │       │                             │
//!   │ "division" │ slot 1 ├─┐ │  │       ▼                             ▼
//!   └────────────┴────────┘ │ │  └──▶ [company] ◀──▶ [course] ◀──▶ [division]
//!                           │ └─────────────────────────┘              ▲
//!                           └──────────────────────────────────────────┘
//! ```
//!
//! `get` moves the entry to the head. `put` of an existing key replaces the
//! value in place and moves it to the head. `put` of a new key into a full
//! cache first unlinks the tail entry from both structures, then links the
//! new entry at the head, so the list never holds more than `capacity` nodes.
//!
//! # Performance Characteristics
//!
//! - **Time Complexity**: Get, Put, Remove are O(1); `clear`, `iter` and
//!   `snapshot` are O(n)
//! - **Space Complexity**: O(n) where n is the capacity of the cache
//!
//! # Thread Safety
//!
//! [`LruCache`] is not synchronized: every method that changes recency takes
//! `&mut self`. For shared access use
//! [`ConcurrentLruCache`](crate::ConcurrentLruCache), which guards the same
//! algorithm with a single lock.

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::entry::CacheEntry;
use crate::error::{ConfigError, InvariantError};
use crate::list::{self, List, NodeId, MAX_PREALLOCATED};
use crate::metrics::{CacheMetrics, LruCacheMetrics};
use crate::snapshot::CacheSnapshot;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use tracing::{debug, trace};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Internal LRU segment containing the actual cache algorithm.
///
/// This is shared between `LruCache` (single-threaded) and
/// `ConcurrentLruCache` (one segment behind one mutex). The index holds
/// `NodeId` handles into `list`; `list` alone owns the entries.
pub(crate) struct LruSegment<K, V, S = DefaultHashBuilder> {
    config: LruCacheConfig,
    list: List<CacheEntry<K, V>>,
    map: HashMap<K, NodeId, S>,
    metrics: LruCacheMetrics,
}

impl<K: Hash + Eq, V, S: BuildHasher> LruSegment<K, V, S> {
    pub(crate) fn with_hasher(config: LruCacheConfig, hash_builder: S) -> Self {
        let cap = config.capacity();
        debug!(capacity = cap.get(), "creating LRU segment");
        LruSegment {
            config,
            list: List::new(cap),
            map: HashMap::with_capacity_and_hasher(
                cap.get().min(MAX_PREALLOCATED),
                hash_builder,
            ),
            metrics: LruCacheMetrics::new(cap.get() as u64),
        }
    }

    #[inline]
    pub(crate) fn cap(&self) -> NonZeroUsize {
        self.config.capacity()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &LruCacheMetrics {
        &self.metrics
    }

    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.map.get(key).copied() {
            Some(node) => {
                self.list.move_to_front(node);
                self.metrics.core.record_hit();
                self.list.get_value(node).map(|entry| &entry.value)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.map.get(key).copied() {
            Some(node) => {
                self.list.move_to_front(node);
                self.metrics.core.record_hit();
                self.list.get_value_mut(node).map(|entry| &mut entry.value)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    pub(crate) fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.get(key).copied()?;
        self.list.get_value(node).map(|entry| &entry.value)
    }

    #[inline]
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        if let Some(node) = self.map.get(&key).copied() {
            self.list.move_to_front(node);
            self.metrics.core.record_update();
            let old_value = self.list.get_value_mut(node)?.replace_value(value);
            return Some((key, old_value));
        }

        let evicted = if self.list.is_full() {
            self.evict_lru()
        } else {
            None
        };

        if let Some(node) = self.list.add(CacheEntry::new(key.clone(), value)) {
            self.map.insert(key, node);
            self.metrics.core.record_insertion();
        }

        evicted
    }

    /// Unlinks the tail entry from both the list and the index.
    fn evict_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.remove_last()?;
        self.map.remove(&entry.key);
        self.metrics.core.record_eviction();
        trace!(
            len = self.list.len(),
            capacity = self.cap().get(),
            "evicted least recently used entry"
        );
        Some(entry.into_parts())
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let node = self.map.remove(key)?;
        let entry = self.list.remove(node)?;
        self.metrics.core.record_removal();
        trace!(len = self.list.len(), "removed entry");
        Some(entry.value)
    }

    pub(crate) fn clear(&mut self) {
        debug!(dropped = self.map.len(), "clearing LRU segment");
        self.map.clear();
        self.list.clear();
    }

    #[inline]
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
        }
    }

    pub(crate) fn snapshot(&self) -> CacheSnapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let entries = self
            .list
            .iter()
            .map(|entry| (entry.key.clone(), entry.value.clone()))
            .collect();
        CacheSnapshot::new(self.cap().get(), entries)
    }

    /// Walks the list and the index and checks they describe the same set of
    /// entries.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantError> {
        let cap = self.cap().get();
        if self.list.len() != self.map.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys but list has {} nodes",
                self.map.len(),
                self.list.len()
            )));
        }
        if self.list.len() > cap {
            return Err(InvariantError::new(format!(
                "list holds {} nodes, over capacity {}",
                self.list.len(),
                cap
            )));
        }

        let forward = self.list.iter().count();
        if forward != self.list.len() {
            return Err(InvariantError::new(format!(
                "forward walk visited {} nodes, expected {}",
                forward,
                self.list.len()
            )));
        }

        let mut backward = 0;
        for (node, entry) in self.list.iter_rev_with_ids() {
            backward += 1;
            if self.map.get(&entry.key) != Some(&node) {
                return Err(InvariantError::new(format!(
                    "list node {} is not the one indexed for its key",
                    node.index()
                )));
            }
        }
        if backward != self.list.len() {
            return Err(InvariantError::new(format!(
                "backward walk visited {} nodes, expected {}",
                backward,
                self.list.len()
            )));
        }

        Ok(())
    }
}

impl<K, V, S> core::fmt::Debug for LruSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruSegment")
            .field("capacity", &self.config.capacity())
            .field("len", &self.map.len())
            .finish()
    }
}

/// An implementation of a Least Recently Used (LRU) cache.
///
/// The cache has a fixed capacity and supports O(1) operations for
/// inserting, retrieving, and updating entries. When the cache reaches capacity,
/// the least recently used entry will be evicted to make room for new entries.
///
/// # Examples
///
/// ```
/// use guarded_lru::LruCache;
/// use core::num::NonZeroUsize;
///
/// let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
///
/// cache.put("apple", 1);
/// cache.put("banana", 2);
///
/// // Accessing items updates their recency
/// assert_eq!(cache.get(&"apple"), Some(&1));
///
/// // Adding beyond capacity evicts the least recently used item
/// assert_eq!(cache.put("cherry", 3), Some(("banana", 2)));
/// assert_eq!(cache.get(&"banana"), None);
/// assert_eq!(cache.get(&"apple"), Some(&1));
/// assert_eq!(cache.get(&"cherry"), Some(&3));
/// ```
pub struct LruCache<K, V, S = DefaultHashBuilder> {
    segment: LruSegment<K, V, S>,
}

impl<K, V, S> core::fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.segment.config.capacity())
            .field("len", &self.segment.map.len())
            .finish()
    }
}

impl<K: Hash + Eq, V> LruCache<K, V, DefaultHashBuilder> {
    /// Creates a new LRU cache holding at most `cap` entries.
    pub fn new(cap: NonZeroUsize) -> Self {
        Self::init(LruCacheConfig::new(cap), None)
    }

    /// Creates a new LRU cache from an unchecked capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    ///
    /// ```
    /// use guarded_lru::LruCache;
    ///
    /// let cache: LruCache<&str, i32> = LruCache::try_new(3).unwrap();
    /// assert_eq!(cache.cap().get(), 3);
    /// assert!(LruCache::<&str, i32>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        LruCacheConfig::try_new(capacity).map(|config| Self::init(config, None))
    }

    /// Creates a new LRU cache from a configuration with an optional hasher.
    ///
    /// If `hasher` is `None`, the default hasher is used.
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LruCache<K, V, S> {
    /// Creates a new LRU cache from a configuration and a custom hash builder.
    pub fn init_with_hasher(config: LruCacheConfig, hash_builder: S) -> Self {
        Self {
            segment: LruSegment::with_hasher(config, hash_builder),
        }
    }

    /// Creates a new LRU cache with the specified capacity and hash builder.
    pub fn with_hasher(cap: NonZeroUsize, hash_builder: S) -> Self {
        Self::init_with_hasher(LruCacheConfig::new(cap), hash_builder)
    }

    /// Returns the maximum number of entries the cache can hold.
    #[inline]
    pub fn cap(&self) -> NonZeroUsize {
        self.segment.cap()
    }

    /// Returns the number of resident entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Returns a reference to the value for `key` and marks it most recently
    /// used.
    ///
    /// A miss changes nothing but the miss counter.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get(key)
    }

    /// Like [`get`](Self::get), but returns a mutable reference.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_mut(key)
    }

    /// Returns a reference to the value for `key` without touching recency.
    #[inline]
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.peek(key)
    }

    /// Returns `true` if `key` is resident. Does not touch recency.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.contains_key(key)
    }

    /// Removes `key` from the cache, returning its value.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.remove(key)
    }

    /// Drops every entry. Capacity and metrics are kept.
    #[inline]
    pub fn clear(&mut self) {
        self.segment.clear()
    }

    /// Iterates entries from most to least recently used without touching
    /// recency.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.segment.iter()
    }

    /// Verifies that the recency list and the key index agree.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first disagreement found.
    #[inline]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.segment.check_invariants()
    }
}

impl<K: Hash + Eq + Clone, V, S: BuildHasher> LruCache<K, V, S> {
    /// Inserts or updates `key`, making it the most recently used entry.
    ///
    /// Returns the pair that left the cache because of this call:
    ///
    /// - `Some((key, old_value))` if `key` was already present (size unchanged);
    /// - `Some((evicted_key, evicted_value))` if a new key pushed out the least
    ///   recently used entry;
    /// - `None` if a new key fit without eviction.
    #[inline]
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.segment.put(key, value)
    }
}

impl<K: Hash + Eq + Clone, V: Clone, S: BuildHasher> LruCache<K, V, S> {
    /// Copies the resident entries, most recently used first.
    ///
    /// ```
    /// use guarded_lru::LruCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
    /// cache.put("a", 1);
    /// cache.put("b", 2);
    /// assert_eq!(
    ///     cache.snapshot().to_string(),
    ///     "LRU Cache (Capacity: 3, Size: 2): [(b: 2) (a: 1)]"
    /// );
    /// ```
    pub fn snapshot(&self) -> CacheSnapshot<K, V> {
        self.segment.snapshot()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> CacheMetrics for LruCache<K, V, S> {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.metrics().algorithm_name()
    }
}

impl<'a, K: Hash + Eq, V, S: BuildHasher> IntoIterator for &'a LruCache<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the entries of an [`LruCache`], most recently used first.
pub struct Iter<'a, K, V> {
    inner: list::Iter<'a, CacheEntry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> core::fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.inner.len())
            .finish()
    }
}
