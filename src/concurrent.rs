//! Thread-safe LRU Cache
//!
//! [`ConcurrentLruCache`] puts the whole LRU algorithm (recency list, key
//! index and counters) behind a single `parking_lot::Mutex`.
//!
//! # Why one lock?
//!
//! Every `get` moves its entry to the head of the recency list, so a read
//! rewrites global list structure just like a write does. An `RwLock` would
//! hand out exclusive guards on every call anyway, and per-entry locks cannot
//! protect the neighbour links that a move touches. A single `Mutex` whose
//! critical section is exactly one public operation is therefore the whole
//! synchronization story:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                ConcurrentLruCache                │
//! │                                                  │
//! │   get / put / remove / snapshot / ...            │
//! │                  │                               │
//! │             ┌────▼────┐                          │
//! │             │  Mutex  │  one guard per call      │
//! │             └────┬────┘                          │
//! │        ┌─────────▼──────────┐                    │
//! │        │     LruSegment     │                    │
//! │        │  list + index +    │                    │
//! │        │  metrics           │                    │
//! │        └────────────────────┘                    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Each call acquires the lock, runs to completion and releases it through
//! the guard's `Drop`, including when a user closure passed to
//! [`get_with`](ConcurrentLruCache::get_with) panics. `parking_lot` mutexes do
//! not poison. Operations are linearizable: each one takes effect at the point
//! it holds the lock, and the entry count never exceeds capacity, even
//! transiently.
//!
//! Eviction runs inline inside the `put` that overflows the cache. There are
//! no background threads.
//!
//! # Example
//!
//! ```
//! use guarded_lru::ConcurrentLruCache;
//! use core::num::NonZeroUsize;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ConcurrentLruCache::new(NonZeroUsize::new(100).unwrap()));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for i in 0..50 {
//!                 let key = format!("key_{}_{}", t, i);
//!                 cache.put(key.clone(), i);
//!                 let _ = cache.get(&key);
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(cache.len(), 100);
//! ```

extern crate alloc;

use crate::config::LruCacheConfig;
use crate::error::{ConfigError, InvariantError};
use crate::lru::LruSegment;
use crate::metrics::CacheMetrics;
use crate::snapshot::CacheSnapshot;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroUsize;
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe LRU cache guarded by a single lock.
///
/// All methods take `&self`; share the cache between threads with `Arc`.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone`.
/// - `V`: Value type. Methods that hand a value out of the lock (`get`,
///   `peek`, `snapshot`) require `V: Clone`; the closure-based accessors do not.
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
///
/// # Example
///
/// ```
/// use guarded_lru::ConcurrentLruCache;
/// use core::num::NonZeroUsize;
///
/// let cache = ConcurrentLruCache::new(NonZeroUsize::new(2).unwrap());
/// cache.put("apple", 1);
/// cache.put("banana", 2);
/// assert_eq!(cache.get(&"apple"), Some(1));
///
/// // banana is now the least recently used entry
/// assert_eq!(cache.put("cherry", 3), Some(("banana", 2)));
/// assert_eq!(cache.get(&"banana"), None);
/// ```
pub struct ConcurrentLruCache<K, V, S = DefaultHashBuilder> {
    segment: Mutex<LruSegment<K, V, S>>,
}

impl<K, V> ConcurrentLruCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
{
    /// Creates a new concurrent LRU cache holding at most `cap` entries.
    pub fn new(cap: NonZeroUsize) -> Self {
        Self::init(LruCacheConfig::new(cap), None)
    }

    /// Creates a new concurrent LRU cache from an unchecked capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        LruCacheConfig::try_new(capacity).map(|config| Self::init(config, None))
    }

    /// Creates a new concurrent LRU cache from a configuration with an
    /// optional hasher. If `hasher` is `None`, the default hasher is used.
    pub fn init(config: LruCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self::init_with_hasher(config, hasher.unwrap_or_default())
    }
}

impl<K, V, S> ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Creates a concurrent LRU cache with a custom hash builder.
    pub fn init_with_hasher(config: LruCacheConfig, hash_builder: S) -> Self {
        Self {
            segment: Mutex::new(LruSegment::with_hasher(config, hash_builder)),
        }
    }

    /// Returns the maximum number of entries the cache can hold.
    pub fn capacity(&self) -> NonZeroUsize {
        self.segment.lock().cap()
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// Returns `true` if the cache contains no entries.
    pub fn is_empty(&self) -> bool {
        self.segment.lock().is_empty()
    }

    /// Retrieves a value from the cache and marks it most recently used.
    ///
    /// Returns a **clone** of the value so no reference outlives the lock.
    /// For operations that don't need ownership, use
    /// [`get_with()`](Self::get_with) instead.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Retrieves a value and applies `f` to it while holding the lock.
    ///
    /// Touches recency exactly like [`get()`](Self::get). Keep `f` short: every
    /// other caller waits on the same lock while it runs.
    ///
    /// `f` must not call back into the same cache, not even through its
    /// `Debug` impl. The lock is not reentrant, so doing so deadlocks.
    ///
    /// ```
    /// use guarded_lru::ConcurrentLruCache;
    /// use core::num::NonZeroUsize;
    ///
    /// let cache = ConcurrentLruCache::new(NonZeroUsize::new(4).unwrap());
    /// cache.put("course", String::from("Golang"));
    /// assert_eq!(cache.get_with(&"course", |v| v.len()), Some(6));
    /// ```
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Retrieves a mutable reference and applies `f` to it under the lock.
    ///
    /// Allows in-place modification of cached values without removing them.
    ///
    /// The same rule as [`get_with()`](Self::get_with) applies: `f` runs under
    /// the non-reentrant lock and must not touch this cache.
    pub fn get_mut_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&mut V) -> R,
    {
        self.segment.lock().get_mut(key).map(f)
    }

    /// Returns a clone of the value for `key` without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().peek(key).cloned()
    }

    /// Checks if the cache contains a key. Does not touch recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Inserts or updates a key-value pair, making it most recently used.
    ///
    /// # Returns
    ///
    /// - `Some((key, old_value))` if the key already existed
    /// - `Some((evicted_key, evicted_value))` if a new key evicted the least
    ///   recently used entry
    /// - `None` if inserted with available capacity
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.segment.lock().put(key, value)
    }

    /// Removes a key from the cache, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().remove(key)
    }

    /// Removes all entries. Capacity and metrics are kept.
    pub fn clear(&self) {
        self.segment.lock().clear();
    }

    /// Copies the resident entries under the lock, most recently used first.
    ///
    /// The snapshot reflects one consistent state: no `put` or `get` from
    /// another thread can interleave with the copy.
    pub fn snapshot(&self) -> CacheSnapshot<K, V>
    where
        V: Clone,
    {
        self.segment.lock().snapshot()
    }

    /// Verifies under the lock that the recency list and key index agree.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first disagreement found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.segment.lock().check_invariants()
    }
}

impl<K, V, S> CacheMetrics for ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "ConcurrentLRU"
    }
}

impl<K, V, S> core::fmt::Debug for ConcurrentLruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let segment = self.segment.lock();
        f.debug_struct("ConcurrentLruCache")
            .field("capacity", &segment.cap())
            .field("len", &segment.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate std;
    use std::string::ToString;
    use std::sync::Arc;
    use std::thread;
    use std::vec::Vec;

    fn make_cache<K: Hash + Eq + Clone, V>(cap: usize) -> ConcurrentLruCache<K, V> {
        ConcurrentLruCache::new(NonZeroUsize::new(cap).unwrap())
    }

    #[test]
    fn test_basic_operations() {
        let cache: ConcurrentLruCache<String, i32> = make_cache(100);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), None);
        assert_eq!(cache.len(), 2);
        assert!(!cache.is_empty());
        assert_eq!(cache.capacity().get(), 100);
    }

    #[test]
    fn test_try_new_rejects_zero() {
        assert!(ConcurrentLruCache::<String, i32>::try_new(0).is_err());
        let cache = ConcurrentLruCache::<String, i32>::try_new(3).unwrap();
        assert_eq!(cache.capacity().get(), 3);
    }

    #[test]
    fn test_get_with_and_get_mut_with() {
        let cache: ConcurrentLruCache<String, String> = make_cache(10);
        cache.put("key".to_string(), "hello world".to_string());

        assert_eq!(cache.get_with("key", |v: &String| v.len()), Some(11));
        assert_eq!(cache.get_with("missing", |v: &String| v.len()), None);

        cache.get_mut_with("key", |v: &mut String| v.push_str("!"));
        assert_eq!(cache.get("key"), Some("hello world!".to_string()));
    }

    #[test]
    fn test_peek_and_contains_do_not_touch_recency() {
        let cache: ConcurrentLruCache<&str, i32> = make_cache(2);
        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.peek(&"a"), Some(1));
        assert!(cache.contains_key(&"a"));

        assert_eq!(cache.put("c", 3), Some(("a", 1)));
        assert!(!cache.contains_key(&"a"));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache: ConcurrentLruCache<String, i32> = make_cache(100);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);

        assert_eq!(cache.remove("a"), Some(1));
        assert_eq!(cache.remove("a"), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_snapshot_and_debug() {
        let cache: ConcurrentLruCache<&str, i32> = make_cache(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.entries(), &[("a", 1), ("b", 2)]);
        assert_eq!(
            snapshot.to_string(),
            "LRU Cache (Capacity: 3, Size: 2): [(a: 1) (b: 2)]"
        );

        let debug = std::format!("{:?}", cache);
        assert!(debug.contains("len: 2"));
    }

    #[test]
    fn test_metrics() {
        let cache: ConcurrentLruCache<&str, i32> = make_cache(1);
        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"b");
        cache.put("b", 2);

        let metrics = cache.metrics();
        assert_eq!(metrics.get("cache_hits"), Some(&1.0));
        assert_eq!(metrics.get("cache_misses"), Some(&1.0));
        assert_eq!(metrics.get("evictions"), Some(&1.0));
        assert_eq!(cache.algorithm_name(), "ConcurrentLRU");
    }

    #[test]
    fn test_concurrent_access() {
        let cache: Arc<ConcurrentLruCache<String, i32>> = Arc::new(make_cache(1000));
        let num_threads = 8;
        let ops_per_thread = 500;

        let mut handles: Vec<std::thread::JoinHandle<()>> = Vec::new();

        for t in 0..num_threads {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = std::format!("key_{}_{}", t, i);
                    cache.put(key.clone(), i);
                    let _ = cache.get(&key);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 1000);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_lock_released_after_panicking_closure() {
        let cache: Arc<ConcurrentLruCache<&str, i32>> = Arc::new(make_cache(4));
        cache.put("a", 1);

        let worker = Arc::clone(&cache);
        let result = thread::spawn(move || {
            worker.get_with(&"a", |_| panic!("closure failed"));
        })
        .join();
        assert!(result.is_err());

        // The guard was dropped during unwinding, so the cache is still usable.
        cache.put("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_closure_result_used_after_lock_released() {
        let cache: ConcurrentLruCache<&str, i32> = make_cache(4);
        cache.put("a", 1);

        // Work that needs the cache again happens on the returned value,
        // outside the closure.
        let doubled = cache.get_with(&"a", |v| *v * 2).unwrap();
        cache.put("b", doubled);
        cache.get_mut_with(&"b", |v| *v += 1).unwrap();

        assert_eq!(cache.peek(&"b"), Some(3));
        assert!(std::format!("{:?}", cache).contains("len: 2"));
    }

    #[test]
    fn test_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConcurrentLruCache<String, Vec<u8>>>();
    }
}
