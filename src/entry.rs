//! Cache Entry Type
//!
//! A [`CacheEntry`] is one stored association. The recency list owns every
//! entry; the key index only records where each one lives.
//!
//! # Lifecycle
//!
//! - Created by the first `put` of a key.
//! - `value` is replaced in place by later `put` calls for the same key.
//! - Dropped when evicted, removed, cleared, or when the cache is dropped.

use core::fmt;

/// A key-value pair resident in the cache.
///
/// # Examples
///
/// ```
/// use guarded_lru::CacheEntry;
///
/// let mut entry = CacheEntry::new("company", "Yandex");
/// assert_eq!(entry.key, "company");
///
/// let old = entry.replace_value("Yandex Lyceum");
/// assert_eq!(old, "Yandex");
/// assert_eq!(entry.value, "Yandex Lyceum");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    /// The cached key
    pub key: K,

    /// The cached value
    pub value: V,
}

impl<K, V> CacheEntry<K, V> {
    /// Creates a new cache entry.
    #[inline]
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Replaces the value, returning the previous one. The key is untouched.
    #[inline]
    pub fn replace_value(&mut self, value: V) -> V {
        core::mem::replace(&mut self.value, value)
    }

    /// Splits the entry into its key and value.
    #[inline]
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CacheEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}
