#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Single-threaded cache
//!
//! ```rust
//! use guarded_lru::LruCache;
//! use core::num::NonZeroUsize;
//!
//! let mut cache = LruCache::new(NonZeroUsize::new(3).unwrap());
//! cache.put("company", "Yandex");
//! cache.put("division", "Yandex Lyceum");
//! cache.put("course", "Golang");
//!
//! // A read is a use: "company" becomes the most recently used entry
//! assert_eq!(cache.get(&"company"), Some(&"Yandex"));
//!
//! // "division" is now the least recently used entry and is evicted
//! assert_eq!(cache.put("year", "2024"), Some(("division", "Yandex Lyceum")));
//! ```
//!
//! ## Shared cache
//!
//! ```rust
//! use guarded_lru::ConcurrentLruCache;
//! use core::num::NonZeroUsize;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(ConcurrentLruCache::new(NonZeroUsize::new(1000).unwrap()));
//! let worker = Arc::clone(&cache);
//! std::thread::spawn(move || {
//!     worker.put("key".to_string(), 42);
//! })
//! .join()
//! .unwrap();
//! assert_eq!(cache.get("key"), Some(42));
//! ```
//!
//! ## Rejecting a zero capacity
//!
//! ```rust
//! use guarded_lru::{ConcurrentLruCache, LruCache};
//!
//! assert!(LruCache::<String, u32>::try_new(0).is_err());
//! assert!(ConcurrentLruCache::<String, u32>::try_new(0).is_err());
//! ```
//!
//! # Modules
//!
//! - [`lru`]: Least Recently Used cache implementation
//! - [`concurrent`]: Thread-safe wrapper with one lock (requires `concurrent` feature)
//! - [`config`]: Configuration structures
//! - [`error`]: Configuration and integrity-check errors
//! - [`metrics`]: Hit, miss and eviction counters
//! - [`snapshot`]: Consistent point-in-time copies of cache contents

#![no_std]

#[cfg(any(feature = "std", not(feature = "hashbrown"), test))]
extern crate std;

/// Cache entry type.
///
/// Provides the `CacheEntry<K, V>` pair owned by the recency list.
pub mod entry;

/// Arena-backed doubly linked list used as the recency list.
///
/// **Note**: This module is internal infrastructure. Nodes are addressed by
/// slot handles that only the cache's key index is meant to hold.
pub(crate) mod list;

/// Cache configuration structures.
pub mod config;

/// Error types.
pub mod error;

/// Least Recently Used (LRU) cache implementation.
///
/// Provides a fixed-size cache that evicts the least recently used items when
/// the capacity is reached.
pub mod lru;

/// Cache metrics system.
pub mod metrics;

/// Point-in-time copies of cache contents.
pub mod snapshot;

/// Thread-safe LRU cache.
///
/// Wraps the LRU algorithm in a single `parking_lot::Mutex` so that every
/// public operation is one critical section.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

pub use entry::CacheEntry;
pub use error::{ConfigError, InvariantError};
pub use lru::LruCache;
pub use snapshot::CacheSnapshot;

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentLruCache;
