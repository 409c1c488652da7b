//! Correctness Tests for the LRU Cache
//!
//! Validates eviction order, recency updates and the shape of `put` results
//! using small, predictable caches. Each test states which key is expected to
//! be evicted and checks it explicitly.
//!
//! ## Test Strategy
//! - Small cache sizes (1-5 entries) for predictable behavior
//! - Deterministic access patterns, plus generated operation sequences
//!   checked against a plain `Vec` model of recency
//! - Invariant checks after every mutation in the longer sequences

use guarded_lru::config::LruCacheConfig;
use guarded_lru::metrics::CacheMetrics;
use guarded_lru::LruCache;
use proptest::prelude::*;
use std::num::NonZeroUsize;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Helper to create an LruCache with the given capacity
fn make_lru<K: std::hash::Hash + Eq + Clone, V>(cap: usize) -> LruCache<K, V> {
    let config = LruCacheConfig {
        capacity: NonZeroUsize::new(cap).unwrap(),
    };
    LruCache::init(config, None)
}

/// Keys from most to least recently used.
fn keys<K: std::hash::Hash + Eq + Clone, V>(cache: &LruCache<K, V>) -> Vec<K> {
    cache.iter().map(|(k, _)| k.clone()).collect()
}

// ============================================================================
// EVICTION ORDER
// ============================================================================

#[test]
fn test_lru_evicts_least_recently_used() {
    let mut cache = make_lru(3);

    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);
    // LRU order: 1 (LRU) -> 2 -> 3 (MRU)

    // Insert new key - should evict key 1
    assert_eq!(cache.put(4, 40), Some((1, 10)));
    assert!(!cache.contains_key(&1), "Key 1 should have been evicted");
    assert_eq!(cache.len(), 3);

    // Insert another - should evict key 2
    assert_eq!(cache.put(5, 50), Some((2, 20)));
    assert_eq!(keys(&cache), vec![5, 4, 3]);
}

#[test]
fn test_lru_eviction_order_is_predictable() {
    let mut cache = make_lru(5);

    for i in 0..5 {
        cache.put(i, i * 10);
    }

    for (next, expected) in (5..10).zip(0..5) {
        assert_eq!(
            cache.put(next, next * 10),
            Some((expected, expected * 10)),
            "Inserting {} should evict {}",
            next,
            expected
        );
    }

    assert_eq!(keys(&cache), vec![9, 8, 7, 6, 5]);
}

#[test]
fn test_lru_get_updates_recency() {
    let mut cache = make_lru(3);

    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);

    // Access key 1 to make it recently used
    assert_eq!(cache.get(&1), Some(&10));
    // LRU order: 2 (LRU) -> 3 -> 1 (MRU)

    // Insert new key - should evict key 2, NOT key 1
    assert_eq!(cache.put(4, 40), Some((2, 20)));
    assert!(cache.contains_key(&1), "Key 1 should remain (recently used)");
}

#[test]
fn test_lru_peek_does_not_update_recency() {
    let mut cache = make_lru(3);

    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);

    assert_eq!(cache.peek(&1), Some(&10));
    assert!(cache.contains_key(&1));

    // Key 1 is still LRU
    assert_eq!(cache.put(4, 40), Some((1, 10)));
}

#[test]
fn test_lru_update_moves_to_front_without_eviction() {
    let mut cache = make_lru(3);

    cache.put("a", 1);
    cache.put("b", 2);
    cache.put("c", 3);

    // Updating a full cache returns the old value and evicts nothing
    assert_eq!(cache.put("a", 100), Some(("a", 1)));
    assert_eq!(cache.len(), 3);
    assert_eq!(keys(&cache), vec!["a", "c", "b"]);

    // "b" is now LRU
    assert_eq!(cache.put("d", 4), Some(("b", 2)));
    assert_eq!(cache.get(&"a"), Some(&100));
}

#[test]
fn test_lru_capacity_one() {
    let mut cache = make_lru(1);

    assert_eq!(cache.put("x", 1), None);
    assert_eq!(cache.put("x", 2), Some(("x", 1)));
    assert_eq!(cache.put("y", 3), Some(("x", 2)));
    assert_eq!(cache.get(&"x"), None);
    assert_eq!(cache.get(&"y"), Some(&3));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_lru_zero_capacity_is_rejected() {
    let err = LruCache::<String, i32>::try_new(0).unwrap_err();
    assert!(err.message().contains("capacity"));
    assert!(LruCacheConfig::try_new(0).is_err());
    assert!(LruCache::<String, i32>::try_new(1).is_ok());
}

// ============================================================================
// REFERENCE SCENARIO
// ============================================================================

#[test]
fn test_lru_company_division_course_scenario() {
    let mut cache: LruCache<&str, String> = make_lru(3);

    cache.put("company", "Yandex".to_string());
    cache.put("division", "Yandex Lyceum".to_string());
    cache.put("course", "Golang".to_string());
    assert_eq!(
        cache.snapshot().to_string(),
        "LRU Cache (Capacity: 3, Size: 3): [(course: Golang) (division: Yandex Lyceum) (company: Yandex)]"
    );

    assert_eq!(cache.get(&"company").map(String::as_str), Some("Yandex"));
    assert_eq!(keys(&cache), vec!["company", "course", "division"]);

    let evicted = cache.put("year", "2024".to_string());
    assert_eq!(evicted, Some(("division", "Yandex Lyceum".to_string())));

    let evicted = cache.put("age", "13-17yrs".to_string());
    assert_eq!(evicted, Some(("course", "Golang".to_string())));

    assert_eq!(
        cache.snapshot().to_string(),
        "LRU Cache (Capacity: 3, Size: 3): [(age: 13-17yrs) (year: 2024) (company: Yandex)]"
    );
    cache.check_invariants().unwrap();
}

// ============================================================================
// MISSES, TOUCHES AND REMOVAL
// ============================================================================

#[test]
fn test_lru_miss_leaves_state_unchanged() {
    let mut cache = make_lru(3);
    cache.put(1, 10);
    cache.put(2, 20);

    let before = keys(&cache);
    assert_eq!(cache.get(&99), None);
    assert_eq!(keys(&cache), before);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_lru_get_of_evicted_key_leaves_state_unchanged() {
    let mut cache = make_lru(2);
    cache.put(1, 10);
    cache.put(2, 20);
    assert_eq!(cache.put(3, 30), Some((1, 10)));

    let before = keys(&cache);
    assert_eq!(cache.get(&1), None);
    assert_eq!(keys(&cache), before);
    assert_eq!(before, vec![3, 2]);
    assert_eq!(cache.len(), 2);

    // The miss did not refresh anything: 2 is still next out
    assert_eq!(cache.put(4, 40), Some((2, 20)));
}

#[test]
fn test_lru_repeated_get_is_idempotent() {
    let mut cache = make_lru(3);
    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);

    cache.get(&2);
    let once = keys(&cache);
    cache.get(&2);
    cache.get(&2);
    assert_eq!(keys(&cache), once);
    assert_eq!(once, vec![2, 3, 1]);
}

#[test]
fn test_lru_remove_frees_a_slot() {
    let mut cache = make_lru(3);
    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);

    assert_eq!(cache.remove(&2), Some(20));
    assert_eq!(cache.remove(&2), None);

    // A slot is free, so nothing is evicted
    assert_eq!(cache.put(4, 40), None);
    assert_eq!(keys(&cache), vec![4, 3, 1]);
    cache.check_invariants().unwrap();
}

#[test]
fn test_lru_clear_then_reuse() {
    let mut cache = make_lru(2);
    cache.put(1, 10);
    cache.put(2, 20);
    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.put(3, 30), None);
    assert_eq!(cache.put(4, 40), None);
    assert_eq!(cache.put(5, 50), Some((3, 30)));
}

#[test]
fn test_lru_metrics_track_operations() {
    let mut cache = make_lru(2);
    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(1, 11);
    cache.put(3, 30);
    cache.get(&1);
    cache.get(&2);
    cache.remove(&1);

    let metrics = cache.metrics();
    assert_eq!(metrics["requests"], 2.0);
    assert_eq!(metrics["cache_hits"], 1.0);
    assert_eq!(metrics["cache_misses"], 1.0);
    assert_eq!(metrics["insertions"], 3.0);
    assert_eq!(metrics["updates"], 1.0);
    assert_eq!(metrics["evictions"], 1.0);
    assert_eq!(metrics["removals"], 1.0);
    assert_eq!(metrics["capacity"], 2.0);
    assert_eq!(cache.algorithm_name(), "LRU");
}

// ============================================================================
// REFERENCE MODEL
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Put(u8, u32),
    Get(u8),
    Peek(u8),
    Remove(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..24, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        (0u8..24).prop_map(Op::Get),
        (0u8..24).prop_map(Op::Peek),
        (0u8..24).prop_map(Op::Remove),
    ]
}

proptest! {
    /// Replays random operations against a `Vec` kept in recency order
    /// (front is MRU) and compares every result and the full order.
    #[test]
    fn prop_lru_matches_reference_model(
        capacity in 1usize..16,
        ops in prop::collection::vec(op_strategy(), 0..200)
    ) {
        let mut cache = make_lru(capacity);
        let mut model: Vec<(u8, u32)> = Vec::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    let expected = match model.iter().position(|(mk, _)| *mk == k) {
                        Some(pos) => Some(model.remove(pos)),
                        None if model.len() == capacity => model.pop(),
                        None => None,
                    };
                    model.insert(0, (k, v));
                    prop_assert_eq!(cache.put(k, v), expected);
                }
                Op::Get(k) => {
                    let expected = model.iter().position(|(mk, _)| *mk == k).map(|pos| {
                        let entry = model.remove(pos);
                        model.insert(0, entry);
                        entry.1
                    });
                    prop_assert_eq!(cache.get(&k).copied(), expected);
                }
                Op::Peek(k) => {
                    let expected = model.iter().find(|(mk, _)| *mk == k).map(|(_, v)| *v);
                    prop_assert_eq!(cache.peek(&k).copied(), expected);
                }
                Op::Remove(k) => {
                    let expected = model
                        .iter()
                        .position(|(mk, _)| *mk == k)
                        .map(|pos| model.remove(pos).1);
                    prop_assert_eq!(cache.remove(&k), expected);
                }
            }

            prop_assert!(cache.len() <= capacity);
            prop_assert_eq!(
                cache.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
                model.clone()
            );
            prop_assert!(cache.check_invariants().is_ok());
        }
    }
}
