//! Property tests for the response cache.
//!
//! Invariants tested:
//! - `get` returns the most recent `put` while its TTL lasts, and nothing after
//! - the cache never holds more than `capacity` entries
//! - key normalization ignores parameter order

use pricewatch_cache::{CacheKey, ResponseCache};
use pricewatch_core::MockClock;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    Put { key: u8, value: u32, ttl_ms: u64 },
    Get { key: u8 },
    Advance { ms: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..8, any::<u32>(), 1u64..5_000).prop_map(|(key, value, ttl_ms)| Op::Put {
            key,
            value,
            ttl_ms
        }),
        (0u8..8).prop_map(|key| Op::Get { key }),
        (0u64..3_000).prop_map(|ms| Op::Advance { ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: get(k) returns the latest put(k, v, ttl) iff now < stored_at + ttl
    #[test]
    fn get_matches_latest_unexpired_put(ops in prop::collection::vec(op(), 1..80)) {
        let clock = MockClock::new();
        let cache: ResponseCache<u32> = ResponseCache::builder()
            .capacity(1_000)
            .clock(Arc::new(clock.clone()))
            .build();

        // key -> (value, stored_at_ms, ttl_ms)
        let mut model: HashMap<u8, (u32, u64, u64)> = HashMap::new();
        let mut now_ms = 0u64;

        for op in ops {
            match op {
                Op::Put { key, value, ttl_ms } => {
                    cache.put(key.to_string(), value, Duration::from_millis(ttl_ms));
                    model.insert(key, (value, now_ms, ttl_ms));
                }
                Op::Get { key } => {
                    let expected = model
                        .get(&key)
                        .filter(|(_, stored_at, ttl)| now_ms < stored_at + ttl)
                        .map(|(value, _, _)| *value);
                    prop_assert_eq!(cache.get(key.to_string()), expected);
                }
                Op::Advance { ms } => {
                    clock.advance(Duration::from_millis(ms));
                    now_ms += ms;
                }
            }
        }
    }

    /// Property: the number of entries never exceeds capacity
    #[test]
    fn size_never_exceeds_capacity(
        capacity in 1usize..40,
        batch in 1usize..40,
        keys in prop::collection::vec(0u16..200, 1..300),
    ) {
        let cache: ResponseCache<u16> = ResponseCache::builder()
            .capacity(capacity)
            .eviction_batch(batch)
            .build();

        for key in keys {
            cache.put(key.to_string(), key, Duration::from_secs(60));
            prop_assert!(cache.len() <= capacity, "len {} > capacity {}", cache.len(), capacity);
            prop_assert_eq!(cache.get(key.to_string()), Some(key));
        }
    }

    /// Property: parameter order never changes the key
    #[test]
    fn key_ignores_parameter_order(
        params in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..6),
    ) {
        let forward: Vec<(String, String)> = params.clone().into_iter().collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        prop_assert_eq!(
            CacheKey::new("list_products", forward),
            CacheKey::new("list_products", reversed)
        );
    }
}
