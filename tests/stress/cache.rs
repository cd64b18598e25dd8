//! Response cache stress tests

use pricewatch_cache::ResponseCache;
use std::time::{Duration, Instant};

/// Test: concurrent writers never push the cache past capacity
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_concurrent_puts_stay_bounded() {
    let cache: ResponseCache<u64> = ResponseCache::builder()
        .capacity(500)
        .eviction_batch(50)
        .build();

    let start = Instant::now();
    let mut handles = Vec::new();
    for writer in 0..16u64 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..10_000u64 {
                cache.put(format!("list_products:{writer}:{i}"), i, Duration::from_secs(60));
                assert!(cache.len() <= 500);
                let _ = cache.get(format!("list_products:{writer}:{}", i / 2));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    println!("160k puts in {:?}", start.elapsed());
    assert!(cache.len() <= 500);
}

/// Test: invalidation racing with writers leaves no matching survivors once
/// writers stop
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_invalidation_under_writes() {
    let cache: ResponseCache<u64> = ResponseCache::builder().capacity(10_000).build();

    let mut handles = Vec::new();
    for writer in 0..8u64 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..2_000u64 {
                cache.put(format!("list_alerts:{writer}:{i}"), i, Duration::from_secs(60));
            }
        }));
    }
    let invalidator = {
        let cache = cache.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                cache.invalidate_by_prefix("list_alerts");
                tokio::task::yield_now().await;
            }
        })
    };

    for handle in handles {
        handle.await.unwrap();
    }
    invalidator.await.unwrap();

    cache.invalidate_by_prefix("list_alerts");
    assert!(cache.is_empty());
}
