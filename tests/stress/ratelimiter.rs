//! Rate limiter stress tests

use pricewatch_core::MockClock;
use pricewatch_ratelimiter::RateLimiter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Test: concurrent requests from one client never exceed the limit
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_single_client_exact_admission() {
    let clock = MockClock::new();
    let limiter = RateLimiter::builder().clock(Arc::new(clock)).build();
    let admitted = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let mut handles = Vec::new();
    for _ in 0..64 {
        let limiter = limiter.clone();
        let admitted = Arc::clone(&admitted);
        handles.push(tokio::spawn(async move {
            for _ in 0..1_000 {
                if limiter.check_and_record("hot-client", 500) {
                    admitted.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    println!("64k checks in {:?}", start.elapsed());
    assert_eq!(admitted.load(Ordering::Relaxed), 500);
}

/// Test: many distinct clients tracked at once
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_many_clients() {
    let limiter = RateLimiter::builder().build();

    let mut handles = Vec::new();
    for shard in 0..16 {
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..5_000 {
                let client = format!("client-{shard}-{i}");
                assert!(limiter.check_and_record(&client, 1));
                assert!(!limiter.check_and_record(&client, 1));
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(limiter.tracked_clients(), 80_000);
}
