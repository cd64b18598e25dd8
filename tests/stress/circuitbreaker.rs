//! Circuit breaker stress tests

use pricewatch_circuitbreaker::{CircuitBreakerRegistry, CircuitState, HalfOpenPolicy};
use pricewatch_core::MockClock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Test: concurrent failures open the circuit exactly once
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_concurrent_failures_open_once() {
    let opened = Arc::new(AtomicUsize::new(0));
    let o = Arc::clone(&opened);
    let registry = CircuitBreakerRegistry::builder()
        .failure_threshold(3)
        .on_state_transition(move |_dependency, _from, to| {
            if to == CircuitState::Open {
                o.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..100 {
                registry.report("record_store", false);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.state("record_store"), CircuitState::Open);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
}

/// Test: a single-probe circuit admits exactly one concurrent probe
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_single_probe_admits_one() {
    let clock = MockClock::new();
    let registry = CircuitBreakerRegistry::builder()
        .failure_threshold(1)
        .cooldown(Duration::from_secs(30))
        .half_open_policy(HalfOpenPolicy::SingleProbe)
        .clock(Arc::new(clock.clone()))
        .build();

    registry.report("scraper", false);
    clock.advance(Duration::from_secs(30));

    let admitted = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();
    for _ in 0..64 {
        let registry = registry.clone();
        let admitted = Arc::clone(&admitted);
        handles.push(tokio::spawn(async move {
            if registry.can_execute("scraper").allowed {
                admitted.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 1);
}
