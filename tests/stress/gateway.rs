//! Gateway stress tests

use pricewatch_gateway::{CallError, GatewayRequest, OperationProfile, ResilienceGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Test: many clients hammering a cached read
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_cached_reads() {
    let gateway = ResilienceGateway::builder()
        .operation(
            "list_products",
            OperationProfile::read(1_000, Duration::from_secs(300)),
        )
        .build();
    let backend_calls = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();
    let mut handles = Vec::new();
    for client in 0..100 {
        let gateway = gateway.clone();
        let backend_calls = Arc::clone(&backend_calls);
        handles.push(tokio::spawn(async move {
            let request = GatewayRequest::new("list_products", format!("client-{client}"))
                .param("store", (client % 10).to_string());
            for _ in 0..1_000 {
                let calls = Arc::clone(&backend_calls);
                let result = gateway
                    .call(&request, move || {
                        calls.fetch_add(1, Ordering::Relaxed);
                        async { Ok::<_, CallError>(42u32) }
                    })
                    .await;
                assert_eq!(result.unwrap(), 42);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = gateway.snapshot();
    println!("100k gateway calls in {:?}", start.elapsed());
    println!("Backend calls: {}", backend_calls.load(Ordering::Relaxed));
    println!("Cache hit rate: {:.3}", snapshot.metrics.cache_hit_rate());

    assert_eq!(snapshot.metrics.total + snapshot.metrics.cache_hits, 100_000);
    assert_eq!(snapshot.metrics.total, snapshot.metrics.success);
    assert_eq!(snapshot.tracked_clients, 100);
}
