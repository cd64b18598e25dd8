//! The gateway as a tower service in front of a record store.

use pricewatch_core::{CallError, MockClock};
use pricewatch_gateway::{
    GatewayLayer, GatewayRequest, OperationProfile, Record, RecordPage, RecordQuery,
    ResilienceGateway,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{service_fn, Layer, Service, ServiceBuilder, ServiceExt};

fn product(sku: &str, price: &str) -> Record {
    let mut row = Record::new();
    row.insert("sku".into(), sku.into());
    row.insert("price".into(), price.into());
    row
}

#[tokio::test(start_paused = true)]
async fn flaky_record_store_is_retried_and_cached() {
    let clock = MockClock::new();
    let gateway = ResilienceGateway::builder()
        .clock(Arc::new(clock.clone()))
        .operation(
            "list_products",
            OperationProfile::read(300, Duration::from_secs(60)),
        )
        .build();

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let record_store = service_fn(move |query: RecordQuery| {
        let n = c.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                return Err(CallError::status(503, "warming up"));
            }
            let store = query.params.get("store").cloned().unwrap_or_default();
            Ok(RecordPage::new(vec![product(&format!("{store}-1"), "9.99")], 1))
        }
    });

    let mut service = ServiceBuilder::new()
        .layer(GatewayLayer::new(gateway.clone()))
        .service(record_store);

    let request = GatewayRequest::new("list_products", "client-1").param("store", "42");
    let first = service.ready().await.unwrap().call(request.clone()).await.unwrap();
    let second = service.ready().await.unwrap().call(request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.rows[0]["sku"], "42-1");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let metrics = gateway.snapshot().metrics;
    assert_eq!(metrics.total, 1);
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.cache_hit_rate(), 0.5);
}

#[tokio::test(start_paused = true)]
async fn rejected_requests_never_reach_the_record_store() {
    let gateway = ResilienceGateway::builder()
        .operation("sync_prices", OperationProfile::write(1, ["list_products"]))
        .build();

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let record_store = service_fn(move |_query: RecordQuery| {
        c.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, CallError>(RecordPage::default()) }
    });

    let service = GatewayLayer::new(gateway).layer(record_store);
    let request = GatewayRequest::new("sync_prices", "client-1");

    service.clone().oneshot(request.clone()).await.unwrap();
    let err = service.oneshot(request).await.unwrap_err();

    assert!(err.is_rate_limited());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
