//! Series recorded by the response cache.

use super::helpers::*;
use pricewatch_cache::ResponseCache;
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn cache_request_metrics_exist() {
    init_recorder();

    let cache: ResponseCache<&'static str> = ResponseCache::builder().name("test_cache").build();

    // Miss, then hit
    assert!(cache.get("list_products").is_none());
    cache.put("list_products", "page", Duration::from_secs(60));
    assert!(cache.get("list_products").is_some());

    assert_counter_exists("cache_requests_total");
    assert_metric_has_label("cache_requests_total", "cache", "test_cache");
    assert_metric_has_label("cache_requests_total", "result", "hit");
    assert_metric_has_label("cache_requests_total", "result", "miss");

    assert_gauge_exists("cache_size");
    assert_metric_has_label("cache_size", "cache", "test_cache");
}

#[test]
#[serial]
fn cache_eviction_metrics() {
    init_recorder();

    let cache: ResponseCache<u64> = ResponseCache::builder()
        .name("eviction_cache")
        .capacity(2)
        .eviction_batch(1)
        .build();

    for i in 0..5u64 {
        cache.put(format!("key:{i}"), i, Duration::from_secs(60));
    }

    assert_counter_exists("cache_evictions_total");
    assert_metric_has_label("cache_evictions_total", "cache", "eviction_cache");
}
