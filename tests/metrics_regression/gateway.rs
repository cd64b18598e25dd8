//! Series recorded by the gateway itself.

use super::helpers::*;
use pricewatch_gateway::{CallError, GatewayRequest, OperationProfile, ResilienceGateway};
use serial_test::serial;
use std::time::Duration;

#[tokio::test(start_paused = true)]
#[serial]
async fn gateway_request_metrics_exist() {
    init_recorder();

    let gateway = ResilienceGateway::builder()
        .name("test_gateway")
        .operation(
            "list_products",
            OperationProfile::read(1, Duration::from_secs(60)),
        )
        .build();

    let request = GatewayRequest::new("list_products", "client-1");
    let _ = gateway
        .call(&request, || async { Ok::<_, CallError>(1u32) })
        .await;
    // Over the limit of one per window
    let _ = gateway
        .call(&request, || async { Ok::<_, CallError>(1u32) })
        .await;
    // Another client reads the cached page
    let _ = gateway
        .call(&GatewayRequest::new("list_products", "client-2"), || async {
            Ok::<_, CallError>(1u32)
        })
        .await;

    assert_counter_exists("gateway_requests_total");
    assert_metric_has_label("gateway_requests_total", "gateway", "test_gateway");
    assert_metric_has_label("gateway_requests_total", "operation", "list_products");
    assert_metric_has_label("gateway_requests_total", "result", "success");
    assert_metric_has_label("gateway_requests_total", "result", "rate_limited");
    assert_metric_has_label("gateway_requests_total", "result", "cache_hit");

    assert_histogram_exists("gateway_request_duration_seconds");
    assert_metric_has_label(
        "gateway_request_duration_seconds",
        "operation",
        "list_products",
    );
}

#[tokio::test(start_paused = true)]
#[serial]
async fn gateway_error_and_invalidation_metrics() {
    init_recorder();

    let gateway = ResilienceGateway::builder()
        .name("writes_gateway")
        .executor(|e| e.max_retries(1))
        .operation(
            "list_alerts",
            OperationProfile::read(100, Duration::from_secs(60)),
        )
        .operation("create_alert", OperationProfile::write(100, ["list_alerts"]))
        .build();

    let _ = gateway
        .call(&GatewayRequest::new("list_alerts", "client-1"), || async {
            Ok::<_, CallError>(0u32)
        })
        .await;
    let _ = gateway
        .call(&GatewayRequest::new("create_alert", "client-1"), || async {
            Ok::<_, CallError>(1u32)
        })
        .await;
    let _ = gateway
        .call(&GatewayRequest::new("create_alert", "client-1"), || async {
            Err::<u32, _>(CallError::validation("price must be positive"))
        })
        .await;

    assert_counter_exists("gateway_invalidations_total");
    assert_metric_has_label("gateway_invalidations_total", "gateway", "writes_gateway");
    assert_metric_has_label("gateway_invalidations_total", "operation", "create_alert");
    assert_metric_has_label("gateway_requests_total", "result", "permanent_failure");

    // Component metrics carry the gateway's name
    assert_metric_has_label("cache_requests_total", "cache", "writes_gateway");
    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "writes_gateway");
    assert_metric_has_label("executor_calls_total", "executor", "writes_gateway");
}
