//! Series recorded by the retrying executor.

use super::helpers::*;
use pricewatch_circuitbreaker::CircuitBreakerRegistry;
use pricewatch_core::CallError;
use pricewatch_executor::ResilientExecutor;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
#[serial]
async fn executor_metrics_exist() {
    init_recorder();

    let executor = ResilientExecutor::builder()
        .name("test_executor")
        .max_retries(3)
        .base_delay(Duration::from_millis(10))
        .max_jitter(Duration::ZERO)
        .build(CircuitBreakerRegistry::builder().failure_threshold(10).build());

    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let result = executor
        .execute("scraper", move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(CallError::status(503, "unavailable"))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
    assert!(result.is_ok());

    let result: Result<(), _> = executor
        .execute("scraper", || async { Err(CallError::status(404, "missing")) })
        .await;
    assert!(result.is_err());

    assert_counter_exists("executor_calls_total");
    assert_metric_has_label("executor_calls_total", "executor", "test_executor");
    assert_metric_has_label("executor_calls_total", "dependency", "scraper");
    assert_metric_has_label("executor_calls_total", "result", "success");
    assert_metric_has_label("executor_calls_total", "result", "failure");

    assert_counter_exists("executor_attempts_total");
    assert_metric_has_label("executor_attempts_total", "outcome", "transient");
    assert_metric_has_label("executor_attempts_total", "outcome", "permanent");
    assert_metric_has_label("executor_attempts_total", "outcome", "success");

    assert_counter_exists("executor_retries_total");
    assert_metric_has_label("executor_retries_total", "executor", "test_executor");
}

#[tokio::test(start_paused = true)]
#[serial]
async fn executor_rejection_metrics() {
    init_recorder();

    let breakers = CircuitBreakerRegistry::builder().failure_threshold(1).build();
    breakers.report("open_dependency", false);

    let executor = ResilientExecutor::builder()
        .name("rejecting_executor")
        .build(breakers);

    let result: Result<(), _> = executor
        .execute("open_dependency", || async { Ok(()) })
        .await;
    assert!(result.is_err());

    assert_metric_has_label("executor_calls_total", "executor", "rejecting_executor");
    assert_metric_has_label("executor_calls_total", "result", "rejected");
}
