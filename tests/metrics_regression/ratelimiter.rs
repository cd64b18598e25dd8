//! Series recorded by the sliding-window rate limiter.

use super::helpers::*;
use pricewatch_ratelimiter::RateLimiter;
use serial_test::serial;

#[test]
#[serial]
fn ratelimiter_metrics_exist() {
    init_recorder();

    let limiter = RateLimiter::builder().name("test_ratelimiter").build();

    assert!(limiter.check_and_record("client-1", 1));
    assert!(!limiter.check_and_record("client-1", 1));

    assert_counter_exists("ratelimiter_calls_total");
    assert_metric_has_label("ratelimiter_calls_total", "ratelimiter", "test_ratelimiter");
    assert_metric_has_label("ratelimiter_calls_total", "result", "permitted");
    assert_metric_has_label("ratelimiter_calls_total", "result", "rejected");

    assert_gauge_exists("ratelimiter_tracked_windows");
    assert_metric_has_label(
        "ratelimiter_tracked_windows",
        "ratelimiter",
        "test_ratelimiter",
    );
}
