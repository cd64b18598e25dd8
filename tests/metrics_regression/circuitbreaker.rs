//! Series recorded by the per-dependency circuit breakers.

use super::helpers::*;
use pricewatch_circuitbreaker::CircuitBreakerRegistry;
use serial_test::serial;

#[test]
#[serial]
fn circuitbreaker_call_metrics_exist() {
    init_recorder();

    let registry = CircuitBreakerRegistry::builder()
        .failure_threshold(2)
        .build();

    assert!(registry.can_execute("metrics_store").allowed);
    registry.report("metrics_store", true);
    registry.report("metrics_store", false);
    registry.report("metrics_store", false);
    assert!(!registry.can_execute("metrics_store").allowed);

    assert_counter_exists("circuitbreaker_calls_total");
    assert_metric_has_label("circuitbreaker_calls_total", "circuitbreaker", "metrics_store");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "permitted");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "success");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "failure");
    assert_metric_has_label("circuitbreaker_calls_total", "outcome", "rejected");
}

#[test]
#[serial]
fn circuitbreaker_transition_metrics_exist() {
    init_recorder();

    let registry = CircuitBreakerRegistry::builder()
        .failure_threshold(1)
        .build();

    registry.report("transition_store", false);

    assert_counter_exists("circuitbreaker_transitions_total");
    assert_metric_has_label(
        "circuitbreaker_transitions_total",
        "circuitbreaker",
        "transition_store",
    );
    assert_metric_has_label("circuitbreaker_transitions_total", "from", "closed");
    assert_metric_has_label("circuitbreaker_transitions_total", "to", "open");

    assert_gauge_exists("circuitbreaker_state");
    assert_metric_has_label("circuitbreaker_state", "circuitbreaker", "transition_store");
}
