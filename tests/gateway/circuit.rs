//! Circuit breaking of failing dependencies.

use super::{instrumented, Signals};
use pricewatch_circuitbreaker::{CircuitState, HalfOpenPolicy};
use pricewatch_core::{CallError, MockClock};
use pricewatch_gateway::{GatewayRequest, ResilienceGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn single_attempt_gateway(clock: &MockClock, signals: &Signals) -> ResilienceGateway<String> {
    instrumented(clock, signals)
        .executor(|e| e.max_retries(1))
        .build()
}

async fn failing_call(
    gateway: &ResilienceGateway<String>,
    calls: &Arc<AtomicUsize>,
) -> pricewatch_core::ResilienceError {
    let c = Arc::clone(calls);
    gateway
        .call(&GatewayRequest::new("list_products", "c1"), move || {
            c.fetch_add(1, Ordering::SeqCst);
            async { Err::<String, _>(CallError::status(503, "maintenance")) }
        })
        .await
        .unwrap_err()
}

#[tokio::test(start_paused = true)]
async fn fourth_call_after_three_failures_is_rejected_without_io() {
    let clock = MockClock::new();
    let signals = Signals::default();
    let gateway = single_attempt_gateway(&clock, &signals);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let err = failing_call(&gateway, &calls).await;
        assert!(err.is_transient_failure());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(gateway.breakers().state("record_store"), CircuitState::Open);

    let err = failing_call(&gateway, &calls).await;

    assert!(err.is_dependency_unavailable());
    assert_eq!(err.status_code(), 503);
    assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(signals.outcomes(), vec![false, false, false]);
    assert_eq!(signals.rejections(), 1);

    // The rejected request still counts as a failed request.
    assert_eq!(gateway.snapshot().metrics.error, 4);
}

#[tokio::test(start_paused = true)]
async fn cooldown_half_opens_and_success_closes() {
    let clock = MockClock::new();
    let signals = Signals::default();
    let gateway = single_attempt_gateway(&clock, &signals);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        failing_call(&gateway, &calls).await;
    }

    clock.advance(Duration::from_secs(29));
    assert!(failing_call(&gateway, &calls)
        .await
        .is_dependency_unavailable());

    clock.advance(Duration::from_secs(1));
    let value = gateway
        .call(&GatewayRequest::new("list_products", "c1"), || async {
            Ok::<_, CallError>("recovered".to_string())
        })
        .await
        .unwrap();

    assert_eq!(value, "recovered");
    let snapshot = gateway.snapshot();
    let circuit = snapshot.circuit("record_store").unwrap();
    assert_eq!(circuit.state, CircuitState::Closed);
    assert_eq!(circuit.consecutive_failures, 0);
}

#[tokio::test(start_paused = true)]
async fn failed_probe_reopens_the_circuit() {
    let clock = MockClock::new();
    let signals = Signals::default();
    let gateway = single_attempt_gateway(&clock, &signals);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        failing_call(&gateway, &calls).await;
    }
    clock.advance(Duration::from_secs(30));

    assert!(failing_call(&gateway, &calls).await.is_transient_failure());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(gateway.breakers().state("record_store"), CircuitState::Open);
    assert_eq!(
        gateway.snapshot().open_circuits().collect::<Vec<_>>(),
        vec!["record_store"]
    );

    // A new cooldown started at the failed probe.
    clock.advance(Duration::from_secs(10));
    assert!(failing_call(&gateway, &calls)
        .await
        .is_dependency_unavailable());
}

#[tokio::test(start_paused = true)]
async fn dependencies_have_separate_circuits() {
    let clock = MockClock::new();
    let signals = Signals::default();
    let gateway = single_attempt_gateway(&clock, &signals);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        failing_call(&gateway, &calls).await;
    }

    let scrape = GatewayRequest::new("scrape", "c1").dependency("scraper");
    let value = gateway
        .call(&scrape, || async { Ok::<_, CallError>("scraped".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "scraped");

    let snapshot = gateway.snapshot();
    assert_eq!(snapshot.circuits.len(), 2);
    assert_eq!(snapshot.circuits[0].dependency, "record_store");
    assert_eq!(snapshot.circuits[0].state, CircuitState::Open);
    assert_eq!(snapshot.circuits[1].dependency, "scraper");
    assert_eq!(snapshot.circuits[1].state, CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn single_probe_policy_admits_one_caller_while_half_open() {
    let clock = MockClock::new();
    let gateway: ResilienceGateway<String> = instrumented(&clock, &Signals::default())
        .circuit_breaker(|b| b.half_open_policy(HalfOpenPolicy::SingleProbe))
        .executor(|e| e.max_retries(1))
        .build();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        failing_call(&gateway, &calls).await;
    }
    clock.advance(Duration::from_secs(30));

    let (release, wait) = tokio::sync::oneshot::channel::<()>();
    let probe_gateway = gateway.clone();
    let probe = tokio::spawn(async move {
        let mut wait = Some(wait);
        probe_gateway
            .call(&GatewayRequest::new("list_products", "c1"), move || {
                let wait = wait.take();
                async move {
                    if let Some(wait) = wait {
                        let _ = wait.await;
                    }
                    Ok::<_, CallError>("probe".to_string())
                }
            })
            .await
    });
    tokio::task::yield_now().await;

    let err = failing_call(&gateway, &calls).await;
    assert!(err.is_dependency_unavailable());

    release.send(()).unwrap();
    assert_eq!(probe.await.unwrap().unwrap(), "probe");
    assert_eq!(gateway.breakers().state("record_store"), CircuitState::Closed);
}
