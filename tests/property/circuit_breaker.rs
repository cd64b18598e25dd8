//! Property tests for the circuit breaker registry.
//!
//! Invariants tested:
//! - a circuit is open exactly when the trailing run of failures reaches the
//!   threshold
//! - an open circuit refuses calls until the cooldown elapses

use pricewatch_circuitbreaker::{CircuitBreakerRegistry, CircuitState};
use pricewatch_core::MockClock;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: with a frozen clock, state follows the consecutive-failure count
    #[test]
    fn state_follows_consecutive_failures(
        threshold in 1u32..6,
        outcomes in prop::collection::vec(any::<bool>(), 1..60),
    ) {
        let clock = MockClock::new();
        let registry = CircuitBreakerRegistry::builder()
            .failure_threshold(threshold)
            .clock(Arc::new(clock.clone()))
            .build();

        let mut open = false;
        let mut run = 0u32;

        for success in outcomes {
            let permission = registry.can_execute("dep");
            prop_assert_eq!(permission.allowed, !open);
            if !permission.allowed {
                // Frozen clock: nothing more can happen.
                break;
            }

            registry.report("dep", success);
            if success {
                run = 0;
            } else {
                run += 1;
                open = run >= threshold;
            }

            let snapshot = registry.snapshot("dep").unwrap();
            prop_assert_eq!(snapshot.consecutive_failures, run);
            let expected = if open { CircuitState::Open } else { CircuitState::Closed };
            prop_assert_eq!(snapshot.state, expected);
        }
    }

    /// Property: an open circuit admits calls exactly once the cooldown has passed
    #[test]
    fn cooldown_gates_half_open(cooldown_ms in 1u64..10_000, waited_ms in 0u64..20_000) {
        let clock = MockClock::new();
        let registry = CircuitBreakerRegistry::builder()
            .failure_threshold(1)
            .cooldown(Duration::from_millis(cooldown_ms))
            .clock(Arc::new(clock.clone()))
            .build();

        registry.report("dep", false);
        clock.advance(Duration::from_millis(waited_ms));

        let permission = registry.can_execute("dep");
        prop_assert_eq!(permission.allowed, waited_ms >= cooldown_ms);
        if permission.allowed {
            prop_assert_eq!(registry.state("dep"), CircuitState::HalfOpen);
        } else {
            prop_assert_eq!(
                permission.retry_after,
                Some(Duration::from_millis(cooldown_ms - waited_ms))
            );
        }
    }
}
