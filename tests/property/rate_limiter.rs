//! Property tests for the sliding-window rate limiter.
//!
//! Invariants tested:
//! - admission matches an exact sliding-window model
//! - no window of `window` length ever contains more than `limit` admissions

use pricewatch_core::MockClock;
use pricewatch_ratelimiter::RateLimiter;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const WINDOW_MS: u64 = 1_000;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: check_and_record agrees with a model of retained timestamps
    #[test]
    fn admission_matches_sliding_window_model(
        limit in 1usize..10,
        gaps in prop::collection::vec(0u64..400, 1..120),
    ) {
        let clock = MockClock::new();
        let limiter = RateLimiter::builder()
            .window(Duration::from_millis(WINDOW_MS))
            .clock(Arc::new(clock.clone()))
            .build();

        let mut retained: Vec<u64> = Vec::new();
        let mut admitted: Vec<u64> = Vec::new();
        let mut now = 0u64;

        for gap in gaps {
            clock.advance(Duration::from_millis(gap));
            now += gap;

            retained.retain(|t| now - t < WINDOW_MS);
            let expected = retained.len() < limit;
            if expected {
                retained.push(now);
                admitted.push(now);
            }

            prop_assert_eq!(limiter.check_and_record("client", limit), expected);
        }

        // Every window anchored at an admission holds at most `limit` of them.
        for (i, start) in admitted.iter().enumerate() {
            let in_window = admitted[i..]
                .iter()
                .take_while(|t| **t - start < WINDOW_MS)
                .count();
            prop_assert!(in_window <= limit, "{} admissions in one window, limit {}", in_window, limit);
        }
    }

    /// Property: clients never share a budget
    #[test]
    fn clients_are_isolated(limit in 1usize..20, clients in 1usize..8) {
        let clock = MockClock::new();
        let limiter = RateLimiter::builder()
            .clock(Arc::new(clock.clone()))
            .build();

        for client in 0..clients {
            let id = format!("client-{client}");
            let admitted = (0..limit * 2)
                .filter(|_| limiter.check_and_record(&id, limit))
                .count();
            prop_assert_eq!(admitted, limit);
        }
        prop_assert_eq!(limiter.tracked_clients(), clients);
    }
}
