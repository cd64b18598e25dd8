//! Property tests for health scoring.
//!
//! Invariants tested:
//! - the composite score stays within 0..=100 for any weights and scores
//! - status never claims more health than the components allow

use pricewatch_health::{
    compute_health_score, determine_status, ComponentHealth, Components, HealthStatus,
    HealthWeights, RequestMetrics,
};
use proptest::prelude::*;

fn component() -> impl Strategy<Value = ComponentHealth> {
    (0u8..3, 0u8..=100).prop_map(|(status, score)| match status {
        0 => ComponentHealth::healthy(),
        1 => ComponentHealth::degraded(score),
        _ => ComponentHealth::unhealthy(score),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn score_is_bounded(
        entries in prop::collection::vec(("[a-f]", component(), 0.0f64..2.0), 0..6),
    ) {
        let mut components = Components::new();
        let mut weights = HealthWeights::empty();
        for (name, health, weight) in entries {
            components.insert(name.clone(), health);
            weights = weights.with_weight(name, weight);
        }

        let score = compute_health_score(&components, &weights);
        prop_assert!(score <= 100);

        let status = determine_status(score, &components);
        if components.values().any(|c| c.status == HealthStatus::Unhealthy) {
            prop_assert_eq!(status, HealthStatus::Unhealthy);
        }
        if status == HealthStatus::Healthy {
            prop_assert!(score >= 90);
        }
    }

    #[test]
    fn snapshot_counts_are_consistent(outcomes in prop::collection::vec((any::<bool>(), 0.0f64..10_000.0), 0..100)) {
        let metrics = RequestMetrics::default();
        for (success, latency) in &outcomes {
            metrics.record_outcome(*success, *latency);
        }

        let snapshot = metrics.snapshot();
        prop_assert_eq!(snapshot.total, outcomes.len() as u64);
        prop_assert_eq!(snapshot.total, snapshot.success + snapshot.error);
        prop_assert!(snapshot.average_response_time_ms >= 0.0);
        prop_assert!(snapshot.average_response_time_ms <= 10_000.0);
    }
}
