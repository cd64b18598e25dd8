//! Scorers turning raw observations into [`ComponentHealth`].
//!
//! The checks themselves (pinging the record store, reading process memory)
//! live outside this crate; these functions only grade what they saw.

use crate::metrics::MetricsSnapshot;
use crate::score::ComponentHealth;
use pricewatch_circuitbreaker::{CircuitSnapshot, CircuitState};
use std::time::Duration;

/// Grades a reachability check (database, scraper, external services).
///
/// Unreachable is unhealthy; a reachable dependency degrades past one second
/// and again past three.
pub fn check_reachability(reachable: bool, latency: Option<Duration>) -> ComponentHealth {
    if !reachable {
        return ComponentHealth::unhealthy(0).with_message("unreachable");
    }
    match latency {
        Some(l) if l > Duration::from_secs(3) => ComponentHealth::degraded(50)
            .with_message(format!("very slow response ({} ms)", l.as_millis())),
        Some(l) if l > Duration::from_secs(1) => ComponentHealth::degraded(70)
            .with_message(format!("slow response ({} ms)", l.as_millis())),
        _ => ComponentHealth::healthy(),
    }
}

/// Grades cache utilisation. A full cache still works, so this never
/// reports unhealthy.
pub fn check_cache(size: usize, capacity: usize) -> ComponentHealth {
    if capacity == 0 {
        return ComponentHealth::healthy();
    }
    let utilisation = size as f64 / capacity as f64;
    if utilisation > 0.95 {
        ComponentHealth::degraded(60).with_message(format!("cache at {size}/{capacity} entries"))
    } else if utilisation > 0.8 {
        ComponentHealth::degraded(80).with_message(format!("cache at {size}/{capacity} entries"))
    } else {
        ComponentHealth::healthy()
    }
}

/// Grades memory pressure. An unknown limit (zero) is treated as healthy.
pub fn check_memory(used_bytes: u64, limit_bytes: u64) -> ComponentHealth {
    if limit_bytes == 0 {
        return ComponentHealth::healthy();
    }
    let utilisation = used_bytes as f64 / limit_bytes as f64;
    let percent = (utilisation * 100.0).round();
    if utilisation > 0.9 {
        ComponentHealth::unhealthy(30).with_message(format!("memory at {percent}%"))
    } else if utilisation > 0.7 {
        ComponentHealth::degraded(70).with_message(format!("memory at {percent}%"))
    } else {
        ComponentHealth::healthy()
    }
}

/// Limits used by [`check_api_performance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApiPerformanceThresholds {
    pub degraded_error_rate: f64,
    pub unhealthy_error_rate: f64,
    pub degraded_latency_ms: f64,
    pub unhealthy_latency_ms: f64,
}

impl Default for ApiPerformanceThresholds {
    fn default() -> Self {
        Self {
            degraded_error_rate: 0.05,
            unhealthy_error_rate: 0.25,
            degraded_latency_ms: 2_000.0,
            unhealthy_latency_ms: 5_000.0,
        }
    }
}

/// Grades the gateway's own error rate and latency estimate.
pub fn check_api_performance(
    snapshot: &MetricsSnapshot,
    thresholds: &ApiPerformanceThresholds,
) -> ComponentHealth {
    if snapshot.total == 0 {
        return ComponentHealth::healthy().with_message("no traffic yet");
    }
    let error_rate = snapshot.error_rate();
    let latency = snapshot.average_response_time_ms;
    let summary = format!(
        "error rate {:.1}%, average {:.0} ms",
        error_rate * 100.0,
        latency
    );

    if error_rate >= thresholds.unhealthy_error_rate || latency >= thresholds.unhealthy_latency_ms {
        ComponentHealth::unhealthy(30).with_message(summary)
    } else if error_rate >= thresholds.degraded_error_rate
        || latency >= thresholds.degraded_latency_ms
    {
        ComponentHealth::degraded(70).with_message(summary)
    } else {
        ComponentHealth::healthy()
    }
}

/// Grades the circuit breakers of external dependencies.
///
/// Closed circuits count fully, half-open ones half. More than half of the
/// circuits open is unhealthy.
pub fn check_circuit_breakers(snapshots: &[CircuitSnapshot]) -> ComponentHealth {
    if snapshots.is_empty() {
        return ComponentHealth::healthy();
    }
    let total = snapshots.len();
    let open = snapshots
        .iter()
        .filter(|s| s.state == CircuitState::Open)
        .count();
    let half_open = snapshots
        .iter()
        .filter(|s| s.state == CircuitState::HalfOpen)
        .count();
    let closed = total - open - half_open;

    if open == 0 && half_open == 0 {
        return ComponentHealth::healthy();
    }

    let score = ((closed * 100 + half_open * 50) as f64 / total as f64).round() as u8;
    let message = format!("{open} open, {half_open} half-open of {total}");
    if open * 2 > total {
        ComponentHealth::unhealthy(score).with_message(message)
    } else {
        ComponentHealth::degraded(score).with_message(message)
    }
}
