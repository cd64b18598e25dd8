//! Request metrics and composite health scoring.
//!
//! [`RequestMetrics`] keeps process-lifetime counters for the gateway: totals,
//! successes, errors, cache hits and a running latency estimate. Health
//! checks grade individual components into [`ComponentHealth`] values, and
//! [`compute_health_score`] / [`determine_status`] fold those into a single
//! 0-100 score and status.
//!
//! ```
//! use pricewatch_health::{
//!     check_api_performance, check_cache, component, ApiPerformanceThresholds, Components,
//!     HealthReport, HealthStatus, HealthWeights, RequestMetrics,
//! };
//!
//! let metrics = RequestMetrics::default();
//! metrics.record_outcome(true, 120.0);
//! metrics.record_outcome(true, 80.0);
//!
//! let mut components = Components::new();
//! components.insert(
//!     component::API_PERFORMANCE.into(),
//!     check_api_performance(&metrics.snapshot(), &ApiPerformanceThresholds::default()),
//! );
//! components.insert(component::CACHE.into(), check_cache(40, 500));
//!
//! let weights = HealthWeights::empty()
//!     .with_weight(component::API_PERFORMANCE, 0.5)
//!     .with_weight(component::CACHE, 0.5);
//! let report = HealthReport::from_components(components, &weights);
//! assert_eq!(report.score, 100);
//! assert_eq!(report.status, HealthStatus::Healthy);
//! ```

mod checks;
mod metrics;
mod report;
mod score;
mod status;

pub use checks::{
    check_api_performance, check_cache, check_circuit_breakers, check_memory, check_reachability,
    ApiPerformanceThresholds,
};
pub use metrics::{LatencyEstimator, MetricsSnapshot, RequestMetrics};
pub use report::HealthReport;
pub use score::{
    component, compute_health_score, determine_status, ComponentHealth, Components, HealthWeights,
};
pub use status::HealthStatus;
