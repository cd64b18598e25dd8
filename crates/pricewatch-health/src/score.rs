//! Weighted composition of component health.

use crate::status::HealthStatus;
use std::collections::BTreeMap;

/// Names of the standard components.
pub mod component {
    pub const DATABASE: &str = "database";
    pub const SCRAPER: &str = "scraper";
    pub const CACHE: &str = "cache";
    pub const MEMORY: &str = "memory";
    pub const API_PERFORMANCE: &str = "api_performance";
    pub const EXTERNAL_DEPENDENCIES: &str = "external_dependencies";
}

/// Result of one health check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComponentHealth {
    pub status: HealthStatus,
    /// 0 to 100.
    pub score: u8,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn new(status: HealthStatus, score: u8) -> Self {
        Self {
            status,
            score: score.min(100),
            message: None,
        }
    }

    pub fn healthy() -> Self {
        Self::new(HealthStatus::Healthy, 100)
    }

    pub fn degraded(score: u8) -> Self {
        Self::new(HealthStatus::Degraded, score)
    }

    pub fn unhealthy(score: u8) -> Self {
        Self::new(HealthStatus::Unhealthy, score)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Component results keyed by component name.
pub type Components = BTreeMap<String, ComponentHealth>;

/// Weight of each component in the composite score.
///
/// Weights are used as given; they are not normalized. The default set sums
/// to 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthWeights {
    weights: BTreeMap<String, f64>,
}

impl HealthWeights {
    /// No weights at all; every component contributes nothing.
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    pub fn with_weight(mut self, component: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(component.into(), weight);
        self
    }

    pub fn get(&self, component: &str) -> Option<f64> {
        self.weights.get(component).copied()
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self::empty()
            .with_weight(component::DATABASE, 0.25)
            .with_weight(component::SCRAPER, 0.20)
            .with_weight(component::CACHE, 0.15)
            .with_weight(component::MEMORY, 0.15)
            .with_weight(component::API_PERFORMANCE, 0.15)
            .with_weight(component::EXTERNAL_DEPENDENCIES, 0.10)
    }
}

/// Weighted sum of component scores, rounded and clamped to `0..=100`.
///
/// Components without a weight contribute nothing.
///
/// ```
/// use pricewatch_health::{compute_health_score, ComponentHealth, Components, HealthWeights};
///
/// let mut components = Components::new();
/// components.insert("database".into(), ComponentHealth::healthy());
/// components.insert("scraper".into(), ComponentHealth::degraded(50));
///
/// let weights = HealthWeights::empty()
///     .with_weight("database", 0.5)
///     .with_weight("scraper", 0.5);
/// assert_eq!(compute_health_score(&components, &weights), 75);
/// ```
pub fn compute_health_score(components: &Components, weights: &HealthWeights) -> u8 {
    let sum: f64 = components
        .iter()
        .filter_map(|(name, health)| weights.get(name).map(|w| w * f64::from(health.score)))
        .sum();

    if !sum.is_finite() {
        return 0;
    }
    sum.round().clamp(0.0, 100.0) as u8
}

/// Classifies the system from its composite score and component states.
///
/// - `Healthy`: score >= 90 and every component healthy
/// - `Degraded`: score >= 70 and no component unhealthy
/// - `Unhealthy`: anything else
pub fn determine_status(score: u8, components: &Components) -> HealthStatus {
    let all_healthy = components.values().all(|c| c.status == HealthStatus::Healthy);
    let any_unhealthy = components
        .values()
        .any(|c| c.status == HealthStatus::Unhealthy);

    if score >= 90 && all_healthy {
        HealthStatus::Healthy
    } else if score >= 70 && !any_unhealthy {
        HealthStatus::Degraded
    } else {
        HealthStatus::Unhealthy
    }
}
