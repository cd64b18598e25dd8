use crate::score::{
    compute_health_score, determine_status, ComponentHealth, Components, HealthWeights,
};
use crate::status::HealthStatus;

/// Composite health of the system.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HealthReport {
    pub score: u8,
    pub status: HealthStatus,
    pub components: Components,
}

impl HealthReport {
    /// Scores `components` with `weights` and classifies the result.
    pub fn from_components(components: Components, weights: &HealthWeights) -> Self {
        let score = compute_health_score(&components, weights);
        let status = determine_status(score, &components);
        Self {
            score,
            status,
            components,
        }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.get(name)
    }
}
