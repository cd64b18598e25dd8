use pricewatch_circuitbreaker::{CircuitSnapshot, CircuitState};
use pricewatch_health::MetricsSnapshot;
use serde::Serialize;

/// Point-in-time view of a gateway for status endpoints and dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewaySnapshot {
    pub name: String,
    pub metrics: MetricsSnapshot,
    /// Every dependency seen so far, sorted by name.
    pub circuits: Vec<CircuitSnapshot>,
    pub cache_size: usize,
    pub cache_capacity: usize,
    pub tracked_clients: usize,
}

impl GatewaySnapshot {
    pub fn circuit(&self, dependency: &str) -> Option<&CircuitSnapshot> {
        self.circuits.iter().find(|c| c.dependency == dependency)
    }

    /// Dependencies whose circuit is currently open.
    pub fn open_circuits(&self) -> impl Iterator<Item = &str> {
        self.circuits
            .iter()
            .filter(|c| c.state == CircuitState::Open)
            .map(|c| c.dependency.as_str())
    }
}
