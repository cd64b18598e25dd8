use pricewatch_core::ResilienceError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the circuit breaker registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitBreakerError {
    /// The dependency's circuit is open; the call was not attempted.
    #[error("circuit for '{dependency}' is open; call not permitted")]
    OpenCircuit {
        dependency: String,
        retry_after: Option<Duration>,
    },
}

impl CircuitBreakerError {
    /// Returns true if the error indicates the circuit is open.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::OpenCircuit { .. })
    }
}

impl From<CircuitBreakerError> for ResilienceError {
    fn from(err: CircuitBreakerError) -> Self {
        match err {
            CircuitBreakerError::OpenCircuit {
                dependency,
                retry_after,
            } => ResilienceError::DependencyUnavailable {
                dependency,
                retry_after,
            },
        }
    }
}
