use crate::circuit::CircuitState;
use pricewatch_core::ResilienceEvent;
use std::time::Instant;

/// Events emitted by a [`CircuitBreakerRegistry`](crate::CircuitBreakerRegistry).
///
/// `registry_name` identifies the registry, `dependency` the circuit.
#[derive(Debug, Clone)]
pub enum CircuitBreakerEvent {
    StateTransition {
        registry_name: String,
        dependency: String,
        timestamp: Instant,
        from_state: CircuitState,
        to_state: CircuitState,
    },
    CallPermitted {
        registry_name: String,
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
    },
    CallRejected {
        registry_name: String,
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
    },
    SuccessRecorded {
        registry_name: String,
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
    },
    FailureRecorded {
        registry_name: String,
        dependency: String,
        timestamp: Instant,
        state: CircuitState,
        consecutive_failures: u32,
    },
}

impl CircuitBreakerEvent {
    /// The dependency whose circuit emitted the event.
    pub fn dependency(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { dependency, .. }
            | CircuitBreakerEvent::CallPermitted { dependency, .. }
            | CircuitBreakerEvent::CallRejected { dependency, .. }
            | CircuitBreakerEvent::SuccessRecorded { dependency, .. }
            | CircuitBreakerEvent::FailureRecorded { dependency, .. } => dependency,
        }
    }
}

impl ResilienceEvent for CircuitBreakerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CircuitBreakerEvent::StateTransition { .. } => "state_transition",
            CircuitBreakerEvent::CallPermitted { .. } => "call_permitted",
            CircuitBreakerEvent::CallRejected { .. } => "call_rejected",
            CircuitBreakerEvent::SuccessRecorded { .. } => "success_recorded",
            CircuitBreakerEvent::FailureRecorded { .. } => "failure_recorded",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CircuitBreakerEvent::StateTransition { timestamp, .. }
            | CircuitBreakerEvent::CallPermitted { timestamp, .. }
            | CircuitBreakerEvent::CallRejected { timestamp, .. }
            | CircuitBreakerEvent::SuccessRecorded { timestamp, .. }
            | CircuitBreakerEvent::FailureRecorded { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            CircuitBreakerEvent::StateTransition { registry_name, .. }
            | CircuitBreakerEvent::CallPermitted { registry_name, .. }
            | CircuitBreakerEvent::CallRejected { registry_name, .. }
            | CircuitBreakerEvent::SuccessRecorded { registry_name, .. }
            | CircuitBreakerEvent::FailureRecorded { registry_name, .. } => registry_name,
        }
    }
}
