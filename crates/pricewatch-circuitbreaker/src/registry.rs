use crate::circuit::{CallPermission, Circuit, CircuitState, Transition};
use crate::config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
use crate::error::CircuitBreakerError;
use crate::events::CircuitBreakerEvent;
use dashmap::DashMap;
use pricewatch_core::SharedClock;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
fn describe_metrics() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        describe_counter!(
            "circuitbreaker_calls_total",
            "Total number of calls checked or reported per dependency"
        );
        describe_counter!(
            "circuitbreaker_transitions_total",
            "Total number of circuit breaker state transitions"
        );
        describe_gauge!(
            "circuitbreaker_state",
            "Current circuit state (0 = closed, 1 = open, 2 = half-open)"
        );
    });
}

/// Point-in-time view of one dependency's circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CircuitSnapshot {
    pub dependency: String,
    pub state: CircuitState,
    pub consecutive_failures: u32,
}

/// One circuit breaker per dependency, created lazily on first use.
///
/// Every operation on a dependency runs under that dependency's shard lock,
/// so a check and a report for the same dependency never interleave
/// half-way. Events are emitted after the lock is released.
///
/// Cloning is cheap; clones share the same circuits.
#[derive(Clone)]
pub struct CircuitBreakerRegistry {
    config: Arc<CircuitBreakerConfig>,
    circuits: Arc<DashMap<String, Circuit>>,
}

impl CircuitBreakerRegistry {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    pub fn new(config: CircuitBreakerConfig) -> Self {
        #[cfg(feature = "metrics")]
        describe_metrics();

        Self {
            config: Arc::new(config),
            circuits: Arc::new(DashMap::new()),
        }
    }

    fn with_circuit<R>(&self, dependency: &str, f: impl FnOnce(&mut Circuit) -> R) -> R {
        if let Some(mut circuit) = self.circuits.get_mut(dependency) {
            return f(circuit.value_mut());
        }
        let mut circuit = self.circuits.entry(dependency.to_owned()).or_default();
        f(circuit.value_mut())
    }

    /// Decides whether a call to `dependency` may proceed.
    ///
    /// An open circuit whose cooldown has elapsed moves to half-open as a side
    /// effect.
    pub fn can_execute(&self, dependency: &str) -> CallPermission {
        let now = self.config.clock.now();
        let (permission, transition) =
            self.with_circuit(dependency, |c| c.check(now, &self.config));

        if let Some(transition) = transition {
            self.on_transition(dependency, transition, now);
        }

        if permission.allowed {
            #[cfg(feature = "metrics")]
            counter!("circuitbreaker_calls_total", "circuitbreaker" => dependency.to_owned(), "outcome" => "permitted")
                .increment(1);

            self.config
                .event_listeners
                .emit(&CircuitBreakerEvent::CallPermitted {
                    registry_name: self.config.name.clone(),
                    dependency: dependency.to_owned(),
                    timestamp: now,
                    state: permission.state,
                });
        } else {
            #[cfg(feature = "metrics")]
            counter!("circuitbreaker_calls_total", "circuitbreaker" => dependency.to_owned(), "outcome" => "rejected")
                .increment(1);

            #[cfg(feature = "tracing")]
            debug!(
                breaker = %self.config.name,
                dependency,
                state = %permission.state,
                retry_after = ?permission.retry_after,
                "Circuit rejected call"
            );

            self.config
                .event_listeners
                .emit(&CircuitBreakerEvent::CallRejected {
                    registry_name: self.config.name.clone(),
                    dependency: dependency.to_owned(),
                    timestamp: now,
                    state: permission.state,
                });
        }
        permission
    }

    /// [`can_execute`](Self::can_execute) as a `Result`.
    pub fn try_acquire(&self, dependency: &str) -> Result<CallPermission, CircuitBreakerError> {
        let permission = self.can_execute(dependency);
        if permission.allowed {
            Ok(permission)
        } else {
            Err(CircuitBreakerError::OpenCircuit {
                dependency: dependency.to_owned(),
                retry_after: permission.retry_after,
            })
        }
    }

    /// Records the outcome of a call to `dependency`.
    ///
    /// Success resets the failure count and closes the circuit. Failure bumps
    /// the count, stamps `last_failure_at`, and opens the circuit once the
    /// threshold is reached (or immediately when half-open).
    pub fn report(&self, dependency: &str, success: bool) {
        let now = self.config.clock.now();
        let (transition, state, consecutive_failures) = self.with_circuit(dependency, |c| {
            let transition = if success {
                c.record_success()
            } else {
                c.record_failure(now, &self.config)
            };
            (transition, c.state(), c.consecutive_failures())
        });

        let event = if success {
            #[cfg(feature = "metrics")]
            counter!("circuitbreaker_calls_total", "circuitbreaker" => dependency.to_owned(), "outcome" => "success")
                .increment(1);

            CircuitBreakerEvent::SuccessRecorded {
                registry_name: self.config.name.clone(),
                dependency: dependency.to_owned(),
                timestamp: now,
                state,
            }
        } else {
            #[cfg(feature = "metrics")]
            counter!("circuitbreaker_calls_total", "circuitbreaker" => dependency.to_owned(), "outcome" => "failure")
                .increment(1);

            #[cfg(feature = "tracing")]
            debug!(breaker = %self.config.name, dependency, consecutive_failures, "Failure recorded");

            CircuitBreakerEvent::FailureRecorded {
                registry_name: self.config.name.clone(),
                dependency: dependency.to_owned(),
                timestamp: now,
                state,
                consecutive_failures,
            }
        };

        if let Some(transition) = transition {
            self.on_transition(dependency, transition, now);
        }
        self.config.event_listeners.emit(&event);
    }

    /// Frees a half-open probe slot for an attempt that was cancelled before
    /// it could report. Does nothing in other states.
    pub fn release(&self, dependency: &str) {
        if let Some(mut circuit) = self.circuits.get_mut(dependency) {
            circuit.release();
        }
    }

    /// Current stored state. Does not apply the lazy half-open transition.
    pub fn state(&self, dependency: &str) -> CircuitState {
        self.circuits
            .get(dependency)
            .map(|c| c.state())
            .unwrap_or_default()
    }

    pub fn snapshot(&self, dependency: &str) -> Option<CircuitSnapshot> {
        self.circuits.get(dependency).map(|c| CircuitSnapshot {
            dependency: dependency.to_owned(),
            state: c.state(),
            consecutive_failures: c.consecutive_failures(),
        })
    }

    /// Snapshots of every known dependency, sorted by name.
    pub fn snapshots(&self) -> Vec<CircuitSnapshot> {
        let mut out: Vec<CircuitSnapshot> = self
            .circuits
            .iter()
            .map(|entry| CircuitSnapshot {
                dependency: entry.key().clone(),
                state: entry.state(),
                consecutive_failures: entry.consecutive_failures(),
            })
            .collect();
        out.sort_by(|a, b| a.dependency.cmp(&b.dependency));
        out
    }

    /// Closes the circuit and clears its failure history.
    pub fn reset(&self, dependency: &str) {
        let now = self.config.clock.now();
        if let Some(transition) = self.with_circuit(dependency, |c| c.reset()) {
            self.on_transition(dependency, transition, now);
        }
    }

    /// Opens the circuit as if the threshold had just been reached.
    pub fn force_open(&self, dependency: &str) {
        let now = self.config.clock.now();
        if let Some(transition) =
            self.with_circuit(dependency, |c| c.force_open(now, &self.config))
        {
            self.on_transition(dependency, transition, now);
        }
    }

    pub fn failure_threshold(&self) -> u32 {
        self.config.failure_threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.config.cooldown
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The clock circuits are timed against.
    pub fn clock(&self) -> &SharedClock {
        &self.config.clock
    }

    fn on_transition(&self, dependency: &str, transition: Transition, now: Instant) {
        let Transition { from, to } = transition;

        #[cfg(feature = "tracing")]
        match to {
            CircuitState::Open => {
                warn!(breaker = %self.config.name, dependency, from = %from, to = %to, "Circuit opened")
            }
            _ => {
                info!(breaker = %self.config.name, dependency, from = %from, to = %to, "Circuit state transition")
            }
        }

        #[cfg(feature = "metrics")]
        {
            counter!(
                "circuitbreaker_transitions_total",
                "circuitbreaker" => dependency.to_owned(),
                "from" => from.as_str(),
                "to" => to.as_str()
            )
            .increment(1);
            gauge!("circuitbreaker_state", "circuitbreaker" => dependency.to_owned())
                .set(to as u8 as f64);
        }

        self.config
            .event_listeners
            .emit(&CircuitBreakerEvent::StateTransition {
                registry_name: self.config.name.clone(),
                dependency: dependency.to_owned(),
                timestamp: now,
                from_state: from,
                to_state: to,
            });
    }
}

impl std::fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("name", &self.config.name)
            .field("failure_threshold", &self.config.failure_threshold)
            .field("cooldown", &self.config.cooldown)
            .field("circuits", &self.circuits.len())
            .finish()
    }
}
