use crate::config::{CircuitBreakerConfig, HalfOpenPolicy};
use std::time::{Duration, Instant};

/// Represents the state of a dependency's circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum CircuitState {
    /// Calls flow normally.
    #[default]
    Closed = 0,
    /// Calls are rejected until the cooldown elapses.
    Open = 1,
    /// The cooldown elapsed; the next outcome decides whether to close or
    /// re-open.
    HalfOpen = 2,
}

impl CircuitState {
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer to "may I call this dependency now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPermission {
    /// State after any lazy Open to HalfOpen transition.
    pub state: CircuitState,
    pub allowed: bool,
    /// Remaining cooldown when rejected by an open circuit.
    pub retry_after: Option<Duration>,
}

/// A state change, reported back to the registry so it can emit events
/// outside the shard lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) from: CircuitState,
    pub(crate) to: CircuitState,
}

/// Breaker state for a single dependency.
///
/// `Open` implies `consecutive_failures >= failure_threshold`, and the circuit
/// only leaves `Open` once `now - last_failure_at >= cooldown`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    probe_in_flight: bool,
}

impl Circuit {
    pub(crate) fn state(&self) -> CircuitState {
        self.state
    }

    pub(crate) fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn remaining_cooldown(&self, now: Instant, cooldown: Duration) -> Option<Duration> {
        let last = self.last_failure_at?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }

    fn transition(&mut self, to: CircuitState) -> Option<Transition> {
        if self.state == to {
            return None;
        }
        let from = self.state;
        self.state = to;
        self.probe_in_flight = false;
        Some(Transition { from, to })
    }

    pub(crate) fn check(
        &mut self,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> (CallPermission, Option<Transition>) {
        let mut transition = None;

        if self.state == CircuitState::Open {
            if let Some(retry_after) = self.remaining_cooldown(now, config.cooldown) {
                let permission = CallPermission {
                    state: CircuitState::Open,
                    allowed: false,
                    retry_after: Some(retry_after),
                };
                return (permission, None);
            }
            transition = self.transition(CircuitState::HalfOpen);
        }

        let allowed = match (self.state, config.half_open_policy) {
            (CircuitState::HalfOpen, HalfOpenPolicy::SingleProbe) => {
                if self.probe_in_flight {
                    false
                } else {
                    self.probe_in_flight = true;
                    true
                }
            }
            _ => true,
        };

        let permission = CallPermission {
            state: self.state,
            allowed,
            retry_after: None,
        };
        (permission, transition)
    }

    pub(crate) fn record_success(&mut self) -> Option<Transition> {
        self.consecutive_failures = 0;
        self.probe_in_flight = false;
        self.transition(CircuitState::Closed)
    }

    pub(crate) fn record_failure(
        &mut self,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> Option<Transition> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_failure_at = Some(now);
        self.probe_in_flight = false;

        let should_open = match self.state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => self.consecutive_failures >= config.failure_threshold,
            CircuitState::Open => false,
        };
        if should_open {
            self.transition(CircuitState::Open)
        } else {
            None
        }
    }

    /// Frees the half-open probe slot without recording an outcome.
    pub(crate) fn release(&mut self) {
        self.probe_in_flight = false;
    }

    pub(crate) fn reset(&mut self) -> Option<Transition> {
        self.consecutive_failures = 0;
        self.last_failure_at = None;
        self.transition(CircuitState::Closed)
    }

    pub(crate) fn force_open(
        &mut self,
        now: Instant,
        config: &CircuitBreakerConfig,
    ) -> Option<Transition> {
        self.consecutive_failures = self.consecutive_failures.max(config.failure_threshold);
        self.last_failure_at = Some(now);
        self.transition(CircuitState::Open)
    }
}
