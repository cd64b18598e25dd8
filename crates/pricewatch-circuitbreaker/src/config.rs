use crate::circuit::CircuitState;
use crate::events::CircuitBreakerEvent;
use crate::CircuitBreakerRegistry;
use pricewatch_core::{EventListeners, FnListener, SharedClock, SystemClock};
use std::time::Duration;

/// How many calls a half-open circuit lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HalfOpenPolicy {
    /// Every call passes while half-open; the first reported outcome decides
    /// the next state.
    #[default]
    Unrestricted,
    /// Only one probe call may be in flight while half-open; concurrent
    /// callers are rejected until it reports or is released.
    SingleProbe,
}

/// Configuration shared by every circuit in a [`CircuitBreakerRegistry`].
pub struct CircuitBreakerConfig {
    pub(crate) failure_threshold: u32,
    pub(crate) cooldown: Duration,
    pub(crate) half_open_policy: HalfOpenPolicy,
    pub(crate) clock: SharedClock,
    pub(crate) event_listeners: EventListeners<CircuitBreakerEvent>,
    pub(crate) name: String,
}

impl CircuitBreakerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }
}

/// Builder for a [`CircuitBreakerRegistry`].
pub struct CircuitBreakerConfigBuilder {
    failure_threshold: u32,
    cooldown: Duration,
    half_open_policy: HalfOpenPolicy,
    clock: Option<SharedClock>,
    event_listeners: EventListeners<CircuitBreakerEvent>,
    name: String,
}

impl CircuitBreakerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(30),
            half_open_policy: HalfOpenPolicy::default(),
            clock: None,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Consecutive failures that open a circuit.
    ///
    /// Default: 3. Zero is raised to one.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// How long an open circuit rejects calls after its last failure.
    ///
    /// Default: 30 seconds
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Default: [`HalfOpenPolicy::Unrestricted`]
    pub fn half_open_policy(mut self, policy: HalfOpenPolicy) -> Self {
        self.half_open_policy = policy;
        self
    }

    /// Time source for cooldown checks.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the name of this registry for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with `(dependency, from, to)` on every
    /// state transition.
    pub fn on_state_transition<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, CircuitState, CircuitState) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::StateTransition {
                    dependency,
                    from_state,
                    to_state,
                    ..
                } = event
                {
                    f(dependency, *from_state, *to_state);
                }
            }));
        self
    }

    /// Registers a callback invoked with the dependency name whenever a call
    /// is rejected.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| {
                if let CircuitBreakerEvent::CallRejected { dependency, .. } = event {
                    f(dependency);
                }
            }));
        self
    }

    /// Registers a callback invoked with `(dependency, success)` for every
    /// reported outcome.
    pub fn on_outcome<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &CircuitBreakerEvent| match event {
                CircuitBreakerEvent::SuccessRecorded { dependency, .. } => f(dependency, true),
                CircuitBreakerEvent::FailureRecorded { dependency, .. } => f(dependency, false),
                _ => {}
            }));
        self
    }

    pub(crate) fn into_config(self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold.max(1),
            cooldown: self.cooldown,
            half_open_policy: self.half_open_policy,
            clock: self.clock.unwrap_or_else(SystemClock::shared),
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the registry.
    pub fn build(self) -> CircuitBreakerRegistry {
        CircuitBreakerRegistry::new(self.into_config())
    }
}

impl Default for CircuitBreakerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
