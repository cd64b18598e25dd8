use crate::events::RateLimiterEvent;
use crate::RateLimiter;
use pricewatch_core::{EventListeners, FnListener, SharedClock, SystemClock};
use std::time::Duration;

/// Configuration for the [`RateLimiter`].
pub struct RateLimiterConfig {
    pub(crate) window: Duration,
    pub(crate) clock: SharedClock,
    pub(crate) event_listeners: EventListeners<RateLimiterEvent>,
    pub(crate) name: String,
}

impl RateLimiterConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }
}

/// Builder for the [`RateLimiter`].
pub struct RateLimiterConfigBuilder {
    window: Duration,
    clock: Option<SharedClock>,
    event_listeners: EventListeners<RateLimiterEvent>,
    name: String,
}

impl RateLimiterConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            window: Duration::from_secs(60),
            clock: None,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Length of the sliding window.
    ///
    /// Default: 60 seconds
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Time source for window bookkeeping.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the name of this rate limiter instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with the client id and remaining budget
    /// whenever a request is admitted.
    pub fn on_permit_acquired<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &RateLimiterEvent| {
                if let RateLimiterEvent::PermitAcquired {
                    client_id,
                    remaining,
                    ..
                } = event
                {
                    f(client_id, *remaining);
                }
            }));
        self
    }

    /// Registers a callback invoked with the client id whenever a request is
    /// rejected.
    pub fn on_permit_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &RateLimiterEvent| {
                if let RateLimiterEvent::PermitRejected { client_id, .. } = event {
                    f(client_id);
                }
            }));
        self
    }

    pub(crate) fn into_config(self) -> RateLimiterConfig {
        RateLimiterConfig {
            window: self.window,
            clock: self.clock.unwrap_or_else(SystemClock::shared),
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the rate limiter.
    pub fn build(self) -> RateLimiter {
        RateLimiter::new(self.into_config())
    }
}

impl Default for RateLimiterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
