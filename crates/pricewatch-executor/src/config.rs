use crate::backoff::{IntervalFunction, JitteredExponentialBackoff};
use crate::events::ExecutorEvent;
use crate::ResilientExecutor;
use pricewatch_circuitbreaker::CircuitBreakerRegistry;
use pricewatch_core::{EventListeners, FnListener};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`ResilientExecutor`].
pub struct ExecutorConfig {
    pub(crate) timeout: Duration,
    pub(crate) max_retries: usize,
    pub(crate) backoff: Arc<dyn IntervalFunction>,
    pub(crate) count_permanent_failures: bool,
    pub(crate) event_listeners: EventListeners<ExecutorEvent>,
    pub(crate) name: String,
}

impl ExecutorConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::new()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }
}

/// Builder for a [`ResilientExecutor`].
pub struct ExecutorConfigBuilder {
    timeout: Duration,
    max_retries: usize,
    base_delay: Duration,
    max_jitter: Duration,
    backoff: Option<Arc<dyn IntervalFunction>>,
    count_permanent_failures: bool,
    event_listeners: EventListeners<ExecutorEvent>,
    name: String,
}

impl ExecutorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(1000),
            backoff: None,
            count_permanent_failures: true,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Deadline for a single attempt. An attempt that overruns it is
    /// cancelled and counts as a retryable timeout.
    ///
    /// Default: 10 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts, including the first one.
    ///
    /// Default: 3. Zero is treated as one.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Base of the exponential backoff.
    ///
    /// Default: 1000 ms
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Upper bound of the random jitter added to every delay.
    ///
    /// Default: 1000 ms
    pub fn max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Replaces the jittered exponential backoff built from `base_delay` and
    /// `max_jitter`.
    pub fn backoff<I>(mut self, backoff: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// Whether a permanent failure (4xx, validation, authorization) is
    /// reported to the circuit breaker as a failure.
    ///
    /// When `false` it is reported as a success: the dependency answered, the
    /// request was wrong.
    ///
    /// Default: `true`
    pub fn count_permanent_failures(mut self, count: bool) -> Self {
        self.count_permanent_failures = count;
        self
    }

    /// Sets the name of this executor for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with `(dependency, attempt, delay)`
    /// before every retry.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &ExecutorEvent| {
                if let ExecutorEvent::Retry {
                    dependency,
                    attempt,
                    delay,
                    ..
                } = event
                {
                    f(dependency, *attempt, *delay);
                }
            }));
        self
    }

    /// Registers a callback invoked with `(dependency, attempts)` when a call
    /// succeeds.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &ExecutorEvent| {
                if let ExecutorEvent::Success {
                    dependency,
                    attempts,
                    ..
                } = event
                {
                    f(dependency, *attempts);
                }
            }));
        self
    }

    /// Registers a callback invoked with `(dependency, attempts)` when
    /// retries are exhausted.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &ExecutorEvent| {
                if let ExecutorEvent::Exhausted {
                    dependency,
                    attempts,
                    ..
                } = event
                {
                    f(dependency, *attempts);
                }
            }));
        self
    }

    /// Registers a callback invoked with `(dependency, attempt)` when an
    /// attempt times out.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners
            .add(FnListener::new(move |event: &ExecutorEvent| {
                if let ExecutorEvent::Timeout {
                    dependency,
                    attempt,
                    ..
                } = event
                {
                    f(dependency, *attempt);
                }
            }));
        self
    }

    /// Registers a listener for every executor event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutorEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    pub(crate) fn into_config(self) -> ExecutorConfig {
        let backoff = self.backoff.unwrap_or_else(|| {
            Arc::new(JitteredExponentialBackoff::new(self.base_delay).max_jitter(self.max_jitter))
        });
        ExecutorConfig {
            timeout: self.timeout,
            max_retries: self.max_retries.max(1),
            backoff,
            count_permanent_failures: self.count_permanent_failures,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds an executor that consults `breakers` before every attempt.
    pub fn build(self, breakers: CircuitBreakerRegistry) -> ResilientExecutor {
        ResilientExecutor::new(self.into_config(), breakers)
    }
}

impl Default for ExecutorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
