use crate::config::{ExecutorConfig, ExecutorConfigBuilder};
use crate::events::ExecutorEvent;
use pricewatch_circuitbreaker::CircuitBreakerRegistry;
use pricewatch_core::{CallError, ResilienceError};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

#[cfg(feature = "metrics")]
fn describe_metrics() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        describe_counter!(
            "executor_calls_total",
            "Total number of resilient calls by final result"
        );
        describe_counter!(
            "executor_attempts_total",
            "Total number of network attempts by outcome"
        );
        describe_counter!(
            "executor_retries_total",
            "Total number of retries scheduled after a retryable failure"
        );
    });
}

/// Reports an attempt's outcome to the circuit breaker exactly once.
///
/// If the guard is dropped without [`report`](Self::report) being called,
/// which happens when the caller cancels the execution mid-attempt, the
/// breaker's half-open probe slot is released instead, so the circuit never
/// waits on an attempt that will not report.
#[derive(Debug)]
pub struct AttemptGuard<'a> {
    breakers: &'a CircuitBreakerRegistry,
    dependency: &'a str,
    armed: bool,
}

impl<'a> AttemptGuard<'a> {
    pub fn new(breakers: &'a CircuitBreakerRegistry, dependency: &'a str) -> Self {
        Self {
            breakers,
            dependency,
            armed: true,
        }
    }

    /// Records the outcome and disarms the guard.
    pub fn report(mut self, success: bool) {
        self.armed = false;
        self.breakers.report(self.dependency, success);
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breakers.release(self.dependency);
        }
    }
}

/// Runs outbound operations with a per-attempt timeout, jittered exponential
/// retry and circuit breaker gating.
///
/// Cloning is cheap; clones share configuration and breakers.
#[derive(Clone)]
pub struct ResilientExecutor {
    config: Arc<ExecutorConfig>,
    breakers: CircuitBreakerRegistry,
}

impl ResilientExecutor {
    /// Creates a new configuration builder.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::new()
    }

    pub fn new(config: ExecutorConfig, breakers: CircuitBreakerRegistry) -> Self {
        #[cfg(feature = "metrics")]
        describe_metrics();

        Self {
            config: Arc::new(config),
            breakers,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn breakers(&self) -> &CircuitBreakerRegistry {
        &self.breakers
    }

    /// Runs `operation` against `dependency`.
    ///
    /// Before every attempt the dependency's circuit is consulted. A refusal
    /// before the first attempt ends the call with
    /// [`ResilienceError::DependencyUnavailable`] without touching the network
    /// or the retry budget. Every attempt that runs is
    /// reported to the breaker exactly once.
    ///
    /// Transient failures and timeouts are retried up to `max_retries` total
    /// attempts; permanent failures are returned immediately. When retries are
    /// exhausted, or the circuit opens between attempts, the last failure is
    /// returned. Event timestamps come from the breakers' clock.
    pub async fn execute<T, F, Fut>(
        &self,
        dependency: &str,
        mut operation: F,
    ) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let config = &self.config;
        let max_attempts = config.max_retries;
        let mut attempts = 0;
        let mut last_error: Option<CallError> = None;

        loop {
            let permission = self.breakers.can_execute(dependency);
            if !permission.allowed {
                #[cfg(feature = "metrics")]
                counter!("executor_calls_total", "executor" => config.name.clone(), "dependency" => dependency.to_owned(), "result" => "rejected")
                    .increment(1);

                #[cfg(feature = "tracing")]
                warn!(executor = %config.name, dependency, attempts, "Dependency unavailable, circuit open");

                self.emit(ExecutorEvent::Rejected {
                    executor_name: config.name.clone(),
                    dependency: dependency.to_owned(),
                    timestamp: self.now(),
                    attempts,
                });
                // The circuit opened under this call's own failures.
                if let Some(error) = last_error {
                    return Err(ResilienceError::from_call_error(dependency, attempts, error));
                }
                return Err(ResilienceError::DependencyUnavailable {
                    dependency: dependency.to_owned(),
                    retry_after: permission.retry_after,
                });
            }

            attempts += 1;
            let guard = AttemptGuard::new(&self.breakers, dependency);
            let outcome = match tokio::time::timeout(config.timeout, operation()).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    #[cfg(feature = "tracing")]
                    warn!(executor = %config.name, dependency, attempt = attempts, timeout = ?config.timeout, "Attempt timed out");

                    self.emit(ExecutorEvent::Timeout {
                        executor_name: config.name.clone(),
                        dependency: dependency.to_owned(),
                        timestamp: self.now(),
                        attempt: attempts,
                        timeout: config.timeout,
                    });
                    Err(CallError::Timeout(config.timeout))
                }
            };

            let error = match outcome {
                Ok(value) => {
                    guard.report(true);

                    #[cfg(feature = "metrics")]
                    {
                        counter!("executor_attempts_total", "executor" => config.name.clone(), "dependency" => dependency.to_owned(), "outcome" => "success")
                            .increment(1);
                        counter!("executor_calls_total", "executor" => config.name.clone(), "dependency" => dependency.to_owned(), "result" => "success")
                            .increment(1);
                    }

                    #[cfg(feature = "tracing")]
                    debug!(executor = %config.name, dependency, attempts, "Call succeeded");

                    self.emit(ExecutorEvent::Success {
                        executor_name: config.name.clone(),
                        dependency: dependency.to_owned(),
                        timestamp: self.now(),
                        attempts,
                    });
                    return Ok(value);
                }
                Err(error) => error,
            };

            let class = error.classify();
            let counts_as_failure =
                class.is_retryable() || self.config.count_permanent_failures;
            guard.report(!counts_as_failure);

            #[cfg(feature = "metrics")]
            counter!("executor_attempts_total", "executor" => config.name.clone(), "dependency" => dependency.to_owned(), "outcome" => class_label(class))
                .increment(1);

            #[cfg(feature = "tracing")]
            debug!(executor = %config.name, dependency, attempt = attempts, error = %error, "Attempt failed");

            self.emit(ExecutorEvent::AttemptFailed {
                executor_name: config.name.clone(),
                dependency: dependency.to_owned(),
                timestamp: self.now(),
                attempt: attempts,
                class,
            });

            if !class.is_retryable() {
                #[cfg(feature = "metrics")]
                counter!("executor_calls_total", "executor" => config.name.clone(), "dependency" => dependency.to_owned(), "result" => "failure")
                    .increment(1);

                return Err(ResilienceError::from_call_error(dependency, attempts, error));
            }

            if attempts >= max_attempts {
                #[cfg(feature = "metrics")]
                counter!("executor_calls_total", "executor" => config.name.clone(), "dependency" => dependency.to_owned(), "result" => "failure")
                    .increment(1);

                #[cfg(feature = "tracing")]
                warn!(executor = %config.name, dependency, attempts, "Retries exhausted");

                self.emit(ExecutorEvent::Exhausted {
                    executor_name: config.name.clone(),
                    dependency: dependency.to_owned(),
                    timestamp: self.now(),
                    attempts,
                });
                return Err(ResilienceError::from_call_error(dependency, attempts, error));
            }

            let delay = config.backoff.next_interval(attempts - 1);

            #[cfg(feature = "metrics")]
            counter!("executor_retries_total", "executor" => config.name.clone(), "dependency" => dependency.to_owned())
                .increment(1);

            #[cfg(feature = "tracing")]
            debug!(executor = %config.name, dependency, attempt = attempts, ?delay, "Retrying");

            self.emit(ExecutorEvent::Retry {
                executor_name: config.name.clone(),
                dependency: dependency.to_owned(),
                timestamp: self.now(),
                attempt: attempts,
                delay,
            });
            last_error = Some(error);
            tokio::time::sleep(delay).await;
        }
    }

    fn now(&self) -> Instant {
        self.breakers.clock().now()
    }

    fn emit(&self, event: ExecutorEvent) {
        self.config.event_listeners.emit(&event);
    }
}

#[cfg(feature = "metrics")]
fn class_label(class: pricewatch_core::FailureClass) -> &'static str {
    use pricewatch_core::FailureClass;
    match class {
        FailureClass::Transient => "transient",
        FailureClass::Timeout => "timeout",
        FailureClass::Permanent => "permanent",
    }
}

impl std::fmt::Debug for ResilientExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientExecutor")
            .field("name", &self.config.name)
            .field("timeout", &self.config.timeout)
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}
