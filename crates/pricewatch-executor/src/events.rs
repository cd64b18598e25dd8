use pricewatch_core::{FailureClass, ResilienceEvent};
use std::time::{Duration, Instant};

/// Events emitted by the [`ResilientExecutor`](crate::ResilientExecutor).
#[derive(Debug, Clone)]
pub enum ExecutorEvent {
    /// An attempt failed. `attempt` is 1-based.
    AttemptFailed {
        executor_name: String,
        dependency: String,
        timestamp: Instant,
        attempt: usize,
        class: FailureClass,
    },
    /// An attempt exceeded the per-attempt timeout and was cancelled.
    Timeout {
        executor_name: String,
        dependency: String,
        timestamp: Instant,
        attempt: usize,
        timeout: Duration,
    },
    /// Another attempt will be made after `delay`.
    Retry {
        executor_name: String,
        dependency: String,
        timestamp: Instant,
        attempt: usize,
        delay: Duration,
    },
    /// The call succeeded after `attempts` attempts.
    Success {
        executor_name: String,
        dependency: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// Every allowed attempt failed with a retryable error.
    Exhausted {
        executor_name: String,
        dependency: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// The circuit breaker refused an attempt.
    Rejected {
        executor_name: String,
        dependency: String,
        timestamp: Instant,
        attempts: usize,
    },
}

impl ExecutorEvent {
    pub fn dependency(&self) -> &str {
        match self {
            ExecutorEvent::AttemptFailed { dependency, .. }
            | ExecutorEvent::Timeout { dependency, .. }
            | ExecutorEvent::Retry { dependency, .. }
            | ExecutorEvent::Success { dependency, .. }
            | ExecutorEvent::Exhausted { dependency, .. }
            | ExecutorEvent::Rejected { dependency, .. } => dependency,
        }
    }
}

impl ResilienceEvent for ExecutorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ExecutorEvent::AttemptFailed { .. } => "attempt_failed",
            ExecutorEvent::Timeout { .. } => "timeout",
            ExecutorEvent::Retry { .. } => "retry",
            ExecutorEvent::Success { .. } => "success",
            ExecutorEvent::Exhausted { .. } => "exhausted",
            ExecutorEvent::Rejected { .. } => "rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ExecutorEvent::AttemptFailed { timestamp, .. }
            | ExecutorEvent::Timeout { timestamp, .. }
            | ExecutorEvent::Retry { timestamp, .. }
            | ExecutorEvent::Success { timestamp, .. }
            | ExecutorEvent::Exhausted { timestamp, .. }
            | ExecutorEvent::Rejected { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            ExecutorEvent::AttemptFailed { executor_name, .. }
            | ExecutorEvent::Timeout { executor_name, .. }
            | ExecutorEvent::Retry { executor_name, .. }
            | ExecutorEvent::Success { executor_name, .. }
            | ExecutorEvent::Exhausted { executor_name, .. }
            | ExecutorEvent::Rejected { executor_name, .. } => executor_name,
        }
    }
}
