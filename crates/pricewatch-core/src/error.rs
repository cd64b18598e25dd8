//! Error taxonomy for the resilience layer.
//!
//! Two types cover the two sides of the gateway:
//!
//! - [`CallError`] is what an outbound operation returns. It describes the
//!   failure as observed on the wire (transport error, status code, ...).
//! - [`ResilienceError`] is what the gateway surfaces to its callers after
//!   rate limiting, circuit breaking and retries have been applied. It always
//!   keeps the original [`CallError`] reachable through
//!   [`std::error::Error::source`] when one exists.
//!
//! Classification happens once, via [`CallError::classify`], before a failure
//! enters the retry loop. Only [`FailureClass::Transient`] and
//! [`FailureClass::Timeout`] consume retry budget.
//!
//! ```
//! use pricewatch_core::{CallError, FailureClass, ResilienceError};
//!
//! let upstream = CallError::status(503, "maintenance");
//! assert_eq!(upstream.classify(), FailureClass::Transient);
//!
//! let surfaced = ResilienceError::from_call_error("record_store", 3, upstream);
//! assert!(surfaced.is_transient_failure());
//! assert!(surfaced.is_retryable());
//! assert_eq!(surfaced.status_code(), 502);
//! ```

use std::time::Duration;
use thiserror::Error;

/// How a failed outbound call should be treated by the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// Network hiccup or server-side error; worth retrying.
    Transient,
    /// The attempt exceeded its deadline; worth retrying.
    Timeout,
    /// The request itself is wrong; retrying cannot help.
    Permanent,
}

impl FailureClass {
    /// Whether a failure of this class consumes retry budget.
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureClass::Transient | FailureClass::Timeout)
    }
}

/// Failure reported by an outbound operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The connection failed or was reset before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// The attempt did not complete within its deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The remote answered with a non-success status.
    #[error("remote returned status {code}: {message}")]
    Status { code: u16, message: String },

    /// The request was rejected as malformed before or by the remote.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The caller is not allowed to perform the operation.
    #[error("not authorized: {0}")]
    Unauthorized(String),
}

impl CallError {
    /// Shorthand for [`CallError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        CallError::Transport(message.into())
    }

    /// Shorthand for [`CallError::Status`].
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        CallError::Status {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for [`CallError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        CallError::Validation(message.into())
    }

    /// Shorthand for [`CallError::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        CallError::Unauthorized(message.into())
    }

    /// Classifies the failure for the retry loop.
    ///
    /// - transport errors and `500`, `502`, `503`, `504` are transient
    /// - attempt timeouts and `408` are timeouts
    /// - validation, authorization and every other status are permanent
    pub fn classify(&self) -> FailureClass {
        match self {
            CallError::Transport(_) => FailureClass::Transient,
            CallError::Timeout(_) => FailureClass::Timeout,
            CallError::Status { code, .. } => match code {
                408 => FailureClass::Timeout,
                500 | 502 | 503 | 504 => FailureClass::Transient,
                _ => FailureClass::Permanent,
            },
            CallError::Validation(_) | CallError::Unauthorized(_) => FailureClass::Permanent,
        }
    }

    /// Whether this failure may be retried.
    pub fn is_retryable(&self) -> bool {
        self.classify().is_retryable()
    }

    /// The remote status code, if the remote answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CallError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Discriminant of [`ResilienceError`], handy for metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RateLimited,
    DependencyUnavailable,
    Timeout,
    TransientFailure,
    PermanentFailure,
}

impl ErrorKind {
    /// Stable snake_case label.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::DependencyUnavailable => "dependency_unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::TransientFailure => "transient_failure",
            ErrorKind::PermanentFailure => "permanent_failure",
        }
    }
}

/// Error surfaced by the gateway and the resilient executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResilienceError {
    /// The client exceeded its request budget for the current window.
    #[error("client '{client_id}' exceeded {limit} requests per window")]
    RateLimited {
        client_id: String,
        limit: usize,
        /// Time until the oldest request in the window expires.
        retry_after: Option<Duration>,
    },

    /// The dependency's circuit is open; no call was attempted.
    #[error("dependency '{dependency}' is unavailable")]
    DependencyUnavailable {
        dependency: String,
        /// Remaining cooldown before the circuit admits a probe.
        retry_after: Option<Duration>,
    },

    /// Every attempt timed out, or the last one did.
    #[error("call to '{dependency}' timed out after {attempts} attempt(s)")]
    Timeout {
        dependency: String,
        attempts: usize,
        #[source]
        source: CallError,
    },

    /// Retries were exhausted on a retryable failure.
    #[error("call to '{dependency}' failed after {attempts} attempt(s)")]
    TransientFailure {
        dependency: String,
        attempts: usize,
        #[source]
        source: CallError,
    },

    /// The call failed in a way retrying cannot fix.
    #[error("call to '{dependency}' was rejected")]
    PermanentFailure {
        dependency: String,
        #[source]
        source: CallError,
    },
}

impl ResilienceError {
    /// Wraps the final [`CallError`] of an execution according to its class.
    pub fn from_call_error(
        dependency: impl Into<String>,
        attempts: usize,
        source: CallError,
    ) -> Self {
        let dependency = dependency.into();
        match source.classify() {
            FailureClass::Timeout => ResilienceError::Timeout {
                dependency,
                attempts,
                source,
            },
            FailureClass::Transient => ResilienceError::TransientFailure {
                dependency,
                attempts,
                source,
            },
            FailureClass::Permanent => ResilienceError::PermanentFailure { dependency, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResilienceError::RateLimited { .. } => ErrorKind::RateLimited,
            ResilienceError::DependencyUnavailable { .. } => ErrorKind::DependencyUnavailable,
            ResilienceError::Timeout { .. } => ErrorKind::Timeout,
            ResilienceError::TransientFailure { .. } => ErrorKind::TransientFailure,
            ResilienceError::PermanentFailure { .. } => ErrorKind::PermanentFailure,
        }
    }

    /// Whether the caller may retry the whole operation later.
    ///
    /// Everything except a permanent failure clears up on its own: windows
    /// slide, circuits cool down, remotes recover.
    pub fn is_retryable(&self) -> bool {
        !self.is_permanent_failure()
    }

    /// HTTP-style status for translating the error into a response.
    pub fn status_code(&self) -> u16 {
        match self {
            ResilienceError::RateLimited { .. } => 429,
            ResilienceError::DependencyUnavailable { .. } => 503,
            ResilienceError::Timeout { .. } => 504,
            ResilienceError::TransientFailure { .. } => 502,
            ResilienceError::PermanentFailure { source, .. } => match source {
                CallError::Validation(_) => 400,
                CallError::Unauthorized(_) => 403,
                CallError::Status { code, .. } if (400..500).contains(code) => *code,
                _ => 502,
            },
        }
    }

    /// Suggested wait before retrying, when one is known.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ResilienceError::RateLimited { retry_after, .. }
            | ResilienceError::DependencyUnavailable { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// The outbound failure that caused this error, if any.
    pub fn call_error(&self) -> Option<&CallError> {
        match self {
            ResilienceError::Timeout { source, .. }
            | ResilienceError::TransientFailure { source, .. }
            | ResilienceError::PermanentFailure { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ResilienceError::RateLimited { .. })
    }

    pub fn is_dependency_unavailable(&self) -> bool {
        matches!(self, ResilienceError::DependencyUnavailable { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ResilienceError::Timeout { .. })
    }

    pub fn is_transient_failure(&self) -> bool {
        matches!(self, ResilienceError::TransientFailure { .. })
    }

    pub fn is_permanent_failure(&self) -> bool {
        matches!(self, ResilienceError::PermanentFailure { .. })
    }
}
