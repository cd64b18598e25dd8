use pricewatch_core::ResilienceError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the rate limiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimiterError {
    /// The client already made `limit` requests within the current window.
    #[error("rate limit exceeded for client '{client_id}' ({limit} per window)")]
    RateLimitExceeded {
        client_id: String,
        limit: usize,
        retry_after: Option<Duration>,
    },
}

impl From<RateLimiterError> for ResilienceError {
    fn from(err: RateLimiterError) -> Self {
        match err {
            RateLimiterError::RateLimitExceeded {
                client_id,
                limit,
                retry_after,
            } => ResilienceError::RateLimited {
                client_id,
                limit,
                retry_after,
            },
        }
    }
}
