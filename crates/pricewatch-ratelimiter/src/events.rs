use pricewatch_core::ResilienceEvent;
use std::time::{Duration, Instant};

/// Events emitted by the [`RateLimiter`](crate::RateLimiter).
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A request was admitted and recorded.
    PermitAcquired {
        limiter_name: String,
        client_id: String,
        remaining: usize,
        timestamp: Instant,
    },
    /// A request was rejected; nothing was recorded.
    PermitRejected {
        limiter_name: String,
        client_id: String,
        limit: usize,
        retry_after: Option<Duration>,
        timestamp: Instant,
    },
}

impl ResilienceEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitAcquired { .. } => "permit_acquired",
            RateLimiterEvent::PermitRejected { .. } => "permit_rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitAcquired { timestamp, .. }
            | RateLimiterEvent::PermitRejected { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { limiter_name, .. }
            | RateLimiterEvent::PermitRejected { limiter_name, .. } => limiter_name,
        }
    }
}
