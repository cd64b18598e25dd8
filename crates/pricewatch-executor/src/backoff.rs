//! Delay between attempts.

use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Computes the delay before the next attempt.
pub trait IntervalFunction: Send + Sync + fmt::Debug {
    /// `attempt` is 0-based: the delay after the first failed attempt is
    /// `next_interval(0)`.
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// `base_delay * 2^attempt + random(0, max_jitter)`, optionally capped.
///
/// ```
/// use pricewatch_executor::{IntervalFunction, JitteredExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = JitteredExponentialBackoff::new(Duration::from_millis(1000))
///     .max_jitter(Duration::ZERO);
///
/// assert_eq!(backoff.next_interval(0), Duration::from_millis(1000));
/// assert_eq!(backoff.next_interval(1), Duration::from_millis(2000));
/// assert_eq!(backoff.next_interval(2), Duration::from_millis(4000));
/// ```
#[derive(Debug, Clone)]
pub struct JitteredExponentialBackoff {
    base_delay: Duration,
    max_jitter: Duration,
    max_interval: Option<Duration>,
}

impl JitteredExponentialBackoff {
    /// Creates a backoff with up to one second of jitter and no cap.
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            max_jitter: Duration::from_millis(1000),
            max_interval: None,
        }
    }

    /// Upper bound (exclusive) of the random delay added to every interval.
    pub fn max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Caps the exponential part of the interval.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    fn exponential(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt)
            .ok()
            .and_then(|a| 1u32.checked_shl(a))
            .unwrap_or(u32::MAX);
        let interval = self.base_delay.saturating_mul(factor);
        match self.max_interval {
            Some(max) => interval.min(max),
            None => interval,
        }
    }

    fn jitter(&self) -> Duration {
        let max = self.max_jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..max))
    }
}

impl IntervalFunction for JitteredExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        self.exponential(attempt) + self.jitter()
    }
}

/// The same delay after every attempt.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    duration: Duration,
}

impl FixedInterval {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.duration
    }
}
