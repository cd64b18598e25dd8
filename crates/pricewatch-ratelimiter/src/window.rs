//! Sliding request log for a single client.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    Admitted {
        /// Requests still available in the current window.
        remaining: usize,
    },
    Rejected {
        /// Time until the oldest retained request leaves the window.
        retry_after: Option<Duration>,
    },
}

/// Timestamps of the requests a client made within the window, oldest first.
///
/// Every retained timestamp satisfies `now - t < window`. Rejected requests
/// are never recorded.
#[derive(Debug, Default)]
pub(crate) struct ClientWindow {
    timestamps: VecDeque<Instant>,
}

impl ClientWindow {
    /// Drops timestamps that have fallen out of the window.
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Admits and records a request if fewer than `limit` are in the window.
    pub(crate) fn try_record(&mut self, now: Instant, window: Duration, limit: usize) -> Admission {
        self.prune(now, window);

        if self.timestamps.len() >= limit {
            let retry_after = self
                .timestamps
                .front()
                .map(|&oldest| window.saturating_sub(now.saturating_duration_since(oldest)));
            return Admission::Rejected { retry_after };
        }

        self.timestamps.push_back(now);
        Admission::Admitted {
            remaining: limit - self.timestamps.len(),
        }
    }

    /// Requests still available without recording anything.
    pub(crate) fn remaining(&mut self, now: Instant, window: Duration, limit: usize) -> usize {
        self.prune(now, window);
        limit.saturating_sub(self.timestamps.len())
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.timestamps.len()
    }
}
