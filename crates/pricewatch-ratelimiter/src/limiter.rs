use crate::config::{RateLimiterConfig, RateLimiterConfigBuilder};
use crate::error::RateLimiterError;
use crate::events::RateLimiterEvent;
use crate::window::{Admission, ClientWindow};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

#[cfg(feature = "metrics")]
fn describe_metrics() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        describe_counter!(
            "ratelimiter_calls_total",
            "Total number of admission checks (permitted or rejected)"
        );
        describe_gauge!(
            "ratelimiter_tracked_windows",
            "Number of request windows, one per scope and client"
        );
    });
}

/// Scope used by the unscoped methods.
const GLOBAL_SCOPE: &str = "";

/// Per-client sliding-window rate limiter.
///
/// Each (scope, client) pair gets its own request log, created lazily on
/// first use. A scope is typically an operation name, so a client's reads
/// and writes are counted against separate limits. The check and the record
/// happen under the window's shard lock, so concurrent requests from one
/// client can never overshoot the limit.
///
/// Cloning is cheap; clones share the same windows.
#[derive(Clone)]
pub struct RateLimiter {
    config: Arc<RateLimiterConfig>,
    windows: Arc<DashMap<WindowKey, ClientWindow>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WindowKey {
    scope: String,
    client_id: String,
}

impl WindowKey {
    fn new(scope: &str, client_id: &str) -> Self {
        Self {
            scope: scope.to_owned(),
            client_id: client_id.to_owned(),
        }
    }
}

impl RateLimiter {
    /// Creates a new configuration builder.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::new()
    }

    pub fn new(config: RateLimiterConfig) -> Self {
        #[cfg(feature = "metrics")]
        describe_metrics();

        Self {
            config: Arc::new(config),
            windows: Arc::new(DashMap::new()),
        }
    }

    fn admit(&self, scope: &str, client_id: &str, limit: usize) -> Admission {
        let now = self.config.clock.now();
        let key = WindowKey::new(scope, client_id);
        let admission = match self.windows.get_mut(&key) {
            Some(mut window) => window.try_record(now, self.config.window, limit),
            None => {
                let admission = self
                    .windows
                    .entry(key)
                    .or_default()
                    .try_record(now, self.config.window, limit);

                #[cfg(feature = "metrics")]
                gauge!("ratelimiter_tracked_windows", "ratelimiter" => self.config.name.clone())
                    .set(self.windows.len() as f64);

                admission
            }
        };

        let limiter_name = &self.config.name;
        match admission {
            Admission::Admitted { remaining } => {
                #[cfg(feature = "metrics")]
                counter!("ratelimiter_calls_total", "ratelimiter" => limiter_name.clone(), "result" => "permitted")
                    .increment(1);

                #[cfg(feature = "tracing")]
                debug!(ratelimiter = %limiter_name, scope, client_id, remaining, "Request permitted");

                self.config
                    .event_listeners
                    .emit(&RateLimiterEvent::PermitAcquired {
                        limiter_name: limiter_name.clone(),
                        client_id: client_id.to_owned(),
                        remaining,
                        timestamp: now,
                    });
            }
            Admission::Rejected { retry_after } => {
                #[cfg(feature = "metrics")]
                counter!("ratelimiter_calls_total", "ratelimiter" => limiter_name.clone(), "result" => "rejected")
                    .increment(1);

                #[cfg(feature = "tracing")]
                warn!(ratelimiter = %limiter_name, scope, client_id, limit, ?retry_after, "Rate limit exceeded");

                self.config
                    .event_listeners
                    .emit(&RateLimiterEvent::PermitRejected {
                        limiter_name: limiter_name.clone(),
                        client_id: client_id.to_owned(),
                        limit,
                        retry_after,
                        timestamp: now,
                    });
            }
        }
        admission
    }

    /// Admits the request and records it if the client has made fewer than
    /// `limit` requests within the window. Rejected requests are not recorded.
    pub fn check_and_record(&self, client_id: &str, limit: usize) -> bool {
        self.check_and_record_scoped(GLOBAL_SCOPE, client_id, limit)
    }

    /// Like [`check_and_record`](Self::check_and_record), against the
    /// client's window for `scope` only.
    pub fn check_and_record_scoped(&self, scope: &str, client_id: &str, limit: usize) -> bool {
        matches!(
            self.admit(scope, client_id, limit),
            Admission::Admitted { .. }
        )
    }

    /// Like [`check_and_record`](Self::check_and_record), but reports how long
    /// the client should wait when rejected.
    pub fn acquire(&self, client_id: &str, limit: usize) -> Result<(), RateLimiterError> {
        self.acquire_scoped(GLOBAL_SCOPE, client_id, limit)
    }

    pub fn acquire_scoped(
        &self,
        scope: &str,
        client_id: &str,
        limit: usize,
    ) -> Result<(), RateLimiterError> {
        match self.admit(scope, client_id, limit) {
            Admission::Admitted { .. } => Ok(()),
            Admission::Rejected { retry_after } => Err(RateLimiterError::RateLimitExceeded {
                client_id: client_id.to_owned(),
                limit,
                retry_after,
            }),
        }
    }

    /// Requests the client may still make in the current window under
    /// `limit`. Does not record anything.
    pub fn remaining(&self, client_id: &str, limit: usize) -> usize {
        self.remaining_scoped(GLOBAL_SCOPE, client_id, limit)
    }

    pub fn remaining_scoped(&self, scope: &str, client_id: &str, limit: usize) -> usize {
        let now = self.config.clock.now();
        match self.windows.get_mut(&WindowKey::new(scope, client_id)) {
            Some(mut window) => window.remaining(now, self.config.window, limit),
            None => limit,
        }
    }

    /// Number of distinct client identities seen so far, across scopes.
    pub fn tracked_clients(&self) -> usize {
        self.windows
            .iter()
            .map(|entry| entry.key().client_id.clone())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of request windows, one per (scope, client) pair.
    pub fn tracked_windows(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self) -> Duration {
        self.config.window
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.config.name)
            .field("window", &self.config.window)
            .field("tracked_windows", &self.windows.len())
            .finish()
    }
}
