//! Per-operation request handling profiles.

use serde::Deserialize;
use std::time::Duration;

/// How the gateway treats one logical operation.
///
/// An operation with a `cache_ttl_ms` is cacheable: successful responses are
/// stored under the request's [`CacheKey`](pricewatch_cache::CacheKey) for
/// that long. An operation with `invalidates` patterns is a write: after a
/// successful call every cached key containing one of the patterns is
/// dropped.
///
/// ```
/// use pricewatch_gateway::OperationProfile;
/// use std::time::Duration;
///
/// let read = OperationProfile::read(300, Duration::from_secs(60));
/// assert!(read.is_cacheable());
///
/// let write = OperationProfile::write(10, ["list_alerts", "alert_stats"]);
/// assert!(!write.is_cacheable());
/// assert_eq!(write.invalidates.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationProfile {
    /// Requests per window per client. Falls back to the gateway default.
    pub rate_limit: Option<usize>,
    /// TTL of cached responses, in milliseconds. `None` disables caching.
    pub cache_ttl_ms: Option<u64>,
    /// Substring patterns of cache keys dropped after a successful call.
    pub invalidates: Vec<String>,
    /// Dependency the operation calls. Falls back to the gateway default.
    pub dependency: Option<String>,
}

impl OperationProfile {
    /// A cacheable read.
    pub fn read(rate_limit: usize, ttl: Duration) -> Self {
        Self {
            rate_limit: Some(rate_limit),
            cache_ttl_ms: Some(duration_to_millis(ttl)),
            ..Self::default()
        }
    }

    /// A write that invalidates derived cache entries.
    pub fn write<I, S>(rate_limit: usize, invalidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rate_limit: Some(rate_limit),
            invalidates: invalidates.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A rate-limited operation that is neither cached nor invalidating.
    pub fn passthrough(rate_limit: usize) -> Self {
        Self {
            rate_limit: Some(rate_limit),
            ..Self::default()
        }
    }

    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = Some(dependency.into());
        self
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_ms.map(Duration::from_millis)
    }

    pub fn is_cacheable(&self) -> bool {
        self.cache_ttl_ms.is_some()
    }

    pub fn invalidates_cache(&self) -> bool {
        !self.invalidates.is_empty()
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
