use crate::builder::ResilienceGatewayBuilder;
use crate::profile::OperationProfile;
use crate::request::GatewayRequest;
use crate::snapshot::GatewaySnapshot;
use pricewatch_cache::ResponseCache;
use pricewatch_circuitbreaker::CircuitBreakerRegistry;
use pricewatch_core::{CallError, ResilienceError};
use pricewatch_executor::ResilientExecutor;
use pricewatch_health::{ApiPerformanceThresholds, HealthWeights, RequestMetrics};
use pricewatch_ratelimiter::{OperationLimits, RateLimiter};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

#[cfg(feature = "metrics")]
pub(crate) fn describe_metrics() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        describe_counter!(
            "gateway_requests_total",
            "Total number of gateway requests by operation and result"
        );
        describe_histogram!(
            "gateway_request_duration_seconds",
            "Duration of gateway requests that reached the executor"
        );
        describe_counter!(
            "gateway_invalidations_total",
            "Total number of cache entries dropped by write operations"
        );
    });
}

pub(crate) struct Inner<V> {
    pub(crate) name: String,
    pub(crate) limiter: RateLimiter,
    pub(crate) limits: OperationLimits,
    pub(crate) cache: ResponseCache<V>,
    pub(crate) breakers: CircuitBreakerRegistry,
    pub(crate) executor: ResilientExecutor,
    pub(crate) metrics: Arc<RequestMetrics>,
    pub(crate) operations: HashMap<String, OperationProfile>,
    pub(crate) default_dependency: String,
    pub(crate) health_weights: HealthWeights,
    pub(crate) api_thresholds: ApiPerformanceThresholds,
}

/// The resilience layer in front of the record store and other dependencies.
///
/// A gateway owns one rate limiter, one response cache, one circuit breaker
/// registry, one executor and one set of request metrics. Build it once at
/// startup and share clones; clones share all state.
pub struct ResilienceGateway<V> {
    pub(crate) inner: Arc<Inner<V>>,
}

impl<V> Clone for ResilienceGateway<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ResilienceGateway<()> {
    /// Creates a builder with the documented defaults.
    pub fn builder() -> ResilienceGatewayBuilder {
        ResilienceGatewayBuilder::new()
    }
}

impl<V> ResilienceGateway<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Runs one request through the resilience layer.
    ///
    /// 1. The client's rate window for the operation is checked; a rejection
    ///    returns [`ResilienceError::RateLimited`] without touching the cache,
    ///    the breaker or the request metrics.
    /// 2. Cacheable operations are answered from the cache when possible.
    /// 3. Otherwise `operation` runs through the executor against the
    ///    request's dependency.
    /// 4. The outcome and latency are recorded. A successful result is cached
    ///    for cacheable operations; write operations drop the cache entries
    ///    matching their invalidation patterns.
    pub async fn call<F, Fut>(
        &self,
        request: &GatewayRequest,
        operation: F,
    ) -> Result<V, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<V, CallError>>,
    {
        let inner = &*self.inner;
        let profile = inner.operations.get(&request.operation);
        let limit = inner.limits.limit_for(&request.operation);

        if let Err(err) = inner
            .limiter
            .acquire_scoped(&request.operation, &request.client_id, limit)
        {
            #[cfg(feature = "metrics")]
            counter!("gateway_requests_total", "gateway" => inner.name.clone(), "operation" => request.operation.clone(), "result" => "rate_limited")
                .increment(1);

            #[cfg(feature = "tracing")]
            debug!(
                gateway = %inner.name,
                operation = %request.operation,
                client_id = %request.client_id,
                limit,
                "request rejected by rate limiter"
            );

            return Err(err.into());
        }

        let cache_slot = profile
            .and_then(OperationProfile::cache_ttl)
            .map(|ttl| (request.cache_key(), ttl));

        if let Some((key, _)) = &cache_slot {
            if let Some(value) = inner.cache.get(key) {
                #[cfg(feature = "metrics")]
                counter!("gateway_requests_total", "gateway" => inner.name.clone(), "operation" => request.operation.clone(), "result" => "cache_hit")
                    .increment(1);

                return Ok(value);
            }
        }

        let dependency = self.dependency_for(request, profile);
        let started = Instant::now();
        let result = inner.executor.execute(dependency, operation).await;
        let elapsed = started.elapsed();

        inner
            .metrics
            .record_outcome(result.is_ok(), elapsed.as_secs_f64() * 1000.0);

        #[cfg(feature = "metrics")]
        {
            let outcome = match &result {
                Ok(_) => "success",
                Err(err) => err.kind().as_str(),
            };
            counter!("gateway_requests_total", "gateway" => inner.name.clone(), "operation" => request.operation.clone(), "result" => outcome)
                .increment(1);
            histogram!("gateway_request_duration_seconds", "gateway" => inner.name.clone(), "operation" => request.operation.clone())
                .record(elapsed.as_secs_f64());
        }

        match &result {
            Ok(value) => {
                if let Some((key, ttl)) = cache_slot {
                    inner.cache.put(key, value.clone(), ttl);
                }
                if let Some(profile) = profile {
                    self.invalidate_for(&request.operation, profile);
                }
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                warn!(
                    gateway = %inner.name,
                    operation = %request.operation,
                    dependency,
                    error = %_err,
                    retryable = _err.is_retryable(),
                    "request failed"
                );
            }
        }

        result
    }

    fn invalidate_for(&self, _operation: &str, profile: &OperationProfile) {
        let mut removed = 0;
        for pattern in &profile.invalidates {
            removed += self.inner.cache.invalidate_by_prefix(pattern);
        }

        if removed > 0 {
            #[cfg(feature = "metrics")]
            counter!("gateway_invalidations_total", "gateway" => self.inner.name.clone(), "operation" => _operation.to_owned())
                .increment(removed as u64);

            #[cfg(feature = "tracing")]
            debug!(
                gateway = %self.inner.name,
                operation = %_operation,
                removed,
                "write invalidated cached responses"
            );
        }
    }

    /// Dependency a request is attributed to: the request's override, then
    /// the operation's profile, then the gateway default.
    pub fn dependency_for<'a>(
        &'a self,
        request: &'a GatewayRequest,
        profile: Option<&'a OperationProfile>,
    ) -> &'a str {
        request
            .dependency
            .as_deref()
            .or_else(|| profile.and_then(|p| p.dependency.as_deref()))
            .unwrap_or(&self.inner.default_dependency)
    }

    /// Drops every cached response whose key contains `pattern`.
    pub fn invalidate(&self, pattern: &str) -> usize {
        self.inner.cache.invalidate_by_prefix(pattern)
    }

    /// Request metrics and the state of every known circuit.
    pub fn snapshot(&self) -> GatewaySnapshot {
        let inner = &*self.inner;
        GatewaySnapshot {
            name: inner.name.clone(),
            metrics: inner.metrics.snapshot(),
            circuits: inner.breakers.snapshots(),
            cache_size: inner.cache.len(),
            cache_capacity: inner.cache.capacity(),
            tracked_clients: inner.limiter.tracked_clients(),
        }
    }

    pub fn profile(&self, operation: &str) -> Option<&OperationProfile> {
        self.inner.operations.get(operation)
    }

    pub fn cache(&self) -> &ResponseCache<V> {
        &self.inner.cache
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub fn limits(&self) -> &OperationLimits {
        &self.inner.limits
    }

    pub fn breakers(&self) -> &CircuitBreakerRegistry {
        &self.inner.breakers
    }

    pub fn executor(&self) -> &ResilientExecutor {
        &self.inner.executor
    }

    pub fn metrics(&self) -> &RequestMetrics {
        &self.inner.metrics
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

impl<V> std::fmt::Debug for ResilienceGateway<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilienceGateway")
            .field("name", &self.inner.name)
            .field("default_dependency", &self.inner.default_dependency)
            .field("operations", &self.inner.operations.len())
            .finish()
    }
}
