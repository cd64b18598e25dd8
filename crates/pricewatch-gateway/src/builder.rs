use crate::config::GatewayConfig;
use crate::gateway::{Inner, ResilienceGateway};
use crate::profile::OperationProfile;
use pricewatch_cache::{ResponseCache, ResponseCacheConfigBuilder};
use pricewatch_circuitbreaker::CircuitBreakerConfigBuilder;
use pricewatch_core::SharedClock;
use pricewatch_executor::ExecutorConfigBuilder;
use pricewatch_health::{ApiPerformanceThresholds, HealthWeights, LatencyEstimator, RequestMetrics};
use pricewatch_ratelimiter::{OperationLimits, RateLimiterConfigBuilder};
use std::collections::HashMap;
use std::sync::Arc;

/// Builder for a [`ResilienceGateway`].
///
/// Component builders are customised through closures:
///
/// ```
/// use pricewatch_gateway::{OperationProfile, ResilienceGateway};
/// use std::time::Duration;
///
/// let gateway: ResilienceGateway<Vec<String>> = ResilienceGateway::builder()
///     .name("provider-api")
///     .cache(|c| c.capacity(1_000).eviction_batch(100))
///     .circuit_breaker(|b| b.failure_threshold(5))
///     .executor(|e| e.max_retries(2).base_delay(Duration::from_millis(1_500)))
///     .operation("list_alerts", OperationProfile::read(300, Duration::from_secs(15)))
///     .operation("create_alert", OperationProfile::write(20, ["list_alerts"]))
///     .build();
///
/// assert_eq!(gateway.cache().capacity(), 1_000);
/// assert_eq!(gateway.limits().limit_for("create_alert"), 20);
/// ```
pub struct ResilienceGatewayBuilder {
    name: String,
    clock: Option<SharedClock>,
    cache: ResponseCacheConfigBuilder,
    limiter: RateLimiterConfigBuilder,
    breakers: CircuitBreakerConfigBuilder,
    executor: ExecutorConfigBuilder,
    limits: OperationLimits,
    operations: HashMap<String, OperationProfile>,
    default_dependency: String,
    latency_estimator: LatencyEstimator,
    health_weights: HealthWeights,
    api_thresholds: ApiPerformanceThresholds,
}

impl ResilienceGatewayBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            clock: None,
            cache: ResponseCacheConfigBuilder::new(),
            limiter: RateLimiterConfigBuilder::new(),
            breakers: CircuitBreakerConfigBuilder::new(),
            executor: ExecutorConfigBuilder::new(),
            limits: OperationLimits::default(),
            operations: HashMap::new(),
            default_dependency: "record_store".to_string(),
            latency_estimator: LatencyEstimator::default(),
            health_weights: HealthWeights::default(),
            api_thresholds: ApiPerformanceThresholds::default(),
        }
        .name("pricewatch")
    }

    /// Applies every setting of a loaded [`GatewayConfig`].
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut builder = Self::new()
            .name(config.name.clone())
            .default_dependency(config.default_dependency.clone())
            .default_rate_limit(config.rate_limit.default_limit)
            .latency_estimator(config.metrics.latency_estimator.into())
            .cache(|c| {
                c.capacity(config.cache.capacity)
                    .eviction_batch(config.cache.eviction_batch)
                    .eviction_policy(config.cache.eviction_policy.into())
            })
            .rate_limiter(|r| r.window(config.rate_limit.window()))
            .circuit_breaker(|b| {
                b.failure_threshold(config.circuit_breaker.failure_threshold)
                    .cooldown(config.circuit_breaker.cooldown())
                    .half_open_policy(config.circuit_breaker.half_open_policy.into())
            })
            .executor(|e| {
                e.timeout(config.retry.timeout())
                    .max_retries(config.retry.max_retries)
                    .base_delay(config.retry.base_delay())
                    .max_jitter(config.retry.max_jitter())
                    .count_permanent_failures(config.retry.count_permanent_failures)
            });

        if !config.health_weights.is_empty() {
            let weights = config
                .health_weights
                .iter()
                .fold(HealthWeights::empty(), |weights, (component, weight)| {
                    weights.with_weight(component.clone(), *weight)
                });
            builder = builder.health_weights(weights);
        }

        for (operation, profile) in &config.operations {
            builder = builder.operation(operation.clone(), profile.clone());
        }
        builder
    }

    /// Names the gateway and every component it builds.
    ///
    /// Component names set through the component closures afterwards take
    /// precedence.
    ///
    /// Default: `"pricewatch"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.cache = self.cache.name(self.name.clone());
        self.limiter = self.limiter.name(self.name.clone());
        self.breakers = self.breakers.name(self.name.clone());
        self.executor = self.executor.name(self.name.clone());
        self
    }

    /// Time source shared by the cache, the rate limiter and the breakers.
    ///
    /// Overrides clocks set through the component closures. Attempt timeouts
    /// and backoff delays always run on tokio's timer.
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Dependency used when neither the request nor the operation names one.
    ///
    /// Default: `"record_store"`
    pub fn default_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.default_dependency = dependency.into();
        self
    }

    /// Requests per window for operations without their own limit.
    ///
    /// Default: 100
    pub fn default_rate_limit(mut self, limit: usize) -> Self {
        let mut limits = OperationLimits::new(limit);
        for (operation, profile) in &self.operations {
            if let Some(limit) = profile.rate_limit {
                limits.set_limit(operation.clone(), limit);
            }
        }
        self.limits = limits;
        self
    }

    /// Registers how an operation is limited, cached and attributed.
    pub fn operation(mut self, name: impl Into<String>, profile: OperationProfile) -> Self {
        let name = name.into();
        if let Some(limit) = profile.rate_limit {
            self.limits.set_limit(name.clone(), limit);
        }
        self.operations.insert(name, profile);
        self
    }

    pub fn cache<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ResponseCacheConfigBuilder) -> ResponseCacheConfigBuilder,
    {
        self.cache = f(self.cache);
        self
    }

    pub fn rate_limiter<F>(mut self, f: F) -> Self
    where
        F: FnOnce(RateLimiterConfigBuilder) -> RateLimiterConfigBuilder,
    {
        self.limiter = f(self.limiter);
        self
    }

    pub fn circuit_breaker<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CircuitBreakerConfigBuilder) -> CircuitBreakerConfigBuilder,
    {
        self.breakers = f(self.breakers);
        self
    }

    pub fn executor<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ExecutorConfigBuilder) -> ExecutorConfigBuilder,
    {
        self.executor = f(self.executor);
        self
    }

    /// How the running latency average is maintained.
    ///
    /// Default: [`LatencyEstimator::Blended`]
    pub fn latency_estimator(mut self, estimator: LatencyEstimator) -> Self {
        self.latency_estimator = estimator;
        self
    }

    /// Weights used by [`ResilienceGateway::health`].
    ///
    /// Default: [`HealthWeights::default`]
    pub fn health_weights(mut self, weights: HealthWeights) -> Self {
        self.health_weights = weights;
        self
    }

    /// Limits used to grade the gateway's own error rate and latency.
    pub fn api_thresholds(mut self, thresholds: ApiPerformanceThresholds) -> Self {
        self.api_thresholds = thresholds;
        self
    }

    /// Builds the gateway.
    pub fn build<V>(self) -> ResilienceGateway<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        #[cfg(feature = "metrics")]
        crate::gateway::describe_metrics();

        let mut cache = self.cache;
        let mut limiter = self.limiter;
        let mut breakers = self.breakers;
        if let Some(clock) = self.clock {
            cache = cache.clock(Arc::clone(&clock));
            limiter = limiter.clock(Arc::clone(&clock));
            breakers = breakers.clock(clock);
        }

        let metrics = Arc::new(RequestMetrics::new(self.latency_estimator));
        let hits = Arc::clone(&metrics);
        let cache: ResponseCache<V> = cache.on_hit(move |_key| hits.record_cache_hit()).build();

        let breakers = breakers.build();
        let executor = self.executor.build(breakers.clone());

        ResilienceGateway {
            inner: Arc::new(Inner {
                name: self.name,
                limiter: limiter.build(),
                limits: self.limits,
                cache,
                breakers,
                executor,
                metrics,
                operations: self.operations,
                default_dependency: self.default_dependency,
                health_weights: self.health_weights,
                api_thresholds: self.api_thresholds,
            }),
        }
    }
}

impl Default for ResilienceGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
