//! Composite health of a gateway and its dependencies.

use crate::gateway::ResilienceGateway;
use pricewatch_health::{
    check_api_performance, check_cache, check_circuit_breakers, check_reachability, component,
    ComponentHealth, Components, HealthReport,
};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Checks whether an external resource answers at all.
///
/// Closures returning a `bool` future implement this trait:
///
/// ```
/// use pricewatch_gateway::{probe_reachability, ReachabilityProbe};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let database = || async { true };
/// let health = probe_reachability(&database, Duration::from_secs(2)).await;
/// assert!(health.status.is_healthy());
/// # }
/// ```
pub trait ReachabilityProbe: Send + Sync {
    fn ping(&self) -> impl Future<Output = bool> + Send;
}

impl<F, Fut> ReachabilityProbe for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send,
{
    fn ping(&self) -> impl Future<Output = bool> + Send {
        self()
    }
}

/// Runs `probe` with a deadline and grades the answer and its latency.
///
/// A probe that does not answer within `timeout` is unreachable.
pub async fn probe_reachability<P>(probe: &P, timeout: Duration) -> ComponentHealth
where
    P: ReachabilityProbe,
{
    let started = Instant::now();
    match tokio::time::timeout(timeout, probe.ping()).await {
        Ok(reachable) => check_reachability(reachable, Some(started.elapsed())),
        Err(_) => ComponentHealth::unhealthy(0)
            .with_message(format!("no answer within {} ms", timeout.as_millis())),
    }
}

impl<V> ResilienceGateway<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Components the gateway can grade from its own state: cache
    /// utilisation, API performance and the circuits of external
    /// dependencies.
    pub fn component_health(&self) -> Components {
        let inner = &*self.inner;
        let mut components = Components::new();
        components.insert(
            component::CACHE.to_string(),
            check_cache(inner.cache.len(), inner.cache.capacity()),
        );
        components.insert(
            component::API_PERFORMANCE.to_string(),
            check_api_performance(&inner.metrics.snapshot(), &inner.api_thresholds),
        );
        components.insert(
            component::EXTERNAL_DEPENDENCIES.to_string(),
            check_circuit_breakers(&inner.breakers.snapshots()),
        );
        components
    }

    /// Scores the gateway's own components together with `probed` ones
    /// (database, scraper, memory) using the configured weights.
    ///
    /// A weighted component missing from both contributes nothing to the
    /// score. A probed component replaces a built-in one of the same name.
    pub fn health(&self, probed: Components) -> HealthReport {
        let mut components = self.component_health();
        components.extend(probed);
        HealthReport::from_components(components, &self.inner.health_weights)
    }
}
