//! Provider-facing gateway for the pricewatch record store.
//!
//! A [`ResilienceGateway`] composes the resilience components in the order
//! every request passes through them:
//!
//! 1. **Rate limiter**: each client gets a sliding window per operation,
//!    checked against that operation's limit. Rejected requests go no further.
//! 2. **Response cache**: cacheable operations are answered from the cache
//!    while the entry's TTL lasts.
//! 3. **Resilient executor**: the outbound call runs with a per-attempt
//!    timeout, jittered exponential backoff and a circuit breaker per
//!    dependency.
//! 4. **Metrics**: outcome and latency feed the request metrics, which in turn
//!    feed the composite [`health`](ResilienceGateway::health) score.
//!
//! Operations are described by [`OperationProfile`]s, either through the
//! builder or loaded from TOML with [`GatewayConfig`].
//!
//! # Example
//!
//! ```
//! use pricewatch_core::CallError;
//! use pricewatch_gateway::{GatewayRequest, OperationProfile, ResilienceGateway};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let gateway = ResilienceGateway::builder()
//!     .name("provider-api")
//!     .operation("list_products", OperationProfile::read(300, Duration::from_secs(60)))
//!     .operation("sync_prices", OperationProfile::write(10, ["list_products"]))
//!     .build();
//!
//! let request = GatewayRequest::new("list_products", "client-1").param("store", "42");
//! let products = gateway
//!     .call(&request, || async { Ok::<_, CallError>(vec!["sku-1".to_string()]) })
//!     .await
//!     .unwrap();
//! assert_eq!(products, vec!["sku-1".to_string()]);
//!
//! // Served from the cache this time.
//! gateway
//!     .call(&request, || async { Ok::<_, CallError>(Vec::new()) })
//!     .await
//!     .unwrap();
//! assert_eq!(gateway.snapshot().metrics.cache_hits, 1);
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `metrics`: gateway counters (`gateway_requests_total`,
//!   `gateway_request_duration_seconds`, `gateway_invalidations_total`) plus
//!   the metrics of every component
//! - `tracing`: structured logging in the gateway and every component

mod builder;
mod config;
mod gateway;
mod health;
mod profile;
mod record;
mod request;
mod service;
mod snapshot;

pub use builder::ResilienceGatewayBuilder;
pub use config::{
    CacheSettings, CircuitBreakerSettings, ConfigError, EvictionSetting, GatewayConfig,
    HalfOpenSetting, LatencySetting, MetricsSettings, RateLimitSettings, RetrySettings,
    ValidationError,
};
pub use gateway::ResilienceGateway;
pub use health::{probe_reachability, ReachabilityProbe};
pub use profile::OperationProfile;
pub use record::{Record, RecordPage, RecordQuery};
pub use request::GatewayRequest;
pub use service::{GatewayLayer, GatewayService};
pub use snapshot::GatewaySnapshot;

pub use pricewatch_core::{CallError, ErrorKind, FailureClass, ResilienceError};
