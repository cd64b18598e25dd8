//! File-based gateway configuration.
//!
//! [`GatewayConfig`] mirrors the builder options of every component in a
//! serde-friendly shape. All durations are given in milliseconds. A config is
//! parsed, then validated as a whole; validation reports every problem it
//! finds rather than stopping at the first.
//!
//! ```
//! use pricewatch_gateway::GatewayConfig;
//!
//! let config = GatewayConfig::from_toml_str(
//!     r#"
//!     name = "provider-api"
//!
//!     [circuit_breaker]
//!     failure_threshold = 3
//!     cooldown_ms = 30000
//!
//!     [operations.list_products]
//!     rate_limit = 300
//!     cache_ttl_ms = 60000
//!
//!     [operations.sync_prices]
//!     rate_limit = 10
//!     invalidates = ["list_products", "price_history"]
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.operations.len(), 2);
//! assert_eq!(config.cache.capacity, 500);
//! ```

use crate::profile::OperationProfile;
use pricewatch_cache::EvictionPolicy;
use pricewatch_circuitbreaker::HalfOpenPolicy;
use pricewatch_health::LatencyEstimator;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Root configuration of a [`ResilienceGateway`](crate::ResilienceGateway).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Name used in logs and metric labels.
    pub name: String,
    /// Dependency used by operations that do not name one.
    pub default_dependency: String,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
    pub circuit_breaker: CircuitBreakerSettings,
    pub retry: RetrySettings,
    pub metrics: MetricsSettings,
    /// Health weights by component name. Empty means the standard weights.
    pub health_weights: BTreeMap<String, f64>,
    pub operations: BTreeMap<String, OperationProfile>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: "pricewatch".to_string(),
            default_dependency: "record_store".to_string(),
            cache: CacheSettings::default(),
            rate_limit: RateLimitSettings::default(),
            circuit_breaker: CircuitBreakerSettings::default(),
            retry: RetrySettings::default(),
            metrics: MetricsSettings::default(),
            health_weights: BTreeMap::new(),
            operations: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    pub capacity: usize,
    pub eviction_batch: usize,
    pub eviction_policy: EvictionSetting,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 500,
            eviction_batch: 50,
            eviction_policy: EvictionSetting::InsertionOrder,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionSetting {
    #[default]
    InsertionOrder,
    LeastRecentlyUsed,
}

impl From<EvictionSetting> for EvictionPolicy {
    fn from(setting: EvictionSetting) -> Self {
        match setting {
            EvictionSetting::InsertionOrder => EvictionPolicy::InsertionOrder,
            EvictionSetting::LeastRecentlyUsed => EvictionPolicy::LeastRecentlyUsed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitSettings {
    pub window_ms: u64,
    /// Limit for operations without their own `rate_limit`.
    pub default_limit: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            default_limit: 100,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
    pub half_open_policy: HalfOpenSetting,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_ms: 30_000,
            half_open_policy: HalfOpenSetting::Unrestricted,
        }
    }
}

impl CircuitBreakerSettings {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfOpenSetting {
    #[default]
    Unrestricted,
    SingleProbe,
}

impl From<HalfOpenSetting> for HalfOpenPolicy {
    fn from(setting: HalfOpenSetting) -> Self {
        match setting {
            HalfOpenSetting::Unrestricted => HalfOpenPolicy::Unrestricted,
            HalfOpenSetting::SingleProbe => HalfOpenPolicy::SingleProbe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    /// Bound on a single attempt.
    pub timeout_ms: u64,
    /// Total attempts, including the first.
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_jitter_ms: u64,
    /// Whether permanent failures count against the dependency's circuit.
    pub count_permanent_failures: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            base_delay_ms: 1_000,
            max_jitter_ms: 1_000,
            count_permanent_failures: true,
        }
    }
}

impl RetrySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsSettings {
    pub latency_estimator: LatencySetting,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencySetting {
    #[default]
    Blended,
    ArithmeticMean,
}

impl From<LatencySetting> for LatencyEstimator {
    fn from(setting: LatencySetting) -> Self {
        match setting {
            LatencySetting::Blended => LatencyEstimator::Blended,
            LatencySetting::ArithmeticMean => LatencyEstimator::ArithmeticMean,
        }
    }
}

/// One semantic problem found in a [`GatewayConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Error returned when loading a [`GatewayConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl GatewayConfig {
    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Checks value ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.default_dependency.trim().is_empty() {
            errors.push(ValidationError::new("default_dependency", "must not be empty"));
        }

        if self.cache.capacity == 0 {
            errors.push(ValidationError::new("cache.capacity", "must be at least 1"));
        }
        if self.cache.eviction_batch == 0 || self.cache.eviction_batch > self.cache.capacity {
            errors.push(ValidationError::new(
                "cache.eviction_batch",
                format!("must be between 1 and capacity ({})", self.cache.capacity),
            ));
        }

        if self.rate_limit.window_ms == 0 {
            errors.push(ValidationError::new("rate_limit.window_ms", "must be positive"));
        }
        if self.rate_limit.default_limit == 0 {
            errors.push(ValidationError::new(
                "rate_limit.default_limit",
                "must be at least 1",
            ));
        }

        if self.circuit_breaker.failure_threshold == 0 {
            errors.push(ValidationError::new(
                "circuit_breaker.failure_threshold",
                "must be at least 1",
            ));
        }
        if self.circuit_breaker.cooldown_ms == 0 {
            errors.push(ValidationError::new(
                "circuit_breaker.cooldown_ms",
                "must be positive",
            ));
        }

        if self.retry.timeout_ms == 0 {
            errors.push(ValidationError::new("retry.timeout_ms", "must be positive"));
        }
        if self.retry.max_retries == 0 {
            errors.push(ValidationError::new("retry.max_retries", "must be at least 1"));
        }

        for (component, weight) in &self.health_weights {
            if !weight.is_finite() || *weight < 0.0 {
                errors.push(ValidationError::new(
                    format!("health_weights.{component}"),
                    "must be a non-negative number",
                ));
            }
        }

        for (name, profile) in &self.operations {
            let field = |suffix: &str| format!("operations.{name}.{suffix}");

            if profile.rate_limit == Some(0) {
                errors.push(ValidationError::new(field("rate_limit"), "must be at least 1"));
            }
            if profile.cache_ttl_ms == Some(0) {
                errors.push(ValidationError::new(field("cache_ttl_ms"), "must be positive"));
            }
            if profile.is_cacheable() && profile.invalidates_cache() {
                errors.push(ValidationError::new(
                    field("invalidates"),
                    "a cached operation cannot invalidate other entries",
                ));
            }
            if profile.invalidates.iter().any(|p| p.is_empty()) {
                errors.push(ValidationError::new(
                    field("invalidates"),
                    "patterns must not be empty",
                ));
            }
            if profile
                .dependency
                .as_deref()
                .is_some_and(|d| d.trim().is_empty())
            {
                errors.push(ValidationError::new(field("dependency"), "must not be empty"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
