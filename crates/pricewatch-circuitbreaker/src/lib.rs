//! Per-dependency circuit breakers.
//!
//! A [`CircuitBreakerRegistry`] keeps one circuit per named dependency
//! (the record store, the scraper, ...). Each circuit counts consecutive
//! failures:
//!
//! - **Closed**: calls flow; `failure_threshold` consecutive failures open it.
//! - **Open**: calls are rejected until `cooldown` has passed since the last
//!   failure.
//! - **HalfOpen**: entered lazily by the first check after the cooldown. The
//!   next success closes the circuit; the next failure re-opens it.
//!
//! Callers check before calling and report exactly once afterwards:
//!
//! ```
//! use pricewatch_circuitbreaker::{CircuitBreakerRegistry, CircuitState};
//! use std::time::Duration;
//!
//! let breakers = CircuitBreakerRegistry::builder()
//!     .name("gateway")
//!     .failure_threshold(3)
//!     .cooldown(Duration::from_secs(30))
//!     .build();
//!
//! for _ in 0..3 {
//!     assert!(breakers.can_execute("record_store").allowed);
//!     breakers.report("record_store", false);
//! }
//!
//! let permission = breakers.can_execute("record_store");
//! assert!(!permission.allowed);
//! assert_eq!(permission.state, CircuitState::Open);
//! ```
//!
//! # Metrics
//!
//! With the `metrics` feature, labelled by dependency:
//!
//! - `circuitbreaker_calls_total{circuitbreaker, outcome}` where outcome is
//!   `permitted`, `rejected`, `success` or `failure`
//! - `circuitbreaker_transitions_total{circuitbreaker, from, to}`
//! - `circuitbreaker_state{circuitbreaker}`

mod circuit;
mod config;
mod error;
mod events;
mod registry;

pub use circuit::{CallPermission, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder, HalfOpenPolicy};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;
pub use registry::{CircuitBreakerRegistry, CircuitSnapshot};
