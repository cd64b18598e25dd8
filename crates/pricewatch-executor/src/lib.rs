//! Resilient execution of outbound calls.
//!
//! [`ResilientExecutor::execute`] wraps one logical call to a dependency:
//!
//! 1. The dependency's circuit is consulted before *every* attempt. A refusal
//!    fails the call without further I/O: with `DependencyUnavailable` when
//!    nothing ran yet, otherwise with the last attempt's failure.
//! 2. Each attempt runs under a timeout. An attempt that overruns it is
//!    dropped and treated as a retryable timeout.
//! 3. Every attempt that ran is reported to the breaker exactly once.
//! 4. Transient failures (transport errors, `5xx` except `501`) and timeouts
//!    are retried after `base_delay * 2^attempt + jitter`, up to
//!    `max_retries` attempts in total. Permanent failures return at once.
//!
//! ```
//! use pricewatch_circuitbreaker::CircuitBreakerRegistry;
//! use pricewatch_core::CallError;
//! use pricewatch_executor::{ExecutorConfig, FixedInterval};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let breakers = CircuitBreakerRegistry::builder().build();
//! let executor = ExecutorConfig::builder()
//!     .timeout(Duration::from_secs(5))
//!     .max_retries(3)
//!     .backoff(FixedInterval::new(Duration::from_millis(1)))
//!     .build(breakers);
//!
//! let rows = executor
//!     .execute("record_store", || async { Ok::<_, CallError>(vec!["row"]) })
//!     .await
//!     .unwrap();
//! assert_eq!(rows, vec!["row"]);
//! # }
//! ```
//!
//! For `tower` services failing with [`CallError`], [`ResilientCallLayer`]
//! applies the same executor to every request.
//!
//! # Metrics
//!
//! With the `metrics` feature:
//!
//! - `executor_calls_total{executor, dependency, result}` (`success`,
//!   `failure`, `rejected`)
//! - `executor_attempts_total{executor, dependency, outcome}` (`success`,
//!   `transient`, `timeout`, `permanent`)
//! - `executor_retries_total{executor, dependency}`

mod backoff;
mod config;
mod events;
mod executor;
mod layer;

pub use backoff::{FixedInterval, IntervalFunction, JitteredExponentialBackoff};
pub use config::{ExecutorConfig, ExecutorConfigBuilder};
pub use events::ExecutorEvent;
pub use executor::{AttemptGuard, ResilientExecutor};
pub use layer::{ResilientCall, ResilientCallLayer};
