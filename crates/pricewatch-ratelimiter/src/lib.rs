//! Per-client sliding-window rate limiting.
//!
//! Every client identity gets an ordered log of the timestamps of its
//! admitted requests. A request is admitted when fewer than `limit` requests
//! remain in the log after dropping the ones older than the window; rejected
//! requests are not logged, so a client hammering a closed window does not
//! extend its own lockout.
//!
//! The limit is chosen per call, which lets one limiter serve operations with
//! different budgets (see [`OperationLimits`]). The `*_scoped` methods keep a
//! separate log per scope, so each operation's budget is counted on its own.
//!
//! # Example
//!
//! ```
//! use pricewatch_ratelimiter::{OperationLimits, RateLimiter};
//! use std::time::Duration;
//!
//! let limiter = RateLimiter::builder()
//!     .name("gateway")
//!     .window(Duration::from_secs(60))
//!     .build();
//! let limits = OperationLimits::new(100).with_limit("sync_prices", 2);
//!
//! let limit = limits.limit_for("sync_prices");
//! assert!(limiter.check_and_record_scoped("sync_prices", "store-7", limit));
//! assert!(limiter.check_and_record_scoped("sync_prices", "store-7", limit));
//! assert!(limiter.acquire_scoped("sync_prices", "store-7", limit).is_err());
//! assert!(limiter.acquire_scoped("list_products", "store-7", 100).is_ok());
//! ```
//!
//! # Metrics
//!
//! With the `metrics` feature:
//!
//! - `ratelimiter_calls_total{ratelimiter, result="permitted"|"rejected"}`
//! - `ratelimiter_tracked_windows{ratelimiter}`

mod config;
mod error;
mod events;
mod limiter;
mod limits;
mod window;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use error::RateLimiterError;
pub use events::RateLimiterEvent;
pub use limiter::RateLimiter;
pub use limits::OperationLimits;
