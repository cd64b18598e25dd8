//! Core infrastructure for pricewatch.
//!
//! Everything the resilience components share lives here:
//! - [`Clock`] abstraction so windows, TTLs and cooldowns can be driven
//!   deterministically in tests
//! - Event system for observability hooks
//! - The error taxonomy surfaced to gateway callers ([`ResilienceError`]) and
//!   the failure type reported by outbound calls ([`CallError`])

pub mod clock;
pub mod error;
pub mod events;

#[cfg(any(test, feature = "test-util"))]
pub use clock::MockClock;
pub use clock::{Clock, SharedClock, SystemClock};
pub use error::{CallError, ErrorKind, FailureClass, ResilienceError};
pub use events::{EventListener, EventListeners, FnListener, ResilienceEvent};
