//! Time source used by every stateful component.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// A source of monotonic time.
///
/// Components never call [`Instant::now`] directly; they ask their clock. That
/// keeps sliding windows, cache TTLs and breaker cooldowns testable without
/// sleeping.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Shared, type-erased clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// The real monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Returns a shared handle to the system clock.
    pub fn shared() -> SharedClock {
        Arc::new(SystemClock)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use mock::MockClock;

#[cfg(any(test, feature = "test-util"))]
mod mock {
    use super::Clock;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::{Duration, Instant};

    /// Manually driven clock for tests.
    ///
    /// Clones share the same underlying instant, so a test can keep one handle
    /// and hand another to the component under test.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        current: Arc<Mutex<Instant>>,
    }

    impl MockClock {
        /// Creates a mock clock starting at the current real instant.
        pub fn new() -> Self {
            Self {
                current: Arc::new(Mutex::new(Instant::now())),
            }
        }

        /// Moves the clock forward.
        pub fn advance(&self, by: Duration) {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            *current += by;
        }

        /// Sets the clock to an absolute instant.
        pub fn set(&self, instant: Instant) {
            *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            *self.current.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}
