//! Per-operation request budgets.

use std::collections::HashMap;

/// Requests per window allowed for each operation, with a fallback.
///
/// ```
/// use pricewatch_ratelimiter::OperationLimits;
///
/// let limits = OperationLimits::new(100)
///     .with_limit("sync_prices", 10)
///     .with_limit("health", 300);
///
/// assert_eq!(limits.limit_for("sync_prices"), 10);
/// assert_eq!(limits.limit_for("list_products"), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationLimits {
    default_limit: usize,
    per_operation: HashMap<String, usize>,
}

impl OperationLimits {
    pub fn new(default_limit: usize) -> Self {
        Self {
            default_limit,
            per_operation: HashMap::new(),
        }
    }

    /// Sets the limit for one operation.
    pub fn with_limit(mut self, operation: impl Into<String>, limit: usize) -> Self {
        self.set_limit(operation, limit);
        self
    }

    pub fn set_limit(&mut self, operation: impl Into<String>, limit: usize) {
        self.per_operation.insert(operation.into(), limit);
    }

    /// The limit for `operation`, or the default if none was configured.
    pub fn limit_for(&self, operation: &str) -> usize {
        self.per_operation
            .get(operation)
            .copied()
            .unwrap_or(self.default_limit)
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }
}

impl Default for OperationLimits {
    /// 100 requests per window for anything not configured.
    fn default() -> Self {
        Self::new(100)
    }
}
