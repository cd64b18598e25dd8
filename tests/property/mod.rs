//! Property-based tests for the pricewatch resilience components.

pub mod cache;
pub mod circuit_breaker;
pub mod rate_limiter;
pub mod scoring;
