//! Cache events.

use pricewatch_core::ResilienceEvent;
use std::time::Instant;

/// Events emitted by a [`ResponseCache`](crate::ResponseCache).
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A valid entry was returned.
    Hit {
        cache_name: String,
        key: String,
        timestamp: Instant,
    },
    /// No entry existed for the key.
    Miss {
        cache_name: String,
        key: String,
        timestamp: Instant,
    },
    /// An entry existed but had outlived its TTL and was purged.
    Expired {
        cache_name: String,
        key: String,
        timestamp: Instant,
    },
    /// A put on a full cache evicted a batch of old entries.
    Eviction {
        cache_name: String,
        evicted: usize,
        timestamp: Instant,
    },
    /// Entries matching a pattern were invalidated.
    Invalidated {
        cache_name: String,
        pattern: String,
        removed: usize,
        timestamp: Instant,
    },
}

impl ResilienceEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "hit",
            CacheEvent::Miss { .. } => "miss",
            CacheEvent::Expired { .. } => "expired",
            CacheEvent::Eviction { .. } => "eviction",
            CacheEvent::Invalidated { .. } => "invalidated",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Expired { timestamp, .. }
            | CacheEvent::Eviction { timestamp, .. }
            | CacheEvent::Invalidated { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            CacheEvent::Hit { cache_name, .. }
            | CacheEvent::Miss { cache_name, .. }
            | CacheEvent::Expired { cache_name, .. }
            | CacheEvent::Eviction { cache_name, .. }
            | CacheEvent::Invalidated { cache_name, .. } => cache_name,
        }
    }
}
