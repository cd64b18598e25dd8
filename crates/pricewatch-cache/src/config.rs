//! Configuration for the response cache.

use crate::events::CacheEvent;
use crate::eviction::EvictionPolicy;
use crate::ResponseCache;
use pricewatch_core::{EventListeners, FnListener, SharedClock, SystemClock};

/// Configuration for a [`ResponseCache`].
pub struct ResponseCacheConfig {
    pub(crate) capacity: usize,
    pub(crate) eviction_batch: usize,
    pub(crate) eviction_policy: EvictionPolicy,
    pub(crate) clock: SharedClock,
    pub(crate) event_listeners: EventListeners<CacheEvent>,
    pub(crate) name: String,
}

impl ResponseCacheConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ResponseCacheConfigBuilder {
        ResponseCacheConfigBuilder::new()
    }
}

/// Builder for a [`ResponseCache`].
pub struct ResponseCacheConfigBuilder {
    capacity: usize,
    eviction_batch: usize,
    eviction_policy: EvictionPolicy,
    clock: Option<SharedClock>,
    event_listeners: EventListeners<CacheEvent>,
    name: String,
}

impl ResponseCacheConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            capacity: 500,
            eviction_batch: 50,
            eviction_policy: EvictionPolicy::default(),
            clock: None,
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Maximum number of entries held at once.
    ///
    /// Default: 500. A capacity of zero is raised to one.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Number of entries evicted when a new key arrives at a full cache.
    ///
    /// Default: 50. Clamped to `1..=capacity` at build time.
    pub fn eviction_batch(mut self, batch: usize) -> Self {
        self.eviction_batch = batch;
        self
    }

    /// Default: [`EvictionPolicy::InsertionOrder`]
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    /// Time source used for TTL checks.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the name of this cache instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with the key of every cache hit.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Hit { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked with the key of every miss, including
    /// misses caused by expiry.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| match event {
            CacheEvent::Miss { key, .. } | CacheEvent::Expired { key, .. } => f(key),
            _ => {}
        }));
        self
    }

    /// Registers a callback invoked with the number of entries evicted by a
    /// capacity eviction.
    pub fn on_eviction<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Eviction { evicted, .. } = event {
                f(*evicted);
            }
        }));
        self
    }

    /// Registers a callback invoked with the pattern and removal count of
    /// every invalidation.
    pub fn on_invalidated<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Invalidated {
                pattern, removed, ..
            } = event
            {
                f(pattern, *removed);
            }
        }));
        self
    }

    pub(crate) fn into_config(self) -> ResponseCacheConfig {
        let capacity = self.capacity.max(1);
        ResponseCacheConfig {
            capacity,
            eviction_batch: self.eviction_batch.clamp(1, capacity),
            eviction_policy: self.eviction_policy,
            clock: self.clock.unwrap_or_else(SystemClock::shared),
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the cache.
    pub fn build<V: Clone>(self) -> ResponseCache<V> {
        ResponseCache::new(self.into_config())
    }
}

impl Default for ResponseCacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
