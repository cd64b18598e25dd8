//! Response cache with per-entry TTL and bounded batch eviction.
//!
//! The cache stores successful responses keyed by a normalized [`CacheKey`].
//! Every entry carries its own TTL, chosen by the caller at `put` time; an
//! entry older than its TTL is treated as absent and purged on the next read.
//!
//! Capacity is enforced in batches: when a *new* key arrives at a full cache,
//! the `eviction_batch` oldest entries are dropped first. Overwriting an
//! existing key never evicts.
//!
//! # Example
//!
//! ```
//! use pricewatch_cache::{CacheKey, ResponseCache};
//! use std::time::Duration;
//!
//! let cache: ResponseCache<Vec<u32>> = ResponseCache::builder()
//!     .name("records")
//!     .capacity(500)
//!     .eviction_batch(50)
//!     .build();
//!
//! let key = CacheKey::new("products", [("store", "7")]);
//! assert!(cache.get(&key).is_none());
//!
//! cache.put(key.clone(), vec![1, 2, 3], Duration::from_secs(60));
//! assert_eq!(cache.get(&key), Some(vec![1, 2, 3]));
//!
//! assert_eq!(cache.invalidate_by_prefix("products"), 1);
//! assert!(cache.is_empty());
//! ```
//!
//! # Observability
//!
//! Listeners registered through the builder receive [`CacheEvent`]s. With the
//! `metrics` feature the cache records:
//!
//! - `cache_requests_total{cache, result="hit"|"miss"}`
//! - `cache_evictions_total{cache}`
//! - `cache_size{cache}`

mod config;
mod events;
mod eviction;
mod key;
mod store;

pub use config::{ResponseCacheConfig, ResponseCacheConfigBuilder};
pub use events::CacheEvent;
pub use eviction::EvictionPolicy;
pub use key::CacheKey;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use store::{CacheStore, Lookup};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

#[cfg(feature = "metrics")]
fn describe_metrics() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        describe_counter!(
            "cache_requests_total",
            "Total number of cache lookups (hits and misses)"
        );
        describe_counter!(
            "cache_evictions_total",
            "Total number of entries removed by capacity eviction"
        );
        describe_gauge!("cache_size", "Current number of entries in the cache");
    });
}

/// A shared response cache.
///
/// Cloning is cheap; clones share the same entries.
pub struct ResponseCache<V> {
    config: Arc<ResponseCacheConfig>,
    store: Arc<Mutex<CacheStore<V>>>,
}

impl<V> Clone for ResponseCache<V> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
        }
    }
}

impl ResponseCache<()> {
    /// Creates a new configuration builder.
    pub fn builder() -> ResponseCacheConfigBuilder {
        ResponseCacheConfigBuilder::new()
    }
}

impl<V: Clone> ResponseCache<V> {
    /// Creates a cache from a finished configuration.
    pub fn new(config: ResponseCacheConfig) -> Self {
        #[cfg(feature = "metrics")]
        describe_metrics();

        let store = CacheStore::new(
            config.capacity,
            config.eviction_batch,
            config.eviction_policy,
        );
        Self {
            config: Arc::new(config),
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore<V>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `key` if present and within its TTL.
    ///
    /// An expired entry is purged and reported as a miss.
    pub fn get(&self, key: impl AsRef<str>) -> Option<V> {
        let key = key.as_ref();
        let now = self.config.clock.now();
        let lookup = self.lock().get(key, now);
        let cache_name = &self.config.name;

        match lookup {
            Lookup::Hit(value) => {
                #[cfg(feature = "metrics")]
                counter!("cache_requests_total", "cache" => cache_name.clone(), "result" => "hit")
                    .increment(1);

                #[cfg(feature = "tracing")]
                debug!(cache = %cache_name, key, "Cache hit");

                self.config.event_listeners.emit(&CacheEvent::Hit {
                    cache_name: cache_name.clone(),
                    key: key.to_owned(),
                    timestamp: now,
                });
                Some(value)
            }
            Lookup::Miss | Lookup::Expired => {
                #[cfg(feature = "metrics")]
                counter!("cache_requests_total", "cache" => cache_name.clone(), "result" => "miss")
                    .increment(1);

                let event = if matches!(lookup, Lookup::Expired) {
                    #[cfg(feature = "metrics")]
                    gauge!("cache_size", "cache" => cache_name.clone()).decrement(1.0);

                    #[cfg(feature = "tracing")]
                    debug!(cache = %cache_name, key, "Cache entry expired");

                    CacheEvent::Expired {
                        cache_name: cache_name.clone(),
                        key: key.to_owned(),
                        timestamp: now,
                    }
                } else {
                    #[cfg(feature = "tracing")]
                    debug!(cache = %cache_name, key, "Cache miss");

                    CacheEvent::Miss {
                        cache_name: cache_name.clone(),
                        key: key.to_owned(),
                        timestamp: now,
                    }
                };
                self.config.event_listeners.emit(&event);
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl`.
    ///
    /// If `key` is new and the cache is full, the oldest `eviction_batch`
    /// entries are evicted first, under the same lock as the insert.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = self.config.clock.now();
        let (evicted, size) = {
            let mut store = self.lock();
            let evicted = store.insert(key.into(), value, ttl, now);
            (evicted, store.len())
        };

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone()).set(size as f64);
        #[cfg(not(feature = "metrics"))]
        let _ = size;

        if evicted > 0 {
            #[cfg(feature = "metrics")]
            counter!("cache_evictions_total", "cache" => self.config.name.clone())
                .increment(evicted as u64);

            #[cfg(feature = "tracing")]
            info!(cache = %self.config.name, evicted, "Cache full, evicted oldest entries");

            self.config.event_listeners.emit(&CacheEvent::Eviction {
                cache_name: self.config.name.clone(),
                evicted,
                timestamp: now,
            });
        }
    }

    /// Removes every entry whose key contains `pattern` and returns how many
    /// were removed.
    pub fn invalidate_by_prefix(&self, pattern: &str) -> usize {
        let (removed, size) = {
            let mut store = self.lock();
            let removed = store.remove_matching(pattern);
            (removed, store.len())
        };

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone()).set(size as f64);
        #[cfg(not(feature = "metrics"))]
        let _ = size;

        #[cfg(feature = "tracing")]
        debug!(cache = %self.config.name, pattern, removed, "Cache invalidated");

        self.config.event_listeners.emit(&CacheEvent::Invalidated {
            cache_name: self.config.name.clone(),
            pattern: pattern.to_owned(),
            removed,
            timestamp: self.config.clock.now(),
        });
        removed
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.config.clock.now();
        let mut store = self.lock();
        let purged = store.purge_expired(now);

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone()).set(store.len() as f64);

        purged
    }

    /// Removes all entries.
    pub fn clear(&self) {
        self.lock().clear();

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone()).set(0.0);
    }

    /// Number of stored entries, including ones that have expired but not
    /// yet been purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}
