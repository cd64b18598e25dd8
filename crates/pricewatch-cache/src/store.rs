//! Cache storage.

use crate::eviction::{EvictionOrder, EvictionPolicy};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
    seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_valid(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// Result of a lookup.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Lookup<V> {
    Hit(V),
    Miss,
    /// The key was present but past its TTL; it has been purged.
    Expired,
}

/// Entries plus their eviction order. Not synchronized; the cache wraps it
/// in a mutex so that a put and the eviction it triggers happen atomically.
#[derive(Debug)]
pub(crate) struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: EvictionOrder,
    capacity: usize,
    eviction_batch: usize,
    policy: EvictionPolicy,
}

impl<V: Clone> CacheStore<V> {
    pub(crate) fn new(capacity: usize, eviction_batch: usize, policy: EvictionPolicy) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: EvictionOrder::default(),
            capacity,
            eviction_batch,
            policy,
        }
    }

    pub(crate) fn get(&mut self, key: &str, now: Instant) -> Lookup<V> {
        let Some(entry) = self.entries.get_mut(key) else {
            return Lookup::Miss;
        };

        if !entry.is_valid(now) {
            let seq = entry.seq;
            self.entries.remove(key);
            self.order.remove(seq);
            return Lookup::Expired;
        }

        if self.policy.touches_on_read() {
            if let Some(seq) = self.order.touch(entry.seq) {
                entry.seq = seq;
            }
        }
        Lookup::Hit(entry.value.clone())
    }

    /// Stores `value` under `key` and returns how many entries were evicted
    /// to make room.
    pub(crate) fn insert(&mut self, key: String, value: V, ttl: Duration, now: Instant) -> usize {
        if let Some(existing) = self.entries.get_mut(&key) {
            self.order.remove(existing.seq);
            existing.seq = self.order.push(key);
            existing.value = value;
            existing.stored_at = now;
            existing.ttl = ttl;
            return 0;
        }

        let mut evicted = 0;
        if self.entries.len() >= self.capacity {
            for old in self.order.pop_oldest(self.eviction_batch) {
                if self.entries.remove(&old).is_some() {
                    evicted += 1;
                }
            }
        }

        let seq = self.order.push(key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                ttl,
                seq,
            },
        );
        evicted
    }

    /// Removes every key containing `pattern`.
    pub(crate) fn remove_matching(&mut self, pattern: &str) -> usize {
        self.remove_where(|key, _| key.contains(pattern))
    }

    /// Removes every entry past its TTL.
    pub(crate) fn purge_expired(&mut self, now: Instant) -> usize {
        self.remove_where(|_, entry| !entry.is_valid(now))
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&str, &CacheEntry<V>) -> bool) -> usize {
        let order = &mut self.order;
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            if pred(key.as_str(), &*entry) {
                order.remove(entry.seq);
                false
            } else {
                true
            }
        });
        before - self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
