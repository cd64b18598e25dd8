//! Eviction ordering.
//!
//! When a new key would push the cache above capacity, a batch of the
//! "oldest" entries is dropped. Which entries count as oldest depends on the
//! [`EvictionPolicy`].

use std::collections::BTreeMap;

/// Which entries a capacity eviction removes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Evict the entries stored longest ago. Reads do not change an entry's
    /// position; overwriting a key moves it to the back.
    #[default]
    InsertionOrder,

    /// Evict the entries accessed longest ago. A hit moves the entry to the
    /// back of the queue, like a write does.
    LeastRecentlyUsed,
}

impl EvictionPolicy {
    /// Whether a cache hit refreshes the entry's position.
    pub(crate) fn touches_on_read(self) -> bool {
        matches!(self, EvictionPolicy::LeastRecentlyUsed)
    }
}

/// Monotonic sequence numbers mapped to keys, oldest first.
#[derive(Debug, Default)]
pub(crate) struct EvictionOrder {
    queue: BTreeMap<u64, String>,
    next: u64,
}

impl EvictionOrder {
    /// Appends `key` and returns its sequence number.
    pub(crate) fn push(&mut self, key: String) -> u64 {
        let seq = self.next;
        self.next += 1;
        self.queue.insert(seq, key);
        seq
    }

    /// Moves the key at `seq` to the back, returning its new sequence number.
    pub(crate) fn touch(&mut self, seq: u64) -> Option<u64> {
        let key = self.queue.remove(&seq)?;
        Some(self.push(key))
    }

    pub(crate) fn remove(&mut self, seq: u64) {
        self.queue.remove(&seq);
    }

    /// Removes and returns up to `n` of the oldest keys.
    pub(crate) fn pop_oldest(&mut self, n: usize) -> Vec<String> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match self.queue.pop_first() {
                Some((_, key)) => out.push(key),
                None => break,
            }
        }
        out
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}
