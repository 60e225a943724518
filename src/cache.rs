//! In-memory result cache with a fixed time-to-live.
//!
//! Entries expire a fixed interval after insertion or when invalidated,
//! whichever comes first. There is no size bound and no eviction policy
//! beyond that; expired entries are dropped lazily on lookup.
//!
//! Time comes from a [`Clock`] so tests can move it by hand.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time-to-live used by the headline cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(900);

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The process monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry<V> {
    stored_at: Instant,
    value: V,
}

/// A map whose entries go stale `ttl` after they were written.
pub struct TtlCache<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: HashMap::new(),
        }
    }

    /// Return the live value for `key`, dropping it if it has expired.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.stored_at) >= self.ttl,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Store `value`, restarting the TTL for `key`.
    pub fn insert(&mut self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.entries.insert(key, Entry { stored_at, value });
    }

    /// Drop one entry. Returns whether a live or stale entry existed.
    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, including ones not yet found stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    now: std::sync::Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            now: std::sync::Mutex::new(Instant::now()),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}
