//! TTL Cache Module
//!
//! Key-addressed store where every entry carries an expiry instant. Expired
//! entries are evicted lazily on read; an optional capacity bound evicts the
//! least recently used entry on insert.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Options ==
/// Construction parameters for a [`TtlCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Lifetime of every entry, in whole seconds
    pub ttl_seconds: u64,
    /// Upper bound on stored entries; `None` keeps the cache unbounded
    pub max_entries: Option<usize>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl_seconds: crate::config::DEFAULT_QUERY_CACHE_TTL,
            max_entries: None,
        }
    }
}

// == TTL Cache ==
/// Process-local key/value cache with a fixed time-to-live.
///
/// Keys are compared with `Hash + Eq`, so two structurally equal keys always
/// address the same entry regardless of how they were built.
///
/// The cache never fails: lookups return `Option`, writes always succeed.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Access order, only maintained when `max_entries` is set
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
    ttl: Duration,
    max_entries: Option<usize>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructors ==
    /// Creates an unbounded cache whose entries live for `ttl_seconds`.
    pub fn new(ttl_seconds: u64) -> Self {
        Self::with_options(CacheOptions {
            ttl_seconds,
            max_entries: None,
        })
    }

    /// Creates a cache holding at most `max_entries` entries (minimum 1).
    pub fn with_capacity(ttl_seconds: u64, max_entries: usize) -> Self {
        Self::with_options(CacheOptions {
            ttl_seconds,
            max_entries: Some(max_entries),
        })
    }

    pub fn with_options(options: CacheOptions) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            ttl: Duration::from_secs(options.ttl_seconds),
            max_entries: options.max_entries.map(|max| max.max(1)),
        }
    }

    // == Get ==
    /// Retrieves a fresh value by key.
    ///
    /// Returns `None` when the key is unknown or its entry has expired. An
    /// expired entry is removed as a side effect; there is no background
    /// sweep involved.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = Instant::now();

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        if self.max_entries.is_some() {
            self.lru.touch(key);
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value, replacing any previous entry and restarting its TTL.
    ///
    /// Under a capacity bound, inserting a new key into a full cache evicts
    /// the least recently used entry first.
    pub fn set(&mut self, key: K, value: V) {
        if let Some(max_entries) = self.max_entries {
            let is_overwrite = self.entries.contains_key(&key);
            if !is_overwrite && self.entries.len() >= max_entries {
                if let Some(evicted) = self.lru.evict_oldest() {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
            }
            self.lru.touch(&key);
        }

        self.entries.insert(key, CacheEntry::new(value, self.ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was stored under `key`.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove_entry(key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Removes every expired entry and returns how many were dropped.
    ///
    /// Not needed for correctness; long-lived processes call it (or run
    /// [`spawn_purge_task`](crate::tasks::spawn_purge_task)) to bound memory.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    /// Remaining lifetime of a fresh entry, `None` if absent or expired.
    pub fn ttl_remaining(&self, key: &K) -> Option<Duration> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            if self.max_entries.is_some() {
                self.lru.remove(key);
            }
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }
}
