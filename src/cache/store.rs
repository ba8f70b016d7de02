//! TTL Cache Module
//!
//! Key/value map where every entry carries an absolute expiry. Expiry is lazy:
//! a read that finds a stale entry removes it and reports a miss. There is no
//! background sweep.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == TTL Cache ==
/// In-memory cache with one TTL shared by every entry.
///
/// Unbounded unless built with [`TtlCache::bounded`], in which case the least
/// recently used key is dropped once `max_entries` is reached, possibly
/// before its TTL has elapsed.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
    /// Recency tracking, only present when a size bound is configured
    lru: Option<LruTracker>,
    max_entries: usize,
    stats: CacheStats,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an unbounded cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            lru: None,
            max_entries: 0,
            stats: CacheStats::new(),
        }
    }

    /// Creates a cache holding at most `max_entries` keys. `0` means unbounded.
    pub fn bounded(ttl: Duration, max_entries: usize) -> Self {
        let mut cache = Self::new(ttl);
        if max_entries > 0 {
            cache.lru = Some(LruTracker::new());
            cache.max_entries = max_entries;
        }
        cache
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// A stale entry is removed before `None` is returned, so callers never
    /// observe an expired value.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expiration();
            return None;
        }

        self.stats.record_hit();
        if let Some(lru) = self.lru.as_mut() {
            lru.touch(key);
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores `value` under `key`, overwriting any previous entry and
    /// restarting its TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if let Some(lru) = self.lru.as_mut() {
            if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
                if let Some(evicted) = lru.evict_oldest() {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
            }
            lru.touch(&key);
        }

        self.entries.insert(key, CacheEntry::new(value, self.ttl));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Some(lru) = self.lru.as_mut() {
            lru.clear();
        }
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including stale ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(lru) = self.lru.as_mut() {
            lru.remove(key);
        }
        self.stats.set_total_entries(self.entries.len());
    }
}
