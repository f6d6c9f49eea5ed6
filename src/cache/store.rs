//! Cache Store Module
//!
//! TTL cache with lazy per-key eviction and an explicit full sweep.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::stats::Counters;
use crate::cache::{CacheEntry, CacheStats};
use crate::clock::{duration_ms, Clock, SystemClock};

// == TTL Cache ==
/// Key-value store where every entry carries an expiry deadline.
///
/// Expired entries are invisible to readers. They are physically removed
/// either when their key is next read (`get`, `has`) or when a caller asks
/// for a full sweep (`size`, `stats`). There is no background timer and no
/// capacity limit.
#[derive(Debug)]
pub struct TtlCache<V, C = SystemClock> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Lifetime applied when `set` is called without an explicit TTL
    default_ttl: Duration,
    /// Lookup counters
    counters: Counters,
    /// Time source
    clock: C,
}

impl<V> TtlCache<V, SystemClock> {
    // == Constructor ==
    /// Creates an empty cache on the system clock.
    ///
    /// # Arguments
    /// * `default_ttl` - Lifetime for entries stored without an explicit TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, SystemClock)
    }
}

impl<V, C: Clock> TtlCache<V, C> {
    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(default_ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
            counters: Counters::default(),
            clock,
        }
    }

    /// Returns the TTL applied when none is given to `set`.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Set ==
    /// Stores a value, replacing any existing entry and its expiry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional lifetime (uses the default TTL if None)
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let ttl_ms = duration_ms(ttl.unwrap_or(self.default_ttl));
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_ms);
        self.entries.insert(key.into(), entry);
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry is removed before returning `None`.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.get_with_ttl(key).map(|(value, _)| value)
    }

    /// Like `get`, also returning the entry's remaining lifetime measured at
    /// the same instant as the expiry check.
    pub fn get_with_ttl(&mut self, key: &str) -> Option<(&V, Duration)> {
        let now = self.clock.now_ms();
        if !self.evict_if_expired(key, now) {
            self.counters.record_miss();
            return None;
        }

        self.counters.record_hit();
        self.entries.get(key).map(|entry| {
            (
                &entry.value,
                Duration::from_millis(entry.ttl_remaining_ms(now)),
            )
        })
    }

    // == Has ==
    /// Reports whether `key` holds a live entry, evicting it if expired.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.evict_if_expired(key, now)
    }

    // == Get Or Insert ==
    /// Returns the live value for `key`, or computes, stores and returns one.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `ttl` - Lifetime for a freshly computed value (default TTL if None)
    /// * `compute` - Called only on a miss
    pub fn get_or_insert_with<F>(&mut self, key: &str, ttl: Option<Duration>, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        let now = self.clock.now_ms();
        if self.evict_if_expired(key, now) {
            self.counters.record_hit();
        } else {
            self.counters.record_miss();
        }

        let ttl_ms = duration_ms(ttl.unwrap_or(self.default_ttl));
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(compute(), now, ttl_ms));
        &entry.value
    }

    // == Time To Live ==
    /// Returns how long the entry for `key` has left, without evicting.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| Duration::from_millis(entry.ttl_remaining_ms(now)))
    }

    // == Delete ==
    /// Removes the entry for `key`; returns whether one was stored.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Size ==
    /// Sweeps all expired entries, then returns the number left.
    pub fn size(&mut self) -> usize {
        self.sweep();
        self.entries.len()
    }

    // == Stats ==
    /// Sweeps all expired entries, then reports the live keys and counters.
    pub fn stats(&mut self) -> CacheStats {
        self.sweep();

        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort_unstable();

        CacheStats {
            size: keys.len(),
            keys,
            hits: self.counters.hits,
            misses: self.counters.misses,
            expirations: self.counters.expirations,
        }
    }

    // == Sweep ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        if removed > 0 {
            self.counters.record_expirations(removed);
            debug!(removed, remaining = self.entries.len(), "swept expired cache entries");
        }
        removed
    }

    /// Returns true if `key` holds a live entry at `now`; removes it if expired.
    fn evict_if_expired(&mut self, key: &str, now: u64) -> bool {
        match self.entries.get(key) {
            None => false,
            Some(entry) if entry.is_expired_at(now) => {
                self.entries.remove(key);
                self.counters.record_expirations(1);
                debug!(key, "evicted expired cache entry");
                false
            }
            Some(_) => true,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache_at_zero(default_ttl_ms: u64) -> (TtlCache<i32, ManualClock>, ManualClock) {
        let clock = ManualClock::new(0);
        let cache = TtlCache::with_clock(Duration::from_millis(default_ttl_ms), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_cache_new() {
        let mut cache: TtlCache<String> = TtlCache::new(Duration::from_secs(300));
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.default_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_set_and_get() {
        let (mut cache, _clock) = cache_at_zero(1_000);

        cache.set("key1", 1, None);
        assert_eq!(cache.get("key1"), Some(&1));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_get_nonexistent() {
        let (mut cache, _clock) = cache_at_zero(1_000);
        assert_eq!(cache.get("nonexistent"), None);
    }

    #[test]
    fn test_overwrite_replaces_value_and_expiry() {
        let (mut cache, clock) = cache_at_zero(1_000);

        cache.set("key1", 1, Some(Duration::from_millis(100)));
        clock.set(90);
        cache.set("key1", 2, Some(Duration::from_millis(100)));

        clock.set(150);
        assert_eq!(cache.get("key1"), Some(&2));
        assert_eq!(cache.size(), 1);

        clock.set(190);
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_default_ttl_scenario() {
        let (mut cache, clock) = cache_at_zero(100);

        cache.set("a", 42, None);

        clock.set(50);
        assert_eq!(cache.get("a"), Some(&42));

        clock.set(150);
        assert_eq!(cache.get("a"), None);
        assert!(!cache.has("a"));
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_get_evicts_expired_entry() {
        let (mut cache, clock) = cache_at_zero(100);

        cache.set("a", 1, None);
        clock.set(100);

        assert_eq!(cache.get("a"), None);
        // Physically gone: delete now reports nothing removed
        assert!(!cache.delete("a"));
    }

    #[test]
    fn test_has_evicts_expired_entry() {
        let (mut cache, clock) = cache_at_zero(100);

        cache.set("a", 1, None);
        assert!(cache.has("a"));

        clock.set(100);
        assert!(!cache.has("a"));
        assert!(!cache.delete("a"));
    }

    #[test]
    fn test_lazy_eviction_only_touches_read_key() {
        let (mut cache, clock) = cache_at_zero(100);

        cache.set("a", 1, None);
        cache.set("b", 2, None);
        clock.set(200);

        assert_eq!(cache.get("a"), None);
        // "b" is expired but still stored until swept
        assert!(cache.delete("b"));
    }

    #[test]
    fn test_zero_ttl_is_never_visible() {
        let (mut cache, _clock) = cache_at_zero(100);

        cache.set("a", 1, Some(Duration::ZERO));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_delete() {
        let (mut cache, _clock) = cache_at_zero(1_000);

        cache.set("key1", 1, None);
        assert!(cache.delete("key1"));
        assert!(!cache.delete("key1"));
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_clear() {
        let (mut cache, _clock) = cache_at_zero(1_000);

        cache.set("a", 1, None);
        cache.set("b", 2, None);
        cache.clear();

        assert_eq!(cache.size(), 0);
        assert!(!cache.has("a"));
    }

    #[test]
    fn test_size_sweeps_and_is_idempotent() {
        let (mut cache, clock) = cache_at_zero(1_000);

        cache.set("short", 1, Some(Duration::from_millis(100)));
        cache.set("long", 2, Some(Duration::from_secs(10)));
        clock.set(500);

        assert_eq!(cache.size(), 1);
        assert_eq!(cache.size(), 1);
        assert!(!cache.delete("short"));
    }

    #[test]
    fn test_stats_reports_sorted_live_keys() {
        let (mut cache, clock) = cache_at_zero(1_000);

        cache.set("b", 1, None);
        cache.set("a", 2, None);
        cache.set("gone", 3, Some(Duration::from_millis(10)));
        clock.set(20);

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.keys, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_stats_counts_hits_and_misses() {
        let (mut cache, _clock) = cache_at_zero(1_000);

        cache.set("key1", 1, None);
        cache.get("key1");
        cache.get("nonexistent");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_sweep_returns_removed_count() {
        let (mut cache, clock) = cache_at_zero(100);

        cache.set("a", 1, None);
        cache.set("b", 2, None);
        cache.set("c", 3, Some(Duration::from_secs(5)));
        clock.set(101);

        assert_eq!(cache.sweep(), 2);
        assert_eq!(cache.sweep(), 0);
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let (mut cache, clock) = cache_at_zero(100);
        let mut calls = 0;

        assert_eq!(
            *cache.get_or_insert_with("k", None, || {
                calls += 1;
                10
            }),
            10
        );
        assert_eq!(
            *cache.get_or_insert_with("k", None, || {
                calls += 1;
                20
            }),
            10
        );
        assert_eq!(calls, 1);

        clock.set(100);
        assert_eq!(*cache.get_or_insert_with("k", None, || 30), 30);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_get_with_ttl_reads_one_instant() {
        let (mut cache, clock) = cache_at_zero(1_000);

        cache.set("a", 1, None);
        clock.set(999);
        assert_eq!(cache.get_with_ttl("a"), Some((&1, Duration::from_millis(1))));

        clock.set(1_000);
        assert_eq!(cache.get_with_ttl("a"), None);
        assert!(!cache.delete("a"));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_ttl_remaining() {
        let (mut cache, clock) = cache_at_zero(1_000);

        cache.set("a", 1, None);
        clock.set(400);
        assert_eq!(cache.ttl_remaining("a"), Some(Duration::from_millis(600)));

        clock.set(1_000);
        assert_eq!(cache.ttl_remaining("a"), None);
        assert_eq!(cache.ttl_remaining("missing"), None);
    }
}
