//! Core cache implementation with per-entry TTL and configurable eviction
//!
//! Every entry carries its own expiry instant. `insert` uses the configured
//! default TTL, `insert_with_ttl` sets it explicitly. Expired entries are
//! dropped lazily on access and eagerly by [`Cache::cleanup_expired`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use super::config::{CacheConfig, EvictionPolicy};
use super::pattern::KeyPattern;
use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

/// Entry stored in the cache with metadata for eviction policies
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
    last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Internal storage for cache entries
#[derive(Debug)]
struct Storage<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> Storage<K, V> {
    fn new() -> Self {
        Self { entries: HashMap::new() }
    }
}

/// Generic thread-safe cache with per-entry TTL
///
/// Clones share storage and metrics.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use gameap_common::cache::{Cache, CacheConfig};
///
/// let cache: Cache<String, i32> = Cache::new(CacheConfig::ttl(Duration::from_secs(60)));
/// cache.insert("key".to_string(), 42);
/// cache.insert_with_ttl("short".to_string(), 7, Some(Duration::from_millis(10)));
/// assert_eq!(cache.get(&"key".to_string()), Some(42));
/// ```
pub struct Cache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    storage: Arc<RwLock<Storage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> Cache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a new cache with the given configuration using system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(Storage::new())),
            config,
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Insert a value using the configured default TTL
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Insert a value with an explicit TTL (`None` = never expires)
    ///
    /// If the cache is at capacity, one entry is evicted according to the
    /// configured policy first. Expired entries are reclaimed before any live
    /// entry is evicted.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        if let Some(max_size) = self.config.max_size {
            if storage.entries.len() >= max_size && !storage.entries.contains_key(&key) {
                let reclaimed = Self::purge_expired(&mut storage, now);
                self.record_expirations(reclaimed);
                if storage.entries.len() >= max_size {
                    self.evict_one(&mut storage);
                }
            }
        }

        storage.entries.insert(
            key,
            CacheEntry { value, expires_at: ttl.map(|ttl| now + ttl), last_accessed: now },
        );

        if self.config.track_metrics {
            self.metrics.record_insert();
        }
    }

    /// Get a value from the cache
    ///
    /// Returns `None` if the key doesn't exist or if the entry has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut storage = self.storage.write();

        let expired = match storage.entries.get(key) {
            None => {
                self.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };

        if expired {
            storage.entries.remove(key);
            self.record_miss();
            self.record_expirations(1);
            return None;
        }

        let entry = storage.entries.get_mut(key)?;
        entry.last_accessed = now;
        let value = entry.value.clone();
        if self.config.track_metrics {
            self.metrics.record_hit();
        }
        Some(value)
    }

    /// Get a value, computing and inserting it with the default TTL on a miss
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = f();
        self.insert(key, value.clone());
        value
    }

    /// Whether a live (unexpired) entry exists, without touching access
    /// metadata
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.storage.read().entries.get(key).is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remove a value from the cache
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.storage.write().entries.remove(key).map(|e| e.value);
        if removed.is_some() {
            self.record_removals(1);
        }
        removed
    }

    /// Remove every entry whose key satisfies `predicate`
    ///
    /// Returns the number of entries removed.
    pub fn remove_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut storage = self.storage.write();
        let before = storage.entries.len();
        storage.entries.retain(|key, _| !predicate(key));
        let removed = before - storage.entries.len();
        self.record_removals(removed);
        removed
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        let mut storage = self.storage.write();
        let removed = storage.entries.len();
        storage.entries.clear();
        self.record_removals(removed);
    }

    /// Current number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.storage.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the stored keys
    pub fn keys(&self) -> Vec<K> {
        self.storage.read().entries.keys().cloned().collect()
    }

    /// Remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let mut storage = self.storage.write();
        let removed = Self::purge_expired(&mut storage, now);
        self.record_expirations(removed);
        removed
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.len(), self.config.max_size)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn purge_expired(storage: &mut Storage<K, V>, now: Instant) -> usize {
        let before = storage.entries.len();
        storage.entries.retain(|_, entry| !entry.is_expired(now));
        before - storage.entries.len()
    }

    /// Evict one entry based on the configured policy
    fn evict_one(&self, storage: &mut Storage<K, V>) {
        let key_to_evict = match self.config.eviction_policy {
            EvictionPolicy::Lru => storage
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone()),
            EvictionPolicy::None => None,
        };

        if let Some(key) = key_to_evict {
            storage.entries.remove(&key);
            if self.config.track_metrics {
                self.metrics.record_eviction();
            }
        }
    }

    fn record_miss(&self) {
        if self.config.track_metrics {
            self.metrics.record_miss();
        }
    }

    fn record_expirations(&self, count: usize) {
        if self.config.track_metrics && count > 0 {
            self.metrics.record_expirations(count);
        }
    }

    fn record_removals(&self, count: usize) {
        if self.config.track_metrics && count > 0 {
            self.metrics.record_removals(count);
        }
    }
}

impl<V, C> Cache<String, V, C>
where
    V: Clone,
    C: Clock + Clone,
{
    /// Remove every key matching a glob pattern
    ///
    /// # Example
    /// ```
    /// use gameap_common::cache::{Cache, CacheConfig, KeyPattern};
    ///
    /// let cache: Cache<String, u8> = Cache::new(CacheConfig::default());
    /// cache.insert("roles:all".to_string(), 1);
    /// cache.insert("permissions:users_1".to_string(), 2);
    ///
    /// let removed = cache.remove_matching(&KeyPattern::new("roles*").unwrap());
    /// assert_eq!(removed, 1);
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn remove_matching(&self, pattern: &KeyPattern) -> usize {
        self.remove_where(|key| pattern.matches(key))
    }
}

impl<K, V, C> Clone for Cache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}
