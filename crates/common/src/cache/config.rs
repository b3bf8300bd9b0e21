//! Sizing and expiry settings for [`Cache`](super::Cache)

use std::time::Duration;

/// What to drop when a bounded cache is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Drop the least recently read or written entry
    #[default]
    Lru,
    /// Never evict; `max_size` only triggers reclaiming expired entries
    None,
}

/// Configuration for cache behavior
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum number of entries (None = unlimited)
    pub max_size: Option<usize>,

    /// TTL applied by `insert` (None = no expiration). `insert_with_ttl`
    /// overrides it per entry.
    pub default_ttl: Option<Duration>,

    /// Eviction policy when max_size is reached
    pub eviction_policy: EvictionPolicy,

    /// Whether to collect access metrics
    pub track_metrics: bool,
}

impl CacheConfig {
    /// Unbounded cache whose entries expire after `duration` by default
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use gameap_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::ttl(Duration::from_secs(60));
    /// assert_eq!(config.default_ttl, Some(Duration::from_secs(60)));
    /// ```
    pub fn ttl(duration: Duration) -> Self {
        Self {
            default_ttl: Some(duration),
            eviction_policy: EvictionPolicy::None,
            ..Self::default()
        }
    }

    /// LRU cache holding at most `max_size` entries, with metrics enabled
    pub fn bounded(max_size: usize) -> Self {
        Self { max_size: Some(max_size), track_metrics: true, ..Self::default() }
    }

    /// Bounded LRU cache with a default TTL
    pub fn ttl_lru(ttl: Duration, max_size: usize) -> Self {
        Self { max_size: Some(max_size), default_ttl: Some(ttl), ..Self::default() }
    }

    /// Enable hit/miss/eviction counters
    #[must_use]
    pub fn with_metrics(mut self) -> Self {
        self.track_metrics = true;
        self
    }

    #[must_use]
    pub fn with_eviction(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded_without_expiry() {
        let config = CacheConfig::default();
        assert!(config.max_size.is_none());
        assert!(config.default_ttl.is_none());
        assert_eq!(config.eviction_policy, EvictionPolicy::Lru);
        assert!(!config.track_metrics);
    }

    #[test]
    fn test_ttl_preset_disables_eviction() {
        let config = CacheConfig::ttl(Duration::from_secs(60));

        assert!(config.max_size.is_none());
        assert_eq!(config.default_ttl, Some(Duration::from_secs(60)));
        assert_eq!(config.eviction_policy, EvictionPolicy::None);
    }

    #[test]
    fn test_bounded_preset_tracks_metrics() {
        let config = CacheConfig::bounded(500).with_eviction(EvictionPolicy::None);

        assert_eq!(config.max_size, Some(500));
        assert_eq!(config.eviction_policy, EvictionPolicy::None);
        assert!(config.track_metrics);
    }
}
