//! `CacheStore` over the shared in-process TTL cache

use std::time::Duration;

use async_trait::async_trait;
use gameap_common::cache::{Cache, CacheConfig, KeyPattern};
use gameap_core::CacheStore;
use gameap_domain::{GameapError, Result as DomainResult};

use crate::errors::InfraError;

/// In-memory store with per-entry TTL and glob pattern deletion
///
/// Clones share the same entries, so the handle returned by
/// [`MemoryCacheStore::cache`] can be handed to the expiry sweeper.
#[derive(Clone)]
pub struct MemoryCacheStore {
    cache: Cache<String, Vec<u8>>,
}

impl MemoryCacheStore {
    /// Unbounded store
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Store holding at most `max_entries`, evicting the least recently used
    pub fn bounded(max_entries: usize) -> Self {
        Self::with_config(CacheConfig::bounded(max_entries))
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self { cache: Cache::new(config) }
    }

    /// Underlying cache handle
    pub fn cache(&self) -> Cache<String, Vec<u8>> {
        self.cache.clone()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        Ok(self.cache.get(&key.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> DomainResult<()> {
        self.cache.insert_with_ttl(key.to_string(), value, Some(ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.cache.remove(&key.to_string());
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> DomainResult<()> {
        let pattern = KeyPattern::new(pattern).map_err(|e| GameapError::from(InfraError::from(e)))?;
        self.cache.remove_matching(&pattern);
        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.cache.clear();
        Ok(())
    }

    fn supports_pattern_delete(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryCacheStore::new();
        store.set("roles:all", b"[]".to_vec(), Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get("roles:all").await.unwrap(), Some(b"[]".to_vec()));

        store.delete("roles:all").await.unwrap();
        assert_eq!(store.get("roles:all").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_never_served() {
        let store = MemoryCacheStore::new();
        store.set("roles:all", b"[]".to_vec(), Duration::ZERO).await.unwrap();

        assert_eq!(store.get("roles:all").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pattern_delete_leaves_other_prefixes() {
        let store = MemoryCacheStore::new();
        let ttl = Duration::from_secs(60);
        store.set("roles:all", vec![1], ttl).await.unwrap();
        store.set("roles:users_7", vec![2], ttl).await.unwrap();
        store.set("permissions:users_7", vec![3], ttl).await.unwrap();

        store.delete_pattern("role*").await.unwrap();

        assert!(store.get("roles:all").await.unwrap().is_none());
        assert!(store.get("roles:users_7").await.unwrap().is_none());
        assert_eq!(store.get("permissions:users_7").await.unwrap(), Some(vec![3]));
        assert!(store.supports_pattern_delete());
    }

    #[tokio::test]
    async fn test_bounded_store_evicts() {
        let store = MemoryCacheStore::bounded(2);
        let ttl = Duration::from_secs(60);
        for key in ["a", "b", "c"] {
            store.set(key, vec![0], ttl).await.unwrap();
        }

        assert_eq!(store.cache().len(), 2);
    }
}
