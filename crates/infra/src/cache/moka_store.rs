//! `CacheStore` over `moka::future::Cache`
//!
//! Moka cannot enumerate keys by pattern, so this store reports no pattern
//! support and callers fall back to a full clear.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use gameap_common::CommonError;
use gameap_core::CacheStore;
use gameap_domain::Result as DomainResult;
use moka::future::Cache;
use moka::Expiry;

use crate::errors::InfraError;

/// Cached bytes together with the TTL they were written with
#[derive(Debug, Clone)]
struct TimedValue {
    bytes: Vec<u8>,
    ttl: Duration,
}

/// Per-entry expiry: every write restarts the entry's own TTL
struct PerEntryTtl;

impl Expiry<String, TimedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &TimedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &TimedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded moka-backed store
#[derive(Clone)]
pub struct MokaCacheStore {
    cache: Cache<String, TimedValue>,
}

impl MokaCacheStore {
    /// Store holding at most `max_capacity` entries
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).expire_after(PerEntryTtl).build();
        Self { cache }
    }

    /// Store without a size bound; entries still expire
    pub fn unbounded() -> Self {
        Self { cache: Cache::builder().expire_after(PerEntryTtl).build() }
    }

    /// Entry count after pending maintenance has run
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    fn name(&self) -> &'static str {
        "moka"
    }

    async fn get(&self, key: &str) -> DomainResult<Option<Vec<u8>>> {
        Ok(self.cache.get(key).await.map(|value| value.bytes))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> DomainResult<()> {
        self.cache.insert(key.to_string(), TimedValue { bytes: value, ttl }).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_pattern(&self, _pattern: &str) -> DomainResult<()> {
        Err(InfraError::from(CommonError::unsupported("delete_pattern", self.name())).into())
    }

    async fn clear(&self) -> DomainResult<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}
