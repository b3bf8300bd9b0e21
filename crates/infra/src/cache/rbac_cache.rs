//! Caching decorator for `RbacRepository`
//!
//! Reads go through get-or-set against a [`CacheStore`]; writes go to the
//! inner repository first and invalidate the affected keys before returning.
//!
//! Each key carries a generation that writes bump before deleting. A read
//! only stores what it loaded if the generation it saw before loading is
//! still current, so a load that raced a write can never repopulate the
//! cache with the pre-write rows.
//!
//! Key layout:
//! - `roles:all`
//! - `roles:{entity_type}_{entity_id}`
//! - `permissions:{entity_type}_{entity_id}`

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gameap_core::{CacheStore, RbacRepository};
use gameap_domain::constants::{
    CACHE_KEY_PERMISSIONS_PREFIX, CACHE_KEY_ROLES_ALL, CACHE_KEY_ROLES_PREFIX, CACHE_PATTERN_ROLE,
    CACHE_PATTERN_ROLES,
};
use gameap_domain::{
    Ability, EntityId, EntityType, Permission, RestrictedRole, Result as DomainResult, Role,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::errors::InfraError;
use crate::observability::RbacCacheMetrics;

/// Cache key for the roles assigned to one entity
pub fn roles_key(entity_type: EntityType, entity_id: EntityId) -> String {
    format!("{CACHE_KEY_ROLES_PREFIX}:{entity_type}_{entity_id}")
}

/// Cache key for the permission rows held by one entity
pub fn permissions_key(entity_type: EntityType, entity_id: EntityId) -> String {
    format!("{CACHE_KEY_PERMISSIONS_PREFIX}:{entity_type}_{entity_id}")
}

/// Write generations: one counter per invalidated key plus an epoch bumped by
/// pattern deletes and full clears
#[derive(Debug, Default)]
struct Generations {
    epoch: u64,
    keys: HashMap<String, u64>,
}

/// Generation observed by a read before it loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    epoch: u64,
    key: u64,
}

impl Generations {
    fn stamp(&self, key: &str) -> Stamp {
        Stamp { epoch: self.epoch, key: self.keys.get(key).copied().unwrap_or(0) }
    }

    fn bump_keys(&mut self, keys: &[String]) {
        for key in keys {
            *self.keys.entry(key.clone()).or_insert(0) += 1;
        }
    }

    /// Every in-flight read is stale; per-key counters restart under the new
    /// epoch
    fn bump_epoch(&mut self) {
        self.epoch += 1;
        self.keys.clear();
    }
}

/// `RbacRepository` decorator backed by a TTL cache store
///
/// Store failures never fail a read: they count as a miss and are logged.
/// Failures while invalidating after a successful write are returned, since
/// the caller would otherwise keep reading stale grants.
pub struct CachedRbacRepository<R> {
    inner: R,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    metrics: RbacCacheMetrics,
    // Readers hold the shared side across their check-and-set; writers take
    // the exclusive side to bump before deleting.
    generations: RwLock<Generations>,
}

impl<R: RbacRepository> CachedRbacRepository<R> {
    /// Wrap `inner`, caching reads in `store` for `ttl`
    pub fn new(inner: R, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            inner,
            store,
            ttl,
            metrics: RbacCacheMetrics::new(),
            generations: RwLock::new(Generations::default()),
        }
    }

    /// Wrapped repository; writes made through it bypass invalidation
    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn metrics(&self) -> &RbacCacheMetrics {
        &self.metrics
    }

    async fn cached<T, F, Fut>(&self, key: &str, load: F) -> DomainResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        match self.store.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    self.metrics.record_hit();
                    debug!(key, "RBAC cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    let e = InfraError::from(e).0;
                    warn!(key, error = %e, "Discarding undecodable RBAC cache entry");
                }
            },
            Ok(None) => {}
            Err(e) => {
                self.metrics.record_backend_error();
                warn!(key, store = self.store.name(), error = %e, "RBAC cache read failed");
            }
        }

        self.metrics.record_miss();
        debug!(key, "RBAC cache miss");
        let stamp = self.generations.read().await.stamp(key);
        let value = load().await?;

        let bytes = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "RBAC cache value not serialisable");
                return Ok(value);
            }
        };

        let generations = self.generations.read().await;
        if generations.stamp(key) != stamp {
            self.metrics.record_stale_load();
            debug!(key, "RBAC cache write skipped: key invalidated during load");
            return Ok(value);
        }
        if let Err(e) = self.store.set(key, bytes, self.ttl).await {
            warn!(key, store = self.store.name(), error = %e, "RBAC cache write failed");
        }
        drop(generations);

        Ok(value)
    }

    async fn invalidate_keys(&self, keys: &[String]) -> DomainResult<()> {
        self.generations.write().await.bump_keys(keys);
        for key in keys {
            self.store.delete(key).await?;
            self.metrics.record_invalidation();
        }
        debug!(?keys, "RBAC cache keys invalidated");
        Ok(())
    }

    /// Drop `roles:all` and every `role*`/`roles*` key, or everything when the
    /// store cannot match patterns.
    async fn invalidate_role_listings(&self) -> DomainResult<()> {
        self.generations.write().await.bump_epoch();
        self.store.delete(CACHE_KEY_ROLES_ALL).await?;
        self.metrics.record_invalidation();

        if self.store.supports_pattern_delete() {
            for pattern in [CACHE_PATTERN_ROLE, CACHE_PATTERN_ROLES] {
                self.store.delete_pattern(pattern).await?;
                self.metrics.record_invalidation();
            }
        } else {
            self.store.clear().await?;
            self.metrics.record_invalidation();
            debug!(store = self.store.name(), "RBAC cache cleared (no pattern delete)");
        }
        Ok(())
    }
}

#[async_trait]
impl<R: RbacRepository> RbacRepository for CachedRbacRepository<R> {
    async fn get_roles(&self) -> DomainResult<Vec<Role>> {
        self.cached(CACHE_KEY_ROLES_ALL, || self.inner.get_roles()).await
    }

    async fn get_role_by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        Ok(self.get_roles().await?.into_iter().find(|role| role.name == name))
    }

    async fn get_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> DomainResult<Vec<RestrictedRole>> {
        self.cached(&roles_key(entity_type, entity_id), || {
            self.inner.get_roles_for_entity(entity_id, entity_type)
        })
        .await
    }

    async fn get_permissions(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> DomainResult<Vec<Permission>> {
        self.cached(&permissions_key(entity_type, entity_id), || {
            self.inner.get_permissions(entity_id, entity_type)
        })
        .await
    }

    async fn save_role(&self, role: &mut Role) -> DomainResult<()> {
        self.inner.save_role(role).await?;
        self.invalidate_role_listings().await
    }

    async fn delete_role(&self, role_id: EntityId) -> DomainResult<()> {
        self.inner.delete_role(role_id).await?;
        self.invalidate_role_listings().await?;
        self.invalidate_keys(&[permissions_key(EntityType::Role, role_id)]).await
    }

    async fn assign_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        roles: &[RestrictedRole],
    ) -> DomainResult<()> {
        self.inner.assign_roles_for_entity(entity_id, entity_type, roles).await?;
        self.invalidate_keys(&[
            roles_key(entity_type, entity_id),
            permissions_key(entity_type, entity_id),
        ])
        .await
    }

    async fn clear_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> DomainResult<()> {
        self.inner.clear_roles_for_entity(entity_id, entity_type).await?;
        self.invalidate_keys(&[
            roles_key(entity_type, entity_id),
            permissions_key(entity_type, entity_id),
        ])
        .await
    }

    async fn allow(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> DomainResult<()> {
        self.inner.allow(entity_id, entity_type, abilities).await?;
        self.invalidate_keys(&[permissions_key(entity_type, entity_id)]).await
    }

    async fn forbid(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> DomainResult<()> {
        self.inner.forbid(entity_id, entity_type, abilities).await?;
        self.invalidate_keys(&[permissions_key(entity_type, entity_id)]).await
    }

    async fn revoke(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> DomainResult<()> {
        self.inner.revoke(entity_id, entity_type, abilities).await?;
        self.invalidate_keys(&[permissions_key(entity_type, entity_id)]).await
    }
}
