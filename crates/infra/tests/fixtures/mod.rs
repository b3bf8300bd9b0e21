//! Shared fixtures for infra integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use gameap_core::{CacheStore, RbacRepository, RbacService};
use gameap_domain::{
    Ability, AbilityName, EntityId, EntityType, GameapError, Permission, RestrictedRole, Result,
    Role,
};
use gameap_infra::{CachedRbacRepository, InMemoryRbacRepository, MemoryCacheStore, MokaCacheStore};

pub const TTL: Duration = Duration::from_secs(60);

/// Repository stack under test
#[derive(Debug, Clone, Copy)]
pub enum Flavor {
    Plain,
    MemoryCached,
    MokaCached,
}

impl Flavor {
    pub const ALL: [Self; 3] = [Self::Plain, Self::MemoryCached, Self::MokaCached];

    pub fn repository(self) -> Arc<dyn RbacRepository> {
        let inner = InMemoryRbacRepository::new();
        match self {
            Self::Plain => Arc::new(inner),
            Self::MemoryCached => {
                Arc::new(CachedRbacRepository::new(inner, Arc::new(MemoryCacheStore::new()), TTL))
            }
            Self::MokaCached => {
                Arc::new(CachedRbacRepository::new(inner, Arc::new(MokaCacheStore::new(1_000)), TTL))
            }
        }
    }
}

pub fn service(repo: &Arc<dyn RbacRepository>) -> RbacService {
    RbacService::new(Arc::clone(repo))
}

pub async fn saved_role(repo: &Arc<dyn RbacRepository>, name: &str) -> Role {
    let mut role = Role::new(name);
    repo.save_role(&mut role).await.unwrap();
    role
}

pub fn on_server(name: AbilityName, server_id: EntityId) -> Ability {
    Ability::new(name).for_entity(EntityType::Server, server_id)
}

/// Cache store whose operations fail on demand
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryCacheStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn inner(&self) -> &MemoryCacheStore {
        &self.inner
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            Err(GameapError::Cache(format!("{op}: connection reset")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check(&self.fail_reads, "get")?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.check(&self.fail_writes, "set")?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check(&self.fail_deletes, "delete")?;
        self.inner.delete(key).await
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        self.check(&self.fail_deletes, "delete_pattern")?;
        self.inner.delete_pattern(pattern).await
    }

    async fn clear(&self) -> Result<()> {
        self.check(&self.fail_deletes, "clear")?;
        self.inner.clear().await
    }

    fn supports_pattern_delete(&self) -> bool {
        true
    }
}

/// Repository whose every call fails like a dropped database connection
pub struct UnreachableRepository;

fn unreachable() -> GameapError {
    GameapError::Database("connection refused".into())
}

#[async_trait]
impl RbacRepository for UnreachableRepository {
    async fn get_roles(&self) -> Result<Vec<Role>> {
        Err(unreachable())
    }

    async fn get_role_by_name(&self, _name: &str) -> Result<Option<Role>> {
        Err(unreachable())
    }

    async fn get_roles_for_entity(
        &self,
        _entity_id: EntityId,
        _entity_type: EntityType,
    ) -> Result<Vec<RestrictedRole>> {
        Err(unreachable())
    }

    async fn get_permissions(
        &self,
        _entity_id: EntityId,
        _entity_type: EntityType,
    ) -> Result<Vec<Permission>> {
        Err(unreachable())
    }

    async fn save_role(&self, _role: &mut Role) -> Result<()> {
        Err(unreachable())
    }

    async fn delete_role(&self, _role_id: EntityId) -> Result<()> {
        Err(unreachable())
    }

    async fn assign_roles_for_entity(
        &self,
        _entity_id: EntityId,
        _entity_type: EntityType,
        _roles: &[RestrictedRole],
    ) -> Result<()> {
        Err(unreachable())
    }

    async fn clear_roles_for_entity(
        &self,
        _entity_id: EntityId,
        _entity_type: EntityType,
    ) -> Result<()> {
        Err(unreachable())
    }

    async fn allow(
        &self,
        _entity_id: EntityId,
        _entity_type: EntityType,
        _abilities: &[Ability],
    ) -> Result<()> {
        Err(unreachable())
    }

    async fn forbid(
        &self,
        _entity_id: EntityId,
        _entity_type: EntityType,
        _abilities: &[Ability],
    ) -> Result<()> {
        Err(unreachable())
    }

    async fn revoke(
        &self,
        _entity_id: EntityId,
        _entity_type: EntityType,
        _abilities: &[Ability],
    ) -> Result<()> {
        Err(unreachable())
    }
}

/// In-memory repository whose next `get_permissions` pauses after loading
/// until released
#[derive(Default)]
pub struct GatedRepository {
    inner: InMemoryRbacRepository,
    armed: AtomicBool,
    pub loaded: Notify,
    pub release: Notify,
}

impl GatedRepository {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RbacRepository for GatedRepository {
    async fn get_roles(&self) -> Result<Vec<Role>> {
        self.inner.get_roles().await
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        self.inner.get_role_by_name(name).await
    }

    async fn get_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<RestrictedRole>> {
        self.inner.get_roles_for_entity(entity_id, entity_type).await
    }

    async fn get_permissions(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<Permission>> {
        let rows = self.inner.get_permissions(entity_id, entity_type).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.loaded.notify_one();
            self.release.notified().await;
        }
        Ok(rows)
    }

    async fn save_role(&self, role: &mut Role) -> Result<()> {
        self.inner.save_role(role).await
    }

    async fn delete_role(&self, role_id: EntityId) -> Result<()> {
        self.inner.delete_role(role_id).await
    }

    async fn assign_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        roles: &[RestrictedRole],
    ) -> Result<()> {
        self.inner.assign_roles_for_entity(entity_id, entity_type, roles).await
    }

    async fn clear_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<()> {
        self.inner.clear_roles_for_entity(entity_id, entity_type).await
    }

    async fn allow(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        self.inner.allow(entity_id, entity_type, abilities).await
    }

    async fn forbid(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        self.inner.forbid(entity_id, entity_type, abilities).await
    }

    async fn revoke(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        self.inner.revoke(entity_id, entity_type, abilities).await
    }
}
