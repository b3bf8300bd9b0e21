//! RBAC ports
//!
//! Storage and caching sit behind these traits so the resolver never knows
//! whether it talks to SQL, memory, or a cache-wrapped decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gameap_domain::{
    Ability, EntityId, EntityType, GameapError, Permission, RestrictedRole, Result, Role,
};

/// Persistence port for roles, assignments, abilities and permissions.
///
/// Implementations must be safe for concurrent callers. Every write is
/// atomic: either all rows of the call are committed or none are.
#[async_trait]
pub trait RbacRepository: Send + Sync {
    /// All roles.
    async fn get_roles(&self) -> Result<Vec<Role>>;

    /// Role with the given unique name, if any.
    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>>;

    /// Roles assigned to an entity, each with the restriction of its
    /// assignment.
    async fn get_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<RestrictedRole>>;

    /// Permission rows granted to an entity, with `ability` populated.
    async fn get_permissions(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<Permission>>;

    /// Upsert by id. A zero id inserts and writes the generated id back.
    ///
    /// Fails with `InvalidInput` if another role already uses the name.
    async fn save_role(&self, role: &mut Role) -> Result<()>;

    /// Remove a role, every assignment of it, and the permission rows granted
    /// to it. No-op when absent.
    async fn delete_role(&self, role_id: EntityId) -> Result<()>;

    /// Idempotent per `(role, entity, restriction)` tuple.
    async fn assign_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        roles: &[RestrictedRole],
    ) -> Result<()>;

    async fn clear_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<()>;

    /// Upsert abilities by unique key and insert allow rows for them.
    async fn allow(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()>;

    /// Upsert abilities by unique key and insert forbid rows for them.
    /// Existing allow rows are left in place.
    async fn forbid(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()>;

    /// Delete every permission row (allow or forbid) of the entity that
    /// references an ability matching one of the given keys.
    async fn revoke(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()>;
}

#[async_trait]
impl<T> RbacRepository for Arc<T>
where
    T: RbacRepository + ?Sized,
{
    async fn get_roles(&self) -> Result<Vec<Role>> {
        (**self).get_roles().await
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        (**self).get_role_by_name(name).await
    }

    async fn get_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<RestrictedRole>> {
        (**self).get_roles_for_entity(entity_id, entity_type).await
    }

    async fn get_permissions(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<Permission>> {
        (**self).get_permissions(entity_id, entity_type).await
    }

    async fn save_role(&self, role: &mut Role) -> Result<()> {
        (**self).save_role(role).await
    }

    async fn delete_role(&self, role_id: EntityId) -> Result<()> {
        (**self).delete_role(role_id).await
    }

    async fn assign_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        roles: &[RestrictedRole],
    ) -> Result<()> {
        (**self).assign_roles_for_entity(entity_id, entity_type, roles).await
    }

    async fn clear_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<()> {
        (**self).clear_roles_for_entity(entity_id, entity_type).await
    }

    async fn allow(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        (**self).allow(entity_id, entity_type, abilities).await
    }

    async fn forbid(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        (**self).forbid(entity_id, entity_type, abilities).await
    }

    async fn revoke(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        (**self).revoke(entity_id, entity_type, abilities).await
    }
}

/// Translates held role assignments into concrete permission rows.
///
/// How a role maps to abilities belongs to the admin-configuration layer, so
/// the resolver asks this port instead of reading a mapping table itself.
#[async_trait]
pub trait RoleAbilityProvider: Send + Sync {
    /// Permission rows conferred by the given assignments. The caller has
    /// already dropped assignments that do not apply to the request target.
    async fn permissions_for_roles(&self, roles: &[RestrictedRole]) -> Result<Vec<Permission>>;
}

/// Byte-oriented key/value store with per-entry TTL.
///
/// Backends that cannot delete by pattern keep the default
/// `supports_pattern_delete() == false`; callers then fall back to `clear`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name for logs and errors.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete every key matching a glob pattern (`*` only).
    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        Err(GameapError::Cache(format!(
            "pattern delete of '{pattern}' is not supported by {}",
            self.name()
        )))
    }

    async fn clear(&self) -> Result<()>;

    fn supports_pattern_delete(&self) -> bool {
        false
    }
}
