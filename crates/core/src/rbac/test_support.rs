//! Fake repository shared by unit tests in this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gameap_domain::{
    Ability, AbilityName, EntityId, EntityType, GameapError, Permission, RestrictedRole, Result,
    Role,
};

use super::ports::RbacRepository;

/// Seedable repository that records every permission fetch and can be told
/// to fail reads.
#[derive(Default)]
pub struct FakeRepository {
    roles: Mutex<HashMap<(EntityType, EntityId), Vec<RestrictedRole>>>,
    permissions: Mutex<HashMap<(EntityType, EntityId), Vec<Permission>>>,
    pub permission_fetches: Mutex<Vec<(EntityType, EntityId)>>,
    pub fail_reads: bool,
}

impl FakeRepository {
    pub fn failing() -> Self {
        Self { fail_reads: true, ..Self::default() }
    }

    pub fn assign(&self, holder: (EntityType, EntityId), role: RestrictedRole) {
        self.roles.lock().unwrap().entry(holder).or_default().push(role);
    }

    pub fn grant(&self, holder: (EntityType, EntityId), ability: Ability, forbidden: bool) {
        let mut permissions = self.permissions.lock().unwrap();
        let rows = permissions.entry(holder).or_default();
        rows.push(Permission {
            id: rows.len() as u64 + 1,
            ability_id: 0,
            entity_id: Some(holder.1),
            entity_type: Some(holder.0),
            forbidden,
            scope: None,
            ability: Some(ability),
        });
    }

    pub fn fetch_count(&self) -> usize {
        self.permission_fetches.lock().unwrap().len()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads {
            Err(GameapError::Database("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

pub fn role(id: EntityId, name: &str) -> Role {
    let mut role = Role::new(name);
    role.id = id;
    role
}

pub fn global(name: AbilityName) -> Ability {
    Ability::new(name)
}

#[async_trait]
impl RbacRepository for FakeRepository {
    async fn get_roles(&self) -> Result<Vec<Role>> {
        self.check_reads()?;
        Ok(self
            .roles
            .lock()
            .unwrap()
            .values()
            .flatten()
            .map(|assigned| assigned.role.clone())
            .collect())
    }

    async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        Ok(self.get_roles().await?.into_iter().find(|role| role.name == name))
    }

    async fn get_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<RestrictedRole>> {
        self.check_reads()?;
        Ok(self.roles.lock().unwrap().get(&(entity_type, entity_id)).cloned().unwrap_or_default())
    }

    async fn get_permissions(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<Vec<Permission>> {
        self.check_reads()?;
        self.permission_fetches.lock().unwrap().push((entity_type, entity_id));
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .get(&(entity_type, entity_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_role(&self, _role: &mut Role) -> Result<()> {
        Err(GameapError::Internal("not supported by fake".into()))
    }

    async fn delete_role(&self, _role_id: EntityId) -> Result<()> {
        Err(GameapError::Internal("not supported by fake".into()))
    }

    async fn assign_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        roles: &[RestrictedRole],
    ) -> Result<()> {
        for role in roles {
            self.assign((entity_type, entity_id), role.clone());
        }
        Ok(())
    }

    async fn clear_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> Result<()> {
        self.roles.lock().unwrap().remove(&(entity_type, entity_id));
        Ok(())
    }

    async fn allow(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        for ability in abilities {
            self.grant((entity_type, entity_id), ability.clone(), false);
        }
        Ok(())
    }

    async fn forbid(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        for ability in abilities {
            self.grant((entity_type, entity_id), ability.clone(), true);
        }
        Ok(())
    }

    async fn revoke(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> Result<()> {
        let keys: Vec<_> = abilities.iter().map(Ability::key).collect();
        if let Some(rows) = self.permissions.lock().unwrap().get_mut(&(entity_type, entity_id)) {
            rows.retain(|row| row.ability.as_ref().map_or(true, |a| !keys.contains(&a.key())));
        }
        Ok(())
    }
}
