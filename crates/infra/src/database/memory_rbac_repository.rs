//! In-memory RBAC repository.
//!
//! Implements the `RbacRepository` port over plain collections guarded by a
//! single `parking_lot::RwLock`, so writes are serialised and reads run
//! concurrently. Every write validates and stages its rows first and only
//! then commits them, so a rejected call leaves no partial state.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use gameap_core::RbacRepository;
use gameap_domain::{
    Ability, AbilityKey, AssignedRole, EntityId, EntityType, GameapError, Permission,
    RestrictedRole, Result as DomainResult, Role,
};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Reference `RbacRepository` holding every table in memory.
#[derive(Debug, Default)]
pub struct InMemoryRbacRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRbacRepository {
    /// Empty repository with ids starting at 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct abilities ever created.
    pub fn ability_count(&self) -> usize {
        self.tables.read().abilities.len()
    }

    /// Number of stored permission rows across all entities.
    pub fn permission_count(&self) -> usize {
        self.tables.read().permissions.len()
    }

    fn grant(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
        forbidden: bool,
    ) -> DomainResult<()> {
        if abilities.is_empty() {
            return Ok(());
        }
        let mut tables = self.tables.write();
        let batch = tables.stage_grant(entity_id, entity_type, abilities, forbidden)?;
        let (new_abilities, new_rows) = (batch.abilities.len(), batch.rows.len());
        tables.commit_grant(batch);
        info!(
            entity_id,
            entity_type = %entity_type,
            forbidden,
            new_abilities,
            new_rows,
            "Permission rows written"
        );
        Ok(())
    }
}

#[async_trait]
impl RbacRepository for InMemoryRbacRepository {
    async fn get_roles(&self) -> DomainResult<Vec<Role>> {
        Ok(self.tables.read().roles.values().cloned().collect())
    }

    async fn get_role_by_name(&self, name: &str) -> DomainResult<Option<Role>> {
        let tables = self.tables.read();
        Ok(tables.role_names.get(name).and_then(|id| tables.roles.get(id)).cloned())
    }

    async fn get_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> DomainResult<Vec<RestrictedRole>> {
        let tables = self.tables.read();
        tables
            .assigned_roles
            .values()
            .filter(|assigned| assigned.entity_id == entity_id && assigned.entity_type == entity_type)
            .map(|assigned| {
                let role = tables.roles.get(&assigned.role_id).ok_or_else(|| {
                    GameapError::Internal(format!(
                        "assignment {} references missing role {}",
                        assigned.id, assigned.role_id
                    ))
                })?;
                Ok(RestrictedRole {
                    role: role.clone(),
                    restricted_to_id: assigned.restricted_to_id,
                    restricted_to_type: assigned.restricted_to_type,
                })
            })
            .collect()
    }

    async fn get_permissions(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> DomainResult<Vec<Permission>> {
        let tables = self.tables.read();
        tables
            .permissions
            .values()
            .filter(|row| row.entity_id == Some(entity_id) && row.entity_type == Some(entity_type))
            .map(|row| {
                let ability = tables.abilities.get(&row.ability_id).ok_or_else(|| {
                    GameapError::Internal(format!(
                        "permission {} references missing ability {}",
                        row.id, row.ability_id
                    ))
                })?;
                Ok(Permission { ability: Some(ability.clone()), ..row.clone() })
            })
            .collect()
    }

    async fn save_role(&self, role: &mut Role) -> DomainResult<()> {
        let name = role.name.trim();
        if name.is_empty() {
            return Err(GameapError::InvalidInput("role name must not be empty".into()));
        }

        let mut tables = self.tables.write();
        if let Some(&owner) = tables.role_names.get(name) {
            if owner != role.id {
                return Err(GameapError::InvalidInput(format!(
                    "role name '{name}' is already taken by role {owner}"
                )));
            }
        }

        let now = Utc::now();
        let mut stored = role.clone();
        stored.name = name.to_string();
        stored.updated_at = Some(now);

        if stored.id == 0 {
            stored.id = bump(&mut tables.last_role_id);
            stored.created_at = Some(now);
        } else if let Some(previous) = tables.roles.get(&stored.id).cloned() {
            stored.created_at = previous.created_at;
            tables.role_names.remove(&previous.name);
        } else {
            tables.last_role_id = tables.last_role_id.max(stored.id);
            stored.created_at = stored.created_at.or(Some(now));
        }

        tables.role_names.insert(stored.name.clone(), stored.id);
        tables.roles.insert(stored.id, stored.clone());
        info!(role_id = stored.id, role = %stored.name, "Role saved");

        *role = stored;
        Ok(())
    }

    async fn delete_role(&self, role_id: EntityId) -> DomainResult<()> {
        let mut tables = self.tables.write();
        let Some(role) = tables.roles.remove(&role_id) else {
            debug!(role_id, "Delete of unknown role ignored");
            return Ok(());
        };
        tables.role_names.remove(&role.name);
        tables.assigned_roles.retain(|_, assigned| assigned.role_id != role_id);
        tables.permissions.retain(|_, row| {
            !(row.entity_id == Some(role_id) && row.entity_type == Some(EntityType::Role))
        });
        info!(role_id, role = %role.name, "Role deleted");
        Ok(())
    }

    async fn assign_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        roles: &[RestrictedRole],
    ) -> DomainResult<()> {
        if roles.is_empty() {
            return Ok(());
        }

        let mut tables = self.tables.write();
        let staged = tables.stage_assignments(entity_id, entity_type, roles)?;
        let added = staged.len();
        for assigned in staged {
            tables.assigned_roles.insert(assigned.id, assigned);
        }
        tables.last_assignment_id =
            tables.assigned_roles.keys().next_back().copied().unwrap_or_default();

        info!(entity_id, entity_type = %entity_type, added, "Roles assigned");
        Ok(())
    }

    async fn clear_roles_for_entity(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
    ) -> DomainResult<()> {
        let mut tables = self.tables.write();
        let before = tables.assigned_roles.len();
        tables.assigned_roles.retain(|_, assigned| {
            !(assigned.entity_id == entity_id && assigned.entity_type == entity_type)
        });
        let removed = before - tables.assigned_roles.len();
        if removed > 0 {
            info!(entity_id, entity_type = %entity_type, removed, "Role assignments cleared");
        }
        Ok(())
    }

    async fn allow(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> DomainResult<()> {
        self.grant(entity_id, entity_type, abilities, false)
    }

    async fn forbid(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> DomainResult<()> {
        self.grant(entity_id, entity_type, abilities, true)
    }

    async fn revoke(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
    ) -> DomainResult<()> {
        let mut tables = self.tables.write();
        let ability_ids: HashSet<EntityId> = abilities
            .iter()
            .filter_map(|ability| tables.ability_index.get(&ability.key()).copied())
            .collect();
        if ability_ids.is_empty() {
            return Ok(());
        }

        let before = tables.permissions.len();
        tables.permissions.retain(|_, row| {
            !(row.entity_id == Some(entity_id)
                && row.entity_type == Some(entity_type)
                && ability_ids.contains(&row.ability_id))
        });
        let removed = before - tables.permissions.len();
        info!(entity_id, entity_type = %entity_type, removed, "Permission rows revoked");
        Ok(())
    }
}

// ============================================================================
// Tables and staged writes (called with the write lock held)
// ============================================================================

#[derive(Debug, Default)]
struct Tables {
    roles: BTreeMap<EntityId, Role>,
    role_names: HashMap<String, EntityId>,
    abilities: BTreeMap<EntityId, Ability>,
    /// Unique-key index: `None` fields are their own bucket
    ability_index: HashMap<AbilityKey, EntityId>,
    permissions: BTreeMap<EntityId, Permission>,
    assigned_roles: BTreeMap<EntityId, AssignedRole>,
    last_role_id: EntityId,
    last_ability_id: EntityId,
    last_permission_id: EntityId,
    last_assignment_id: EntityId,
}

/// Rows a grant will add, not yet visible to readers
#[derive(Debug)]
struct GrantBatch {
    abilities: Vec<Ability>,
    rows: Vec<Permission>,
}

impl Tables {
    fn stage_grant(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        abilities: &[Ability],
        forbidden: bool,
    ) -> DomainResult<GrantBatch> {
        abilities.iter().try_for_each(validate_ability)?;

        let now = Utc::now();
        let mut next_ability = self.last_ability_id;
        let mut next_permission = self.last_permission_id;
        let mut staged_keys: HashMap<AbilityKey, EntityId> = HashMap::new();
        let mut staged_ability_ids: HashSet<EntityId> = HashSet::new();
        let mut batch = GrantBatch { abilities: Vec::new(), rows: Vec::new() };

        for ability in abilities {
            let key = ability.key();
            let ability_id = match self.ability_index.get(&key).or_else(|| staged_keys.get(&key)) {
                Some(&id) => id,
                None => {
                    let id = bump(&mut next_ability);
                    staged_keys.insert(key, id);
                    batch.abilities.push(Ability {
                        id,
                        created_at: Some(now),
                        updated_at: Some(now),
                        ..ability.clone()
                    });
                    id
                }
            };

            let exists = self.permissions.values().any(|row| {
                row.ability_id == ability_id
                    && row.forbidden == forbidden
                    && row.entity_id == Some(entity_id)
                    && row.entity_type == Some(entity_type)
            });
            if exists || !staged_ability_ids.insert(ability_id) {
                continue;
            }

            batch.rows.push(Permission {
                id: bump(&mut next_permission),
                ability_id,
                entity_id: Some(entity_id),
                entity_type: Some(entity_type),
                forbidden,
                scope: ability.scope,
                ability: None,
            });
        }

        Ok(batch)
    }

    fn commit_grant(&mut self, batch: GrantBatch) {
        for ability in batch.abilities {
            self.last_ability_id = self.last_ability_id.max(ability.id);
            self.ability_index.insert(ability.key(), ability.id);
            self.abilities.insert(ability.id, ability);
        }
        for row in batch.rows {
            self.last_permission_id = self.last_permission_id.max(row.id);
            self.permissions.insert(row.id, row);
        }
    }

    fn stage_assignments(
        &self,
        entity_id: EntityId,
        entity_type: EntityType,
        roles: &[RestrictedRole],
    ) -> DomainResult<Vec<AssignedRole>> {
        let mut seen: HashSet<_> = self
            .assigned_roles
            .values()
            .map(AssignedRole::assignment_key)
            .collect();
        let mut next_id = self.last_assignment_id;
        let mut staged = Vec::new();

        for restricted in roles {
            if restricted.restricted_to_id.is_some() != restricted.restricted_to_type.is_some() {
                return Err(GameapError::InvalidInput(format!(
                    "restriction of role {} needs both an entity id and an entity type",
                    restricted.role.id
                )));
            }
            if !self.roles.contains_key(&restricted.role.id) {
                return Err(GameapError::NotFound(format!(
                    "role {} ('{}') does not exist",
                    restricted.role.id, restricted.role.name
                )));
            }

            let candidate = AssignedRole {
                id: next_id + 1,
                role_id: restricted.role.id,
                entity_id,
                entity_type,
                restricted_to_id: restricted.restricted_to_id,
                restricted_to_type: restricted.restricted_to_type,
                scope: restricted.role.scope,
            };
            if seen.insert(candidate.assignment_key()) {
                next_id += 1;
                staged.push(candidate);
            }
        }

        Ok(staged)
    }
}

fn validate_ability(ability: &Ability) -> DomainResult<()> {
    if ability.name.as_str().trim().is_empty() {
        return Err(GameapError::InvalidInput("ability name must not be empty".into()));
    }
    if ability.entity_id.is_some() && ability.entity_type.is_none() {
        return Err(GameapError::InvalidInput(format!(
            "ability '{}' has an entity id but no entity type",
            ability.name
        )));
    }
    Ok(())
}

fn bump(last: &mut EntityId) -> EntityId {
    *last += 1;
    *last
}
