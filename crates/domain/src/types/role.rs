//! Roles and role assignments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityType};

/// Named, level-ordered bundle of abilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// `0` until the role is saved
    pub id: EntityId,
    pub name: String,
    pub title: Option<String>,
    pub level: Option<u64>,
    pub scope: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Role {
    /// Unsaved role with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            title: None,
            level: None,
            scope: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the human-readable title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the role level (an ordering hint, not used in resolution)
    pub fn with_level(mut self, level: u64) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the tenant scope (stored, not used in resolution)
    pub fn with_scope(mut self, scope: i64) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Whether the role has been saved and carries a repository id
    pub const fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

/// Persisted join record: role granted to an entity, optionally restricted
/// to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedRole {
    pub id: EntityId,
    pub role_id: EntityId,
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    pub restricted_to_id: Option<EntityId>,
    pub restricted_to_type: Option<EntityType>,
    pub scope: Option<i64>,
}

impl AssignedRole {
    /// Identity of the assignment for idempotent inserts.
    pub fn assignment_key(
        &self,
    ) -> (EntityId, EntityId, EntityType, Option<EntityId>, Option<EntityType>) {
        (
            self.role_id,
            self.entity_id,
            self.entity_type,
            self.restricted_to_id,
            self.restricted_to_type,
        )
    }
}

/// A role together with the restriction of one assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedRole {
    pub role: Role,
    pub restricted_to_id: Option<EntityId>,
    pub restricted_to_type: Option<EntityType>,
}

impl RestrictedRole {
    /// Unrestricted (global) assignment of `role`.
    pub fn new(role: Role) -> Self {
        Self { role, restricted_to_id: None, restricted_to_type: None }
    }

    /// Restrict the assignment to one target entity.
    pub fn restricted_to(mut self, entity_type: EntityType, entity_id: EntityId) -> Self {
        self.restricted_to_type = Some(entity_type);
        self.restricted_to_id = Some(entity_id);
        self
    }

    /// Whether the assignment is limited to one target entity
    pub const fn is_restricted(&self) -> bool {
        self.restricted_to_id.is_some() || self.restricted_to_type.is_some()
    }

    /// Whether the assignment counts when acting on `(entity_type, entity_id)`.
    ///
    /// Unrestricted assignments apply everywhere; restricted ones only on
    /// their exact target.
    pub fn applies_to(&self, entity_type: EntityType, entity_id: EntityId) -> bool {
        !self.is_restricted()
            || (self.restricted_to_type == Some(entity_type)
                && self.restricted_to_id == Some(entity_id))
    }

    /// Restriction target, when both halves are present.
    pub const fn target(&self) -> Option<(EntityType, EntityId)> {
        match (self.restricted_to_type, self.restricted_to_id) {
            (Some(entity_type), Some(entity_id)) => Some((entity_type, entity_id)),
            _ => None,
        }
    }
}
