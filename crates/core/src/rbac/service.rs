//! RBAC resolver - answers "may this user do X (to Y)?"

use std::collections::HashMap;
use std::sync::Arc;

use gameap_domain::{AbilityName, EntityId, EntityType, Permission, Result};
use tracing::debug;

use super::ports::{RbacRepository, RoleAbilityProvider};
use super::resolution::{decide, holds_admin};
use super::role_abilities::RepositoryRoleAbilities;

/// Stateless permission resolver
///
/// Every call reads fresh data through the repository (which may be
/// cache-wrapped). Repository errors are returned as-is, never turned into a
/// denial.
pub struct RbacService {
    repository: Arc<dyn RbacRepository>,
    role_abilities: Arc<dyn RoleAbilityProvider>,
}

impl RbacService {
    /// Create a resolver using [`RepositoryRoleAbilities`] for role grants
    pub fn new(repository: Arc<dyn RbacRepository>) -> Self {
        let role_abilities = Arc::new(RepositoryRoleAbilities::new(Arc::clone(&repository)));
        Self { repository, role_abilities }
    }

    /// Replace the role→ability mapping
    pub fn with_role_abilities(mut self, provider: Arc<dyn RoleAbilityProvider>) -> Self {
        self.role_abilities = provider;
        self
    }

    /// Repository the resolver reads through
    pub fn repository(&self) -> &Arc<dyn RbacRepository> {
        &self.repository
    }

    /// Whether the user holds every `required` ability globally.
    ///
    /// Only unrestricted roles and global abilities count. An empty
    /// `required` list is denied.
    pub async fn can(&self, user_id: EntityId, required: &[AbilityName]) -> Result<bool> {
        if required.is_empty() {
            return Ok(false);
        }
        let rows = self.gather(user_id, None).await?;
        let granted = evaluate(&rows, required, None);
        debug!(user_id, ?required, granted, "Global RBAC check resolved");
        Ok(granted)
    }

    /// Whether the user holds every `required` ability on one target entity.
    ///
    /// Roles restricted to another entity are ignored. Abilities scoped to
    /// the target take precedence over type-wide ones, which take precedence
    /// over global ones.
    pub async fn can_for_entity(
        &self,
        user_id: EntityId,
        entity_type: EntityType,
        entity_id: EntityId,
        required: &[AbilityName],
    ) -> Result<bool> {
        if required.is_empty() {
            return Ok(false);
        }
        let target = Some((entity_type, entity_id));
        let rows = self.gather(user_id, target).await?;
        let granted = evaluate(&rows, required, target);
        debug!(
            user_id,
            entity_type = %entity_type,
            entity_id,
            ?required,
            granted,
            "Entity RBAC check resolved"
        );
        Ok(granted)
    }

    /// Whether the user holds `AdminRolesPermissions` globally.
    pub async fn is_admin(&self, user_id: EntityId) -> Result<bool> {
        let rows = self.gather(user_id, None).await?;
        Ok(holds_admin(&rows))
    }

    /// Evaluate each candidate ability on one target.
    ///
    /// Admins get `true` for every candidate without per-ability evaluation.
    pub async fn abilities_for_entity(
        &self,
        user_id: EntityId,
        entity_type: EntityType,
        entity_id: EntityId,
        candidates: &[AbilityName],
    ) -> Result<HashMap<AbilityName, bool>> {
        let target = Some((entity_type, entity_id));
        let rows = self.gather(user_id, target).await?;

        if holds_admin(&rows) {
            debug!(user_id, "Admin holds every candidate ability");
            return Ok(candidates.iter().map(|name| (name.clone(), true)).collect());
        }

        Ok(candidates
            .iter()
            .map(|name| (name.clone(), decide(&rows, name, target).is_granted()))
            .collect())
    }

    /// Role-conferred plus direct rows relevant to the request.
    async fn gather(
        &self,
        user_id: EntityId,
        target: Option<(EntityType, EntityId)>,
    ) -> Result<Vec<Permission>> {
        let assigned = self.repository.get_roles_for_entity(user_id, EntityType::User).await?;
        let kept: Vec<_> = assigned
            .into_iter()
            .filter(|role| match target {
                Some((entity_type, entity_id)) => role.applies_to(entity_type, entity_id),
                None => !role.is_restricted(),
            })
            .collect();

        let (mut rows, direct) = futures::try_join!(
            self.role_abilities.permissions_for_roles(&kept),
            self.repository.get_permissions(user_id, EntityType::User),
        )?;
        rows.extend(direct);
        Ok(rows)
    }
}

fn evaluate(
    rows: &[Permission],
    required: &[AbilityName],
    target: Option<(EntityType, EntityId)>,
) -> bool {
    holds_admin(rows) || required.iter().all(|name| decide(rows, name, target).is_granted())
}
