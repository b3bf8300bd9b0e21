//! Default role→ability mapping backed by the repository

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use gameap_domain::{EntityType, Permission, RestrictedRole, Result};

use super::ports::{RbacRepository, RoleAbilityProvider};

/// Reads role-conferred abilities straight from permission rows.
///
/// An assignment confers:
/// - the rows granted to the role itself (`(role.id, EntityType::Role)`),
/// - for a restricted assignment, the rows granted to its target entity.
///
/// Target rows do not depend on which role was assigned: a `viewer` and an
/// `operator` both restricted to server 42 receive every row held by server
/// 42, and differ only in the rows granted to the roles themselves. Plug in
/// another [`RoleAbilityProvider`] to scope target rows per role.
///
/// Each distinct holder is fetched once per call.
pub struct RepositoryRoleAbilities {
    repository: Arc<dyn RbacRepository>,
}

impl RepositoryRoleAbilities {
    /// Provider reading role and target rows through `repository`
    pub fn new(repository: Arc<dyn RbacRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RoleAbilityProvider for RepositoryRoleAbilities {
    async fn permissions_for_roles(&self, roles: &[RestrictedRole]) -> Result<Vec<Permission>> {
        let holders: BTreeSet<(EntityType, u64)> = roles
            .iter()
            .flat_map(|assigned| {
                std::iter::once((EntityType::Role, assigned.role.id)).chain(assigned.target())
            })
            .collect();

        let fetched = try_join_all(
            holders
                .into_iter()
                .map(|(entity_type, entity_id)| self.repository.get_permissions(entity_id, entity_type)),
        )
        .await?;

        Ok(fetched.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use gameap_domain::AbilityName;

    use super::*;
    use crate::rbac::test_support::{global, role, FakeRepository};

    #[tokio::test]
    async fn test_unrestricted_role_reads_role_rows_only() {
        let repo = Arc::new(FakeRepository::default());
        repo.grant((EntityType::Role, 3), global(AbilityName::GAME_SERVER_COMMON), false);
        let provider = RepositoryRoleAbilities::new(repo.clone());

        let rows = provider
            .permissions_for_roles(&[RestrictedRole::new(role(3, "viewer"))])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(*repo.permission_fetches.lock().unwrap(), vec![(EntityType::Role, 3)]);
    }

    #[tokio::test]
    async fn test_restricted_role_adds_target_rows_and_dedupes_fetches() {
        let repo = Arc::new(FakeRepository::default());
        repo.grant((EntityType::Server, 42), global(AbilityName::GAME_SERVER_START), false);
        let provider = RepositoryRoleAbilities::new(repo.clone());

        let operator = role(5, "operator");
        let rows = provider
            .permissions_for_roles(&[
                RestrictedRole::new(operator.clone()).restricted_to(EntityType::Server, 42),
                RestrictedRole::new(operator),
            ])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(repo.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_target_rows_ignore_role_identity() {
        let repo = Arc::new(FakeRepository::default());
        repo.grant((EntityType::Server, 42), global(AbilityName::GAME_SERVER_STOP), false);
        repo.grant((EntityType::Role, 5), global(AbilityName::GAME_SERVER_FILES), false);
        let provider = RepositoryRoleAbilities::new(repo.clone());
        let names = |rows: Vec<Permission>| -> BTreeSet<String> {
            rows.into_iter()
                .filter_map(|row| row.ability.map(|ability| ability.name.to_string()))
                .collect()
        };

        let viewer = provider
            .permissions_for_roles(&[
                RestrictedRole::new(role(3, "viewer")).restricted_to(EntityType::Server, 42)
            ])
            .await
            .unwrap();
        let operator = provider
            .permissions_for_roles(&[
                RestrictedRole::new(role(5, "operator")).restricted_to(EntityType::Server, 42)
            ])
            .await
            .unwrap();

        assert_eq!(names(viewer), BTreeSet::from([AbilityName::GAME_SERVER_STOP.to_string()]));
        assert_eq!(
            names(operator),
            BTreeSet::from([
                AbilityName::GAME_SERVER_STOP.to_string(),
                AbilityName::GAME_SERVER_FILES.to_string(),
            ])
        );
    }

    #[test]
    fn test_no_roles_fetches_nothing() {
        let repo = Arc::new(FakeRepository::default());
        let provider = RepositoryRoleAbilities::new(repo.clone());

        let rows = tokio_test::block_on(provider.permissions_for_roles(&[])).unwrap();

        assert!(rows.is_empty());
        assert_eq!(repo.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_repository_errors_propagate() {
        let provider = RepositoryRoleAbilities::new(Arc::new(FakeRepository::failing()));

        let err = provider
            .permissions_for_roles(&[RestrictedRole::new(role(1, "admin"))])
            .await
            .unwrap_err();

        assert!(matches!(err, gameap_domain::GameapError::Database(_)));
    }
}
