//! Role-based access control: ports, precedence rules, and the resolver

pub mod ports;
pub mod resolution;
pub mod role_abilities;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use ports::{CacheStore, RbacRepository, RoleAbilityProvider};
pub use resolution::{Decision, ScopeTier};
pub use role_abilities::RepositoryRoleAbilities;
pub use service::RbacService;
