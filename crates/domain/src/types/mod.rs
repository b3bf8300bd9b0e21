//! RBAC domain types
//!
//! Plain data: no resolution logic lives here.

pub mod ability;
pub mod entity;
pub mod permission;
pub mod role;

pub use ability::{Ability, AbilityKey, AbilityName, AbilityRegistry};
pub use entity::{EntityId, EntityType};
pub use permission::Permission;
pub use role::{AssignedRole, RestrictedRole, Role};
