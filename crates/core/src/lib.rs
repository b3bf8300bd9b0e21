//! # GameAP Core
//!
//! Pure authorization logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for RBAC storage, caching, and role mapping
//! - The precedence rules that turn permission rows into decisions
//! - The `RbacService` resolver
//!
//! ## Architecture Principles
//! - Only depends on `gameap-domain`
//! - No database, cache backend, or runtime wiring
//! - All external dependencies via traits

pub mod rbac;

pub use rbac::ports::{CacheStore, RbacRepository, RoleAbilityProvider};
pub use rbac::{RbacService, RepositoryRoleAbilities};
