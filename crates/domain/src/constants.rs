//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// RBAC cache defaults
pub const DEFAULT_RBAC_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_RBAC_CACHE_MAX_ENTRIES: u64 = 10_000;
pub const DEFAULT_RBAC_SWEEP_INTERVAL_SECS: u64 = 30;

// RBAC cache key layout
pub const CACHE_KEY_ROLES_ALL: &str = "roles:all";
pub const CACHE_KEY_ROLES_PREFIX: &str = "roles";
pub const CACHE_KEY_PERMISSIONS_PREFIX: &str = "permissions";
pub const CACHE_PATTERN_ROLE: &str = "role*";
pub const CACHE_PATTERN_ROLES: &str = "roles*";
