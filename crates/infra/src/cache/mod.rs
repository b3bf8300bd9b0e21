//! RBAC caching: cache store adapters and the repository decorator

pub mod memory_store;
pub mod moka_store;
pub mod rbac_cache;

pub use memory_store::MemoryCacheStore;
pub use moka_store::MokaCacheStore;
pub use rbac_cache::{permissions_key, roles_key, CachedRbacRepository};
