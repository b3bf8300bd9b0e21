//! # GameAP Infrastructure
//!
//! Infrastructure implementations of the RBAC ports.
//!
//! This crate contains:
//! - The in-memory `RbacRepository`
//! - Cache stores (in-process TTL map, moka) and the caching decorator
//! - Configuration loading, logging setup and cache metrics
//! - Wiring of the `RbacService`
//!
//! ## Architecture
//! - Implements traits defined in `gameap-core`
//! - Depends on `gameap-common`, `gameap-domain` and `gameap-core`
//! - Contains all "impure" code (environment, files, global subscriber)

pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod observability;
pub mod rbac;

// Re-export commonly used items
pub use cache::{CachedRbacRepository, MemoryCacheStore, MokaCacheStore};
pub use database::InMemoryRbacRepository;
pub use errors::InfraError;
pub use observability::{init_logging, RbacCacheMetrics};
pub use rbac::{build_rbac_service, RbacHandle};
