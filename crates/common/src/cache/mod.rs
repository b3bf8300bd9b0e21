//! Generic in-process cache with per-entry TTL and pattern removal
//!
//! # Features
//!
//! - **Thread-safe**: `parking_lot::RwLock` behind an `Arc`, clones share
//!   storage
//! - **Per-entry TTL**: `insert` uses the configured default,
//!   `insert_with_ttl` overrides it
//! - **Pattern removal**: glob keys (`roles*`) via [`KeyPattern`]
//! - **Bounded size**: least-recently-used eviction, or none
//! - **Metrics tracking**: optional hit/miss/eviction/removal counters
//! - **Testable**: clock abstraction for deterministic expiry tests
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use gameap_common::cache::{Cache, CacheConfig, KeyPattern};
//!
//! let cache: Cache<String, Vec<u8>> =
//!     Cache::new(CacheConfig::ttl_lru(Duration::from_secs(60), 1_000));
//!
//! cache.insert("roles:users_1".to_string(), b"[]".to_vec());
//! cache.insert("permissions:users_1".to_string(), b"[]".to_vec());
//!
//! cache.remove_matching(&KeyPattern::new("role*").unwrap());
//! assert_eq!(cache.len(), 1);
//! ```
//!
//! Expired entries are dropped lazily on read. Long-lived caches should also
//! run [`spawn_expiry_sweeper`] so write-once keys get reclaimed.

mod config;
mod core;
mod pattern;
mod stats;
mod sweeper;

pub use core::Cache;

pub use config::{CacheConfig, EvictionPolicy};
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use sweeper::spawn_expiry_sweeper;
