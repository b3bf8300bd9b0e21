//! # GameAP Domain
//!
//! RBAC domain types and models for GameAP.
//!
//! This crate contains:
//! - RBAC data types (Ability, Role, Permission, role assignments)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other GameAP crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
