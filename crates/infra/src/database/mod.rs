//! Repository implementations

pub mod memory_rbac_repository;

pub use memory_rbac_repository::InMemoryRbacRepository;
