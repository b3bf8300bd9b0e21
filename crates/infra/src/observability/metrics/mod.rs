//! Metrics collection modules

pub mod cache;

pub use cache::{RbacCacheMetrics, RbacCacheSnapshot};
