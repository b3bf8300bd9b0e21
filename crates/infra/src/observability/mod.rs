//! Observability infrastructure: log subscriber setup and cache counters
//!
//! ## Design Principles
//!
//! 1. **Install once**: the global subscriber is set by the first
//!    [`init_logging`] call; later calls are no-ops.
//! 2. **Memory ordering**: SeqCst for counters that feed derived metrics
//!    (hit rate).

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{RbacCacheMetrics, RbacCacheSnapshot};
