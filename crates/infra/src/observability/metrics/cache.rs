//! RBAC cache counters
//!
//! ## Design
//! - **SeqCst ordering** for the counters feeding `hit_rate` (derived metric)
//! - **No locking needed**: plain atomic counters shared by all callers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for the RBAC cache decorator
#[derive(Debug, Default)]
pub struct RbacCacheMetrics {
    /// Reads answered from the store
    pub hits: AtomicUsize,
    /// Reads that fell through to the repository (absent or undecodable)
    pub misses: AtomicUsize,
    /// Store failures absorbed on the read path
    pub backend_errors: AtomicUsize,
    /// Keys, patterns or full clears issued after writes
    pub invalidations: AtomicUsize,
    /// Loads not stored because a write invalidated the key meanwhile
    pub stale_loads: AtomicUsize,
}

/// Point-in-time copy of [`RbacCacheMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RbacCacheSnapshot {
    pub hits: usize,
    pub misses: usize,
    pub backend_errors: usize,
    pub invalidations: usize,
    pub stale_loads: usize,
}

impl RbacCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_backend_error(&self) {
        self.backend_errors.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_stale_load(&self) {
        self.stale_loads.fetch_add(1, Ordering::SeqCst);
    }

    /// Hit rate as a percentage (0.0 to 100.0); 0.0 before any read
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::SeqCst);
        let misses = self.misses.load(Ordering::SeqCst);

        let total = hits + misses;
        if total == 0 {
            return 0.0;
        }

        (hits as f64 / total as f64) * 100.0
    }

    pub fn snapshot(&self) -> RbacCacheSnapshot {
        RbacCacheSnapshot {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            backend_errors: self.backend_errors.load(Ordering::SeqCst),
            invalidations: self.invalidations.load(Ordering::SeqCst),
            stale_loads: self.stale_loads.load(Ordering::SeqCst),
        }
    }
}
