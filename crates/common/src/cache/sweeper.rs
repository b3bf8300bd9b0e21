//! Background expiry sweeping
//!
//! Lazy expiry on `get` never reclaims keys that are written once and not
//! read again. The sweeper calls [`Cache::cleanup_expired`] on a fixed
//! interval until its token is cancelled.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::core::Cache;
use crate::time::Clock;

/// Spawn a task that purges expired entries every `interval`
///
/// Must be called from within a tokio runtime.
pub fn spawn_expiry_sweeper<K, V, C>(
    cache: Cache<K, V, C>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock + Clone,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Cache expiry sweeper cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = cache.cleanup_expired();
                    if removed > 0 {
                        trace!(removed, remaining = cache.len(), "Swept expired cache entries");
                    }
                }
            }
        }
    })
}
