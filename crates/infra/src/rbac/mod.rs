//! Wiring for the RBAC service
//!
//! Builds an [`RbacService`] over the in-memory repository, optionally
//! wrapped by the cache decorator, and owns the expiry sweeper task.

use std::sync::Arc;

use gameap_common::cache::spawn_expiry_sweeper;
use gameap_core::{CacheStore, RbacRepository, RbacService};
use gameap_domain::{CacheBackendKind, RbacConfig, Result as DomainResult};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::{CachedRbacRepository, MemoryCacheStore, MokaCacheStore};
use crate::database::InMemoryRbacRepository;

/// Running RBAC stack
pub struct RbacHandle {
    pub service: RbacService,
    /// Same repository the service reads from; use it for writes so cache
    /// invalidation applies.
    pub repository: Arc<dyn RbacRepository>,
    sweeper: Option<Sweeper>,
}

struct Sweeper {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RbacHandle {
    /// Token stopping the expiry sweeper, when one is running
    pub fn sweeper_token(&self) -> Option<CancellationToken> {
        self.sweeper.as_ref().map(|sweeper| sweeper.cancel.clone())
    }

    /// Stop the sweeper and wait for it to exit
    pub async fn shutdown(self) {
        if let Some(sweeper) = self.sweeper {
            sweeper.cancel.cancel();
            if let Err(e) = sweeper.task.await {
                warn!(error = %e, "Cache expiry sweeper ended abnormally");
            }
        }
    }
}

/// Build the RBAC service described by `config`
///
/// The expiry sweeper is only started for the memory store, with a non-zero
/// sweep interval, and when called inside a tokio runtime.
pub fn build_rbac_service(config: &RbacConfig) -> DomainResult<RbacHandle> {
    let inner = InMemoryRbacRepository::new();

    if !config.cache_enabled {
        info!("RBAC cache disabled");
        let repository: Arc<dyn RbacRepository> = Arc::new(inner);
        return Ok(RbacHandle {
            service: RbacService::new(Arc::clone(&repository)),
            repository,
            sweeper: None,
        });
    }

    let (store, sweeper): (Arc<dyn CacheStore>, Option<Sweeper>) = match config.cache_backend {
        CacheBackendKind::Memory => {
            let store = match usize::try_from(config.cache_max_entries) {
                Ok(0) => MemoryCacheStore::new(),
                Ok(max) => MemoryCacheStore::bounded(max),
                Err(_) => MemoryCacheStore::new(),
            };
            let sweeper = start_sweeper(config, &store);
            (Arc::new(store), sweeper)
        }
        CacheBackendKind::Moka => {
            let store = match config.cache_max_entries {
                0 => MokaCacheStore::unbounded(),
                max => MokaCacheStore::new(max),
            };
            (Arc::new(store), None)
        }
    };

    info!(
        store = store.name(),
        ttl_secs = config.cache_ttl_secs,
        max_entries = config.cache_max_entries,
        sweeper = sweeper.is_some(),
        "RBAC cache enabled"
    );

    let repository: Arc<dyn RbacRepository> =
        Arc::new(CachedRbacRepository::new(inner, store, config.cache_ttl()));
    Ok(RbacHandle { service: RbacService::new(Arc::clone(&repository)), repository, sweeper })
}

fn start_sweeper(config: &RbacConfig, store: &MemoryCacheStore) -> Option<Sweeper> {
    let interval = config.sweep_interval()?;
    if tokio::runtime::Handle::try_current().is_err() {
        warn!("No tokio runtime; cache expiry sweeper not started");
        return None;
    }
    let cancel = CancellationToken::new();
    let task = spawn_expiry_sweeper(store.cache(), interval, cancel.clone());
    Some(Sweeper { cancel, task })
}
