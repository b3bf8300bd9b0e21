//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RBAC_CACHE_MAX_ENTRIES, DEFAULT_RBAC_CACHE_TTL_SECS, DEFAULT_RBAC_SWEEP_INTERVAL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rbac: RbacConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which cache store backs the RBAC cache wrapper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// In-process TTL map with pattern deletion
    #[default]
    Memory,
    /// Moka cache; no pattern deletion, invalidation falls back to a full clear
    Moka,
}

/// RBAC resolution and caching configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub cache_max_entries: u64,
    pub cache_backend: CacheBackendKind,
    /// Expired-entry sweep period; `0` disables the sweeper
    pub sweep_interval_secs: u64,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_secs: DEFAULT_RBAC_CACHE_TTL_SECS,
            cache_max_entries: DEFAULT_RBAC_CACHE_MAX_ENTRIES,
            cache_backend: CacheBackendKind::Memory,
            sweep_interval_secs: DEFAULT_RBAC_SWEEP_INTERVAL_SECS,
        }
    }
}

impl RbacConfig {
    /// TTL applied to every cached entry
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Sweep period for the in-memory store; `None` disables the sweeper
    pub const fn sweep_interval(&self) -> Option<Duration> {
        if self.sweep_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.sweep_interval_secs))
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Plain }
    }
}
