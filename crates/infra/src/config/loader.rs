//! Configuration loader
//!
//! Loads application configuration from a file and/or environment variables.
//!
//! ## Loading Strategy
//! 1. Probes standard paths for a config file (JSON or TOML)
//! 2. Falls back to built-in defaults when no file exists
//! 3. Applies environment variable overrides on top
//!
//! ## Environment Variables
//! - `GAMEAP_RBAC_CACHE_ENABLED`: Whether the RBAC cache is enabled
//!   (true/false)
//! - `GAMEAP_RBAC_CACHE_TTL_SECS`: Cache entry TTL in seconds
//! - `GAMEAP_RBAC_CACHE_MAX_ENTRIES`: Cache capacity
//! - `GAMEAP_RBAC_CACHE_BACKEND`: `memory` or `moka`
//! - `GAMEAP_RBAC_SWEEP_INTERVAL_SECS`: Expiry sweep period, `0` disables it
//! - `GAMEAP_LOG_LEVEL`: Default log filter directive
//! - `GAMEAP_LOG_FORMAT`: `plain` or `json`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./gameap.json` or `./gameap.toml` (current working directory)
//! 2. `./config/gameap.json` or `./config/gameap.toml`
//! 3. `../gameap.json` or `../gameap.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use gameap_domain::{CacheBackendKind, Config, GameapError, LogFormat, Result};

pub const ENV_CACHE_ENABLED: &str = "GAMEAP_RBAC_CACHE_ENABLED";
pub const ENV_CACHE_TTL_SECS: &str = "GAMEAP_RBAC_CACHE_TTL_SECS";
pub const ENV_CACHE_MAX_ENTRIES: &str = "GAMEAP_RBAC_CACHE_MAX_ENTRIES";
pub const ENV_CACHE_BACKEND: &str = "GAMEAP_RBAC_CACHE_BACKEND";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "GAMEAP_RBAC_SWEEP_INTERVAL_SECS";
pub const ENV_LOG_LEVEL: &str = "GAMEAP_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "GAMEAP_LOG_FORMAT";

const CONFIG_FILE_NAMES: [&str; 2] = ["gameap.json", "gameap.toml"];

/// Load configuration: probed file (or defaults), then environment overrides
///
/// # Errors
/// Returns `GameapError::Config` if a probed file cannot be read or parsed,
/// or if an environment override has an invalid value.
pub fn load() -> Result<Config> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from defaults plus environment variables
///
/// Unset variables keep their default.
///
/// # Errors
/// Returns `GameapError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// file extension.
///
/// # Errors
/// Returns `GameapError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GameapError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GameapError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GameapError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GameapError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GameapError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GameapError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join("config"));
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
            dirs.push(exe_dir.join("config"));
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Overwrite fields whose environment variable is set
fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(enabled) = env_bool(ENV_CACHE_ENABLED) {
        config.rbac.cache_enabled = enabled;
    }
    if let Some(ttl) = env_parse::<u64>(ENV_CACHE_TTL_SECS)? {
        config.rbac.cache_ttl_secs = ttl;
    }
    if let Some(max) = env_parse::<u64>(ENV_CACHE_MAX_ENTRIES)? {
        config.rbac.cache_max_entries = max;
    }
    if let Some(backend) = env_var(ENV_CACHE_BACKEND) {
        config.rbac.cache_backend = parse_backend(&backend)?;
    }
    if let Some(interval) = env_parse::<u64>(ENV_SWEEP_INTERVAL_SECS)? {
        config.rbac.sweep_interval_secs = interval;
    }
    if let Some(level) = env_var(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    if let Some(format) = env_var(ENV_LOG_FORMAT) {
        config.logging.format = parse_log_format(&format)?;
    }
    Ok(())
}

fn parse_backend(value: &str) -> Result<CacheBackendKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(CacheBackendKind::Memory),
        "moka" => Ok(CacheBackendKind::Moka),
        other => Err(GameapError::Config(format!("Unknown cache backend: {other}"))),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "plain" | "text" => Ok(LogFormat::Plain),
        "json" => Ok(LogFormat::Json),
        other => Err(GameapError::Config(format!("Unknown log format: {other}"))),
    }
}

/// Non-empty environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| GameapError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
/// Returns `None` when unset.
fn env_bool(key: &str) -> Option<bool> {
    env_var(key).map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 7] = [
        ENV_CACHE_ENABLED,
        ENV_CACHE_TTL_SECS,
        ENV_CACHE_MAX_ENTRIES,
        ENV_CACHE_BACKEND,
        ENV_SWEEP_INTERVAL_SECS,
        ENV_LOG_LEVEL,
        ENV_LOG_FORMAT,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap();

        for value in ["1", "true", "YES", "on"] {
            std::env::set_var("GAMEAP_TEST_BOOL", value);
            assert_eq!(env_bool("GAMEAP_TEST_BOOL"), Some(true), "{value}");
        }
        for value in ["0", "false", "no", "off"] {
            std::env::set_var("GAMEAP_TEST_BOOL", value);
            assert_eq!(env_bool("GAMEAP_TEST_BOOL"), Some(false), "{value}");
        }

        std::env::remove_var("GAMEAP_TEST_BOOL");
        assert_eq!(env_bool("GAMEAP_TEST_BOOL"), None);
    }

    #[test]
    fn test_load_from_env_defaults_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = load_from_env().unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_CACHE_ENABLED, "false");
        std::env::set_var(ENV_CACHE_TTL_SECS, "15");
        std::env::set_var(ENV_CACHE_MAX_ENTRIES, "500");
        std::env::set_var(ENV_CACHE_BACKEND, "Moka");
        std::env::set_var(ENV_SWEEP_INTERVAL_SECS, "0");
        std::env::set_var(ENV_LOG_LEVEL, "gameap=debug");
        std::env::set_var(ENV_LOG_FORMAT, "json");

        let config = load_from_env().unwrap();
        clear_env();

        assert!(!config.rbac.cache_enabled);
        assert_eq!(config.rbac.cache_ttl(), Duration::from_secs(15));
        assert_eq!(config.rbac.cache_max_entries, 500);
        assert_eq!(config.rbac.cache_backend, CacheBackendKind::Moka);
        assert_eq!(config.rbac.sweep_interval(), None);
        assert_eq!(config.logging.level, "gameap=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_CACHE_TTL_SECS, "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(GameapError::Config(_))));
    }

    #[test]
    fn test_load_from_env_unknown_backend() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_CACHE_BACKEND, "redis");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(GameapError::Config(_))));
    }

    #[test]
    fn test_load_from_file_json() {
        let (_temp, path) = temp_config(
            r#"{
                "rbac": { "cache_ttl_secs": 5, "cache_backend": "moka" },
                "logging": { "format": "json" }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();

        assert_eq!(config.rbac.cache_ttl_secs, 5);
        assert_eq!(config.rbac.cache_backend, CacheBackendKind::Moka);
        assert!(config.rbac.cache_enabled);
        assert_eq!(config.logging.format, LogFormat::Json);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let (_temp, path) = temp_config(
            r#"
[rbac]
cache_enabled = false
sweep_interval_secs = 10

[logging]
level = "warn"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();

        assert!(!config.rbac.cache_enabled);
        assert_eq!(config.rbac.sweep_interval(), Some(Duration::from_secs(10)));
        assert_eq!(config.logging.level, "warn");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/gameap.json")));
        assert!(matches!(result, Err(GameapError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let (_temp, path) = temp_config(r#"{ "rbac": { "cache_ttl_secs": "#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(matches!(result, Err(GameapError::Config(_))));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("rbac: {}", &PathBuf::from("gameap.yaml"));
        assert!(matches!(result, Err(GameapError::Config(_))));
    }

    #[test]
    fn test_parse_config_empty_toml_is_default() {
        let config = parse_config("", &PathBuf::from("gameap.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
