//! Process-wide `tracing` subscriber setup

use gameap_domain::{GameapError, LogFormat, LoggingConfig, Result as DomainResult};
use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING_INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. Only the first
/// successful call installs anything; later calls return `Ok(())`.
pub fn init_logging(config: &LoggingConfig) -> DomainResult<()> {
    LOGGING_INIT.get_or_try_init(|| install(config)).map(|_| ())
}

fn build_filter(level: &str) -> DomainResult<EnvFilter> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(level)
            .map_err(|e| GameapError::Config(format!("invalid log level '{level}': {e}")))
    })
}

fn install(config: &LoggingConfig) -> DomainResult<()> {
    let filter = build_filter(&config.level)?;

    let installed = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .with(filter)
            .try_init(),
        LogFormat::Plain => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .try_init(),
    };

    installed.map_err(|e| GameapError::Config(format!("failed to install log subscriber: {e}")))?;
    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_config_error() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = build_filter("gameap=verbose").unwrap_err();
        assert!(matches!(err, GameapError::Config(_)));
    }

    #[test]
    fn test_second_init_is_noop() {
        let config = LoggingConfig { level: "debug".into(), format: LogFormat::Json };
        init_logging(&config).unwrap();
        init_logging(&LoggingConfig::default()).unwrap();
    }
}
