//! Tracing subscriber installation

use super::loader::{ConfigError, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber filtered at `config.level`
///
/// `RUST_LOG` takes precedence over the configured level when set. Fails
/// with [`ConfigError::Logging`] if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::Invalid(format!("log level {}: {}", config.level, e)))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
