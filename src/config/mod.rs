//! Configuration module for vmprobe
//!
//! Provides configuration loading, validation, default settings and
//! logging setup.

mod defaults;
mod loader;
mod logging;
mod validator;

pub use defaults::{default_config, ConfigDefaults, DEFAULT_CONFIG_FILE};
pub use loader::{load_config, ConfigLoader};
pub use logging::init_logging;
pub use validator::{validate_config, ConfigValidator, MAX_NESTING_DEPTH, MAX_STRING_LENGTH};

// Re-export the configuration structures
pub use loader::{Config, LoggingConfig, MemoryConfig, ScannerConfig};

// Configuration-related error type
pub use loader::ConfigError;

// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_module_exports() {
        let _defaults = default_config();
        let loader = ConfigLoader::new(DEFAULT_CONFIG_FILE);
        assert_eq!(loader.path().to_str(), Some("vmprobe.toml"));

        let error_result: ConfigResult<Config> =
            Err(ConfigError::Invalid("test".to_string()));
        assert!(error_result.is_err());
    }

    #[test]
    fn test_validate_config_export() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_error_from_io() {
        use std::io;
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_error: ConfigError = io_error.into();
        assert!(matches!(config_error, ConfigError::Io(_)));
    }
}
