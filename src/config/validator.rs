//! Configuration validator for vmprobe
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{Config, ConfigError, LoggingConfig, MemoryConfig, ScannerConfig};

pub const MAX_NESTING_DEPTH: u32 = 64;
pub const MAX_STRING_LENGTH: usize = 1_048_576;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_scanner(&config.scanner)?;
        Self::validate_memory(&config.memory)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates scanner configuration
    fn validate_scanner(scanner: &ScannerConfig) -> Result<(), ConfigError> {
        if scanner.nesting_depth > MAX_NESTING_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "Nesting depth cannot exceed {}",
                MAX_NESTING_DEPTH
            )));
        }

        Ok(())
    }

    /// Validates memory configuration
    fn validate_memory(memory: &MemoryConfig) -> Result<(), ConfigError> {
        if memory.max_string_length == 0 {
            return Err(ConfigError::Invalid(
                "Maximum string length must be at least 1".to_string(),
            ));
        }

        if memory.max_string_length > MAX_STRING_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "Maximum string length cannot exceed {} bytes",
                MAX_STRING_LENGTH
            )));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let level = logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, LOG_LEVELS
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
