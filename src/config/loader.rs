//! Configuration loader for vmprobe
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::{default_config, DEFAULT_CONFIG_FILE};
use crate::core::types::ByteOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_scanner")]
    pub scanner: ScannerConfig,

    #[serde(default = "default_memory")]
    pub memory: MemoryConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Region scanner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Levels of composite mappings each map query resolves into
    #[serde(default = "default_nesting_depth")]
    pub nesting_depth: u32,
}

/// Typed accessor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub byte_order: ByteOrder,
    /// Upper bound on bytes fetched when reading a NUL-terminated string
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub with_target: bool,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads from and saves to
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration, returning defaults only if the file doesn't exist
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads `vmprobe.toml` from the working directory, or the defaults
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::new(DEFAULT_CONFIG_FILE).load_or_default()
}

// Default functions for serde
fn default_scanner() -> ScannerConfig {
    ScannerConfig {
        nesting_depth: default_nesting_depth(),
    }
}

fn default_memory() -> MemoryConfig {
    let defaults = default_config();
    MemoryConfig {
        byte_order: defaults.memory.byte_order,
        max_string_length: defaults.memory.max_string_length,
    }
}

fn default_logging() -> LoggingConfig {
    let defaults = default_config();
    LoggingConfig {
        level: defaults.logging.level,
        with_target: defaults.logging.with_target,
    }
}

fn default_nesting_depth() -> u32 {
    default_config().scanner.nesting_depth
}

fn default_max_string_length() -> usize {
    default_config().memory.max_string_length
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: default_scanner(),
            memory: default_memory(),
            logging: default_logging(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        default_scanner()
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        default_memory()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        default_logging()
    }
}
