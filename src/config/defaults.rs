//! Default configuration values for vmprobe

use crate::core::types::{ByteOrder, DEFAULT_NESTING_DEPTH};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "vmprobe.toml";
pub const DEFAULT_MAX_STRING_LENGTH: usize = 64;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDefaults {
    pub scanner: ScannerDefaults,
    pub memory: MemoryDefaults,
    pub logging: LoggingDefaults,
}

/// Default scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerDefaults {
    pub nesting_depth: u32,
}

/// Default memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDefaults {
    pub byte_order: ByteOrder,
    pub max_string_length: usize,
}

/// Default logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingDefaults {
    pub level: String,
    pub with_target: bool,
}

/// Returns the default configuration
pub fn default_config() -> ConfigDefaults {
    ConfigDefaults {
        scanner: ScannerDefaults {
            nesting_depth: DEFAULT_NESTING_DEPTH,
        },
        memory: MemoryDefaults {
            byte_order: ByteOrder::Native,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
        },
        logging: LoggingDefaults {
            level: DEFAULT_LOG_LEVEL.to_string(),
            with_target: false,
        },
    }
}
