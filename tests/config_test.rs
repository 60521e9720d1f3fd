//! Integration tests for configuration loading and validation

use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use vmprobe::config::{
    load_config, validate_config, Config, ConfigError, ConfigLoader, MAX_NESTING_DEPTH,
};
use vmprobe::{ByteOrder, MemoryError, RegionScanner, ScannerConfig};

fn write_config(dir: &TempDir, contents: &str) -> ConfigLoader {
    let path = dir.path().join("vmprobe.toml");
    fs::write(&path, contents).unwrap();
    ConfigLoader::new(path)
}

#[test]
fn test_full_config_file() {
    let dir = TempDir::new().unwrap();
    let loader = write_config(
        &dir,
        r#"
            [scanner]
            nesting_depth = 0

            [memory]
            byte_order = "big"
            max_string_length = 256

            [logging]
            level = "debug"
            with_target = true
        "#,
    );

    let config = loader.load().unwrap();
    assert_eq!(config.scanner.nesting_depth, 0);
    assert_eq!(config.memory.byte_order, ByteOrder::Big);
    assert_eq!(config.memory.max_string_length, 256);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.with_target);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_empty_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let loader = write_config(&dir, "");
    assert_eq!(loader.load().unwrap(), Config::default());
}

#[test]
fn test_out_of_range_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let loader = write_config(
        &dir,
        &format!("[scanner]\nnesting_depth = {}\n", MAX_NESTING_DEPTH + 1),
    );
    let config = loader.load().unwrap();
    let err = validate_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let wrapped: MemoryError = err.into();
    assert!(wrapped.to_string().starts_with("Configuration error"));
}

#[test]
fn test_wrong_types_fail_to_parse() {
    let dir = TempDir::new().unwrap();
    let loader = write_config(&dir, "[memory]\nmax_string_length = \"long\"\n");
    assert!(matches!(loader.load(), Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_save_round_trip() {
    let dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new(dir.path().join("saved.toml"));

    let mut config = Config::default();
    config.memory.byte_order = ByteOrder::Little;
    config.memory.max_string_length = 1024;
    loader.save(&config).unwrap();

    let text = fs::read_to_string(loader.path()).unwrap();
    assert!(text.contains("byte_order = \"little\""));
    assert_eq!(loader.load().unwrap(), config);
}

#[test]
fn test_load_config_without_file() {
    // The package root carries no vmprobe.toml
    assert_eq!(load_config().unwrap(), Config::default());
}

#[test]
fn test_scanner_from_config() {
    struct Empty;
    impl vmprobe::RegionQuery for Empty {
        fn query_region(
            &self,
            _: u64,
            _: u32,
        ) -> Result<Option<vmprobe::RegionInfo>, vmprobe::ScanError> {
            Ok(None)
        }
    }

    let scanner = RegionScanner::from_config(Empty, &ScannerConfig { nesting_depth: 5 });
    assert_eq!(scanner.depth(), 5);
    assert_eq!(
        scanner.find_at_least(0, 0),
        Err(vmprobe::ScanError::NoRegionFound)
    );
}
