//! Error types for attach, read, write and scan operations
//!
//! Every operation has its own closed set of failure kinds. Host status codes
//! that do not map onto a named kind are preserved in an `Unknown` variant so
//! callers can still log them.

use crate::config::ConfigError;
use thiserror::Error;

/// Failure to acquire a task handle
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachError {
    #[error("Permission denied attaching to process")]
    PermissionDenied,

    #[error("No such process")]
    NoSuchProcess,

    #[error("Attach failed with host status {0}")]
    Unknown(i32),
}

/// Failure to read a byte range from the target
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadError {
    #[error("Invalid memory address: range is not fully mapped")]
    InvalidAddress,

    #[error("Permission denied: range is mapped but not readable")]
    PermissionDenied,

    #[error("Read failed with host status {0}")]
    Unknown(i32),
}

/// Failure to write a byte range into the target
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteError {
    #[error("Invalid memory address: range is not fully mapped")]
    InvalidAddress,

    #[error("Permission denied: range is mapped but not writable")]
    PermissionDenied,

    #[error("Write failed with host status {0}")]
    Unknown(i32),
}

/// Failure to locate a region
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanError {
    #[error("No region found before the end of the address space")]
    NoRegionFound,

    #[error("Region query failed with host status {0}")]
    Unknown(i32),
}

/// Umbrella error for callers mixing operations with `?`
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error(transparent)]
    Attach(#[from] AttachError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for mixed memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;
