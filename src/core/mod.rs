//! Core module containing fundamental types shared by every component
//!
//! Attachment, the memory accessor and the region scanner all speak in
//! these types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, AttachError, MemoryError, MemoryRegion, MemoryResult, ProcessId, ReadError,
    RegionInfo, RegionQuery, ScanError, WriteError,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

// Platform verification at compile time
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "windows"
)))]
compile_error!("vmprobe only supports Linux, Android, macOS and Windows hosts");
