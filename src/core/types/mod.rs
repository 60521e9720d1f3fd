//! Core type definitions for vmprobe
//!
//! Address and region descriptors, typed values, and the per-operation
//! error taxonomy shared by every component.

mod address;
mod error;
mod region;
mod value;

// Re-export all public types
pub use address::{Address, AddressParseError};
pub use error::{AttachError, MemoryError, MemoryResult, ReadError, ScanError, WriteError};
pub use region::{
    Access, MemoryRegion, Protection, RegionInfo, RegionQuery, DEFAULT_NESTING_DEPTH,
};
pub use value::{ByteOrder, MemoryValue, ValueType};

// Common type aliases
pub type ProcessId = u32;
pub type Size = u64;
