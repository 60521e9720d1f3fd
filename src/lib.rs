//! vmprobe: read, write and map another process's virtual memory
//!
//! ```no_run
//! use vmprobe::{attach, find_region_at_least, read, release, write};
//!
//! # fn main() -> vmprobe::MemoryResult<()> {
//! let handle = attach(std::process::id())?;
//! let region = find_region_at_least(&handle, 0, 4096)?;
//! let original = read(&handle, region.base.as_u64(), 4)?;
//! write(&handle, region.base.as_u64(), &original)?;
//! release(handle);
//! # Ok(())
//! # }
//! ```
//!
//! Every operation is synchronous and returns its own error type. The
//! [`MemoryError`] umbrella lets callers mix them with `?`.

pub mod config;
pub mod core;
pub mod memory;
pub mod process;
mod sys;

// Re-export main types from core module
pub use crate::core::types::{
    Access, Address, AddressParseError, ByteOrder, MemoryValue, Protection, ValueType,
    DEFAULT_NESTING_DEPTH,
};

// Re-export core directly for full access
pub use crate::core::*;

pub use config::{init_logging, Config, LoggingConfig, MemoryConfig, ScannerConfig};
pub use memory::{
    find_region_at_least, read, region_at, write, RegionScanner, RegionWalk, TypedMemory,
};
pub use process::{attach, release, TaskHandle};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_module_accessible() {
        assert_eq!(crate::core::VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(crate::core::AUTHORS, env!("CARGO_PKG_AUTHORS"));
    }

    #[test]
    fn test_address_reexport() {
        let addr = Address::new(0x1000);
        assert_eq!(addr.as_u64(), 0x1000);
        assert!(Address::null().is_null());
    }

    #[test]
    fn test_memory_value_reexport() {
        let value = MemoryValue::U32(42);
        assert_eq!(value.value_type(), ValueType::U32);
        assert_eq!(value.size(), 4);
        assert_eq!(
            MemoryValue::F64(std::f64::consts::PI).value_type(),
            ValueType::F64
        );
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_top_level_operations() {
        let handle = attach(std::process::id()).unwrap();
        let mut slot = Box::new([0u8; 16]);
        let address = slot.as_mut_ptr() as u64;

        write(&handle, address, &[9, 8, 7]).unwrap();
        assert_eq!(read(&handle, address, 3).unwrap(), vec![9, 8, 7]);

        let containing = region_at(&handle, address).unwrap().unwrap();
        assert!(containing.contains(Address::new(address)));
        release(handle);
        assert_eq!(slot[0], 9);
    }
}
