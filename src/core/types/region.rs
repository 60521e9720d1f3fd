//! Virtual memory region descriptors and the map query seam

use super::address::Address;
use super::error::ScanError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nesting depth used when a caller does not choose one: resolve one level
/// into composite mappings.
pub const DEFAULT_NESTING_DEPTH: u32 = 1;

/// One contiguous mapped range, as returned by a region scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub base: Address,
    pub size: u64,
}

impl MemoryRegion {
    /// Creates a region descriptor
    pub const fn new(base: Address, size: u64) -> Self {
        MemoryRegion { base, size }
    }

    /// First address past the region, or `None` if the region runs to the
    /// top of the address space
    pub const fn end(&self) -> Option<Address> {
        self.base.checked_add(self.size)
    }

    /// Check if an address is within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.base && (address.0 - self.base.0) < self.size
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+0x{:X})", self.base, self.size)
    }
}

/// Kind of access an operation needs from the pages it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

/// Page protection of a region
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Protection {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Protection {
    pub const NONE: Protection = Protection {
        read: false,
        write: false,
        execute: false,
    };
    pub const READ: Protection = Protection {
        read: true,
        write: false,
        execute: false,
    };
    pub const READ_WRITE: Protection = Protection {
        read: true,
        write: true,
        execute: false,
    };
    pub const READ_EXECUTE: Protection = Protection {
        read: true,
        write: false,
        execute: true,
    };

    /// Whether pages with this protection permit `access`
    pub const fn allows(&self, access: Access) -> bool {
        match access {
            Access::Read => self.read,
            Access::Write => self.write,
        }
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' }
        )
    }
}

/// Full record of one map query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Base address of the region
    pub base: Address,
    /// Size of the region in bytes
    pub size: u64,
    /// Nesting depth the host reported for this entry
    pub depth: u32,
    /// Current page protection
    pub protection: Protection,
}

impl RegionInfo {
    /// Projects the record onto the scan output type
    pub const fn region(&self) -> MemoryRegion {
        MemoryRegion::new(self.base, self.size)
    }

    /// First address past the region, `None` when it ends at the top of the
    /// address space
    pub const fn end(&self) -> Option<Address> {
        self.base.checked_add(self.size)
    }

    /// Check if an address is within this region
    pub fn contains(&self, address: Address) -> bool {
        self.region().contains(address)
    }

    pub fn is_readable(&self) -> bool {
        self.protection.read
    }

    pub fn is_writable(&self) -> bool {
        self.protection.write
    }

    pub fn is_executable(&self) -> bool {
        self.protection.execute
    }
}

/// Source of virtual memory map entries
///
/// Implemented for [`TaskHandle`](crate::TaskHandle) against the live host
/// map, and by in-memory maps in tests and benchmarks.
pub trait RegionQuery {
    /// Returns the region containing `address`, or the first region after it.
    ///
    /// `Ok(None)` means no region exists at or after `address`. `depth` is
    /// the nesting depth to resolve into composite mappings; hosts without
    /// nested maps ignore it.
    fn query_region(&self, address: u64, depth: u32) -> Result<Option<RegionInfo>, ScanError>;
}

impl<T: RegionQuery + ?Sized> RegionQuery for &T {
    fn query_region(&self, address: u64, depth: u32) -> Result<Option<RegionInfo>, ScanError> {
        (**self).query_region(address, depth)
    }
}
