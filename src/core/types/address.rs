//! Memory address wrapper type with hex parsing and checked arithmetic

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string cannot be parsed into an [`Address`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid memory address: {0}")]
pub struct AddressParseError(String);

/// A 64-bit offset into a target's virtual address space
///
/// Addresses carry no alignment requirement and are never dereferenced
/// locally; they only describe locations in another process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u64);

impl Address {
    /// The highest representable address
    pub const MAX: Address = Address(u64::MAX);

    /// Creates a new address from a raw value
    pub const fn new(value: u64) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the address is aligned to the specified boundary
    pub const fn is_aligned(&self, alignment: u64) -> bool {
        alignment != 0 && self.0 % alignment == 0
    }

    /// Aligns the address down to a power-of-two boundary
    pub const fn align_down(&self, alignment: u64) -> Self {
        if alignment == 0 {
            return *self;
        }
        Address(self.0 & !(alignment - 1))
    }

    /// Adds a byte count, returning `None` past the end of the address space
    pub const fn checked_add(&self, bytes: u64) -> Option<Self> {
        match self.0.checked_add(bytes) {
            Some(value) => Some(Address(value)),
            None => None,
        }
    }

    /// Returns the raw value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Address of a local pointer, for self-attached handles
    pub fn of_ptr<T>(ptr: *const T) -> Self {
        Address(ptr as usize as u64)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix('$') {
            u64::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            u64::from_str_radix(s, 16)
        } else {
            s.parse::<u64>().or_else(|_| u64::from_str_radix(s, 16))
        };

        value
            .map(Address::new)
            .map_err(|_| AddressParseError(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::UpperHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value)
    }
}

impl From<Address> for u64 {
    fn from(address: Address) -> Self {
        address.0
    }
}
