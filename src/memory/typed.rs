//! Typed reads and writes layered over the byte-range accessor

use super::{reader, writer};
use crate::config::MemoryConfig;
use crate::core::types::{ByteOrder, MemoryValue, ReadError, ValueType, WriteError};
use crate::process::TaskHandle;
use std::mem;

macro_rules! scalar_accessors {
    ($($ty:ident => $read:ident, $write:ident;)*) => {
        $(
            #[doc = concat!("Reads a `", stringify!($ty), "` in the configured byte order")]
            pub fn $read(&self, address: u64) -> Result<$ty, ReadError> {
                let bytes = self.read_bytes(address, mem::size_of::<$ty>() as u64)?;
                let mut raw = [0u8; mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes);
                Ok(match self.order {
                    ByteOrder::Little => $ty::from_le_bytes(raw),
                    ByteOrder::Big => $ty::from_be_bytes(raw),
                    ByteOrder::Native => $ty::from_ne_bytes(raw),
                })
            }

            #[doc = concat!("Writes a `", stringify!($ty), "` in the configured byte order")]
            pub fn $write(&self, address: u64, value: $ty) -> Result<(), WriteError> {
                let raw = match self.order {
                    ByteOrder::Little => value.to_le_bytes(),
                    ByteOrder::Big => value.to_be_bytes(),
                    ByteOrder::Native => value.to_ne_bytes(),
                };
                self.write_bytes(address, &raw)
            }
        )*
    };
}

/// Scalar, string and [`MemoryValue`] access to a target
///
/// Every call is a single read or write through the byte-range accessor
/// and fails with its errors.
#[derive(Debug, Clone, Copy)]
pub struct TypedMemory<'a> {
    handle: &'a TaskHandle,
    order: ByteOrder,
    max_string_length: usize,
}

impl<'a> TypedMemory<'a> {
    pub fn new(handle: &'a TaskHandle, order: ByteOrder) -> Self {
        TypedMemory {
            handle,
            order,
            max_string_length: MemoryConfig::default().max_string_length,
        }
    }

    pub fn from_config(handle: &'a TaskHandle, config: &MemoryConfig) -> Self {
        TypedMemory {
            handle,
            order: config.byte_order,
            max_string_length: config.max_string_length,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes fetched by [`read_value`](Self::read_value) for strings
    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }

    pub fn read_bytes(&self, address: u64, len: u64) -> Result<Vec<u8>, ReadError> {
        reader::read(self.handle, address, len)
    }

    pub fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<(), WriteError> {
        writer::write(self.handle, address, bytes)
    }

    scalar_accessors! {
        u8 => read_u8, write_u8;
        i8 => read_i8, write_i8;
        u16 => read_u16, write_u16;
        i16 => read_i16, write_i16;
        u32 => read_u32, write_u32;
        i32 => read_i32, write_i32;
        u64 => read_u64, write_u64;
        i64 => read_i64, write_i64;
        f32 => read_f32, write_f32;
        f64 => read_f64, write_f64;
    }

    /// Reads `max_len` bytes and decodes up to the first NUL
    ///
    /// The whole `max_len` window must be readable even when the string is
    /// shorter. Invalid UTF-8 is replaced lossily.
    pub fn read_string(&self, address: u64, max_len: usize) -> Result<String, ReadError> {
        let bytes = self.read_bytes(address, max_len as u64)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Writes the UTF-8 bytes of `value` followed by a NUL
    pub fn write_string(&self, address: u64, value: &str) -> Result<(), WriteError> {
        self.write_value(address, &MemoryValue::String(value.to_string()))
    }

    /// Reads a value of `value_type`; strings use the configured length bound
    pub fn read_value(&self, address: u64, value_type: ValueType) -> Result<MemoryValue, ReadError> {
        let len = value_type
            .size()
            .unwrap_or(self.max_string_length as u64);
        let bytes = self.read_bytes(address, len)?;
        MemoryValue::from_bytes(&bytes, value_type, self.order).ok_or(ReadError::InvalidAddress)
    }

    pub fn write_value(&self, address: u64, value: &MemoryValue) -> Result<(), WriteError> {
        self.write_bytes(address, &value.to_bytes(self.order))
    }
}
