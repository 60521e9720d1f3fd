//! Typed values and byte order for the typed accessor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte order used to encode scalar values in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Little,
    Big,
    #[default]
    Native,
}

/// Represents different types of values that can be stored in memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MemoryValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
    String(String),
}

macro_rules! encode {
    ($v:expr, $order:expr) => {
        match $order {
            ByteOrder::Little => $v.to_le_bytes().to_vec(),
            ByteOrder::Big => $v.to_be_bytes().to_vec(),
            ByteOrder::Native => $v.to_ne_bytes().to_vec(),
        }
    };
}

macro_rules! decode {
    ($ty:ty, $bytes:expr, $order:expr) => {{
        let raw: [u8; std::mem::size_of::<$ty>()] =
            $bytes.get(..std::mem::size_of::<$ty>())?.try_into().ok()?;
        match $order {
            ByteOrder::Little => <$ty>::from_le_bytes(raw),
            ByteOrder::Big => <$ty>::from_be_bytes(raw),
            ByteOrder::Native => <$ty>::from_ne_bytes(raw),
        }
    }};
}

impl MemoryValue {
    /// Returns the encoded size in bytes; strings include their NUL terminator
    pub fn size(&self) -> usize {
        match self {
            MemoryValue::I8(_) | MemoryValue::U8(_) => 1,
            MemoryValue::I16(_) | MemoryValue::U16(_) => 2,
            MemoryValue::I32(_) | MemoryValue::U32(_) | MemoryValue::F32(_) => 4,
            MemoryValue::I64(_) | MemoryValue::U64(_) | MemoryValue::F64(_) => 8,
            MemoryValue::Bytes(b) => b.len(),
            MemoryValue::String(s) => s.len() + 1,
        }
    }

    /// Encodes the value as it is laid out in the target
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        match self {
            MemoryValue::I8(v) => encode!(v, order),
            MemoryValue::I16(v) => encode!(v, order),
            MemoryValue::I32(v) => encode!(v, order),
            MemoryValue::I64(v) => encode!(v, order),
            MemoryValue::U8(v) => encode!(v, order),
            MemoryValue::U16(v) => encode!(v, order),
            MemoryValue::U32(v) => encode!(v, order),
            MemoryValue::U64(v) => encode!(v, order),
            MemoryValue::F32(v) => encode!(v, order),
            MemoryValue::F64(v) => encode!(v, order),
            MemoryValue::Bytes(b) => b.clone(),
            MemoryValue::String(s) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                bytes
            }
        }
    }

    /// Decodes a value of `value_type` from the start of `bytes`
    ///
    /// Returns `None` when `bytes` is too short for a scalar. Strings stop at
    /// the first NUL and replace invalid UTF-8 lossily.
    pub fn from_bytes(bytes: &[u8], value_type: ValueType, order: ByteOrder) -> Option<Self> {
        let value = match value_type {
            ValueType::I8 => MemoryValue::I8(decode!(i8, bytes, order)),
            ValueType::I16 => MemoryValue::I16(decode!(i16, bytes, order)),
            ValueType::I32 => MemoryValue::I32(decode!(i32, bytes, order)),
            ValueType::I64 => MemoryValue::I64(decode!(i64, bytes, order)),
            ValueType::U8 => MemoryValue::U8(decode!(u8, bytes, order)),
            ValueType::U16 => MemoryValue::U16(decode!(u16, bytes, order)),
            ValueType::U32 => MemoryValue::U32(decode!(u32, bytes, order)),
            ValueType::U64 => MemoryValue::U64(decode!(u64, bytes, order)),
            ValueType::F32 => MemoryValue::F32(decode!(f32, bytes, order)),
            ValueType::F64 => MemoryValue::F64(decode!(f64, bytes, order)),
            ValueType::Bytes(len) => {
                let len = usize::try_from(len).ok()?;
                MemoryValue::Bytes(bytes.get(..len)?.to_vec())
            }
            ValueType::String => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                MemoryValue::String(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
        };
        Some(value)
    }

    /// Gets the value type enum for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::I8(_) => ValueType::I8,
            MemoryValue::I16(_) => ValueType::I16,
            MemoryValue::I32(_) => ValueType::I32,
            MemoryValue::I64(_) => ValueType::I64,
            MemoryValue::U8(_) => ValueType::U8,
            MemoryValue::U16(_) => ValueType::U16,
            MemoryValue::U32(_) => ValueType::U32,
            MemoryValue::U64(_) => ValueType::U64,
            MemoryValue::F32(_) => ValueType::F32,
            MemoryValue::F64(_) => ValueType::F64,
            MemoryValue::Bytes(b) => ValueType::Bytes(b.len() as u64),
            MemoryValue::String(_) => ValueType::String,
        }
    }
}

/// Enum representing the type of a memory value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Raw bytes of the given length
    Bytes(u64),
    /// NUL-terminated string, bounded by the accessor's string limit
    String,
}

impl ValueType {
    /// Returns the size in bytes for this value type, if fixed
    pub fn size(&self) -> Option<u64> {
        match self {
            ValueType::I8 | ValueType::U8 => Some(1),
            ValueType::I16 | ValueType::U16 => Some(2),
            ValueType::I32 | ValueType::U32 | ValueType::F32 => Some(4),
            ValueType::I64 | ValueType::U64 | ValueType::F64 => Some(8),
            ValueType::Bytes(len) => Some(*len),
            ValueType::String => None,
        }
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::I8(v) => write!(f, "{}", v),
            MemoryValue::I16(v) => write!(f, "{}", v),
            MemoryValue::I32(v) => write!(f, "{}", v),
            MemoryValue::I64(v) => write!(f, "{}", v),
            MemoryValue::U8(v) => write!(f, "{}", v),
            MemoryValue::U16(v) => write!(f, "{}", v),
            MemoryValue::U32(v) => write!(f, "{}", v),
            MemoryValue::U64(v) => write!(f, "{}", v),
            MemoryValue::F32(v) => write!(f, "{}", v),
            MemoryValue::F64(v) => write!(f, "{}", v),
            MemoryValue::Bytes(b) => write!(f, "{}", hex::encode(b)),
            MemoryValue::String(s) => write!(f, "\"{}\"", s),
        }
    }
}
