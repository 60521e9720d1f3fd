//! Integration tests for typed access against the test process

use pretty_assertions::assert_eq;
use vmprobe::{
    attach, ByteOrder, MemoryConfig, MemoryValue, ReadError, TaskHandle, TypedMemory, ValueType,
};

fn self_handle() -> TaskHandle {
    attach(std::process::id()).unwrap()
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_scalar_round_trips_in_every_order() {
    let handle = self_handle();
    let mut slot = vec![0u8; 16];
    let address = slot.as_mut_ptr() as u64;

    for order in [ByteOrder::Little, ByteOrder::Big, ByteOrder::Native] {
        let memory = TypedMemory::new(&handle, order);

        memory.write_u8(address, 0xAB).unwrap();
        assert_eq!(memory.read_u8(address).unwrap(), 0xAB);

        memory.write_i16(address, -12345).unwrap();
        assert_eq!(memory.read_i16(address).unwrap(), -12345);

        memory.write_u32(address, 0xCAFE_BABE).unwrap();
        assert_eq!(memory.read_u32(address).unwrap(), 0xCAFE_BABE);

        memory.write_i64(address, i64::MIN + 7).unwrap();
        assert_eq!(memory.read_i64(address).unwrap(), i64::MIN + 7);

        memory.write_f32(address, 64.0).unwrap();
        assert_eq!(memory.read_f32(address).unwrap(), 64.0);

        memory.write_f64(address + 3, -0.125).unwrap();
        assert_eq!(memory.read_f64(address + 3).unwrap(), -0.125);
    }
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_byte_order_layout() {
    let handle = self_handle();
    let mut slot = vec![0u8; 8];
    let address = slot.as_mut_ptr() as u64;

    let big = TypedMemory::new(&handle, ByteOrder::Big);
    big.write_u32(address, 0x1122_3344).unwrap();
    assert_eq!(big.read_bytes(address, 4).unwrap(), vec![0x11, 0x22, 0x33, 0x44]);

    let little = TypedMemory::new(&handle, ByteOrder::Little);
    assert_eq!(little.read_u32(address).unwrap(), 0x4433_2211);
    little.write_u16(address, 0x0102).unwrap();
    assert_eq!(little.read_bytes(address, 2).unwrap(), vec![0x02, 0x01]);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_strings() {
    let handle = self_handle();
    let memory = TypedMemory::new(&handle, ByteOrder::Native);
    let mut slot = vec![0xFFu8; 32];
    let address = slot.as_mut_ptr() as u64;

    memory.write_string(address, "payload").unwrap();
    assert_eq!(memory.read_bytes(address, 8).unwrap(), b"payload\0".to_vec());
    assert_eq!(memory.read_string(address, 32).unwrap(), "payload");
    assert_eq!(memory.read_string(address, 4).unwrap(), "payl");
    assert_eq!(memory.read_string(address, 0).unwrap(), "");

    memory.write_bytes(address, &[b'o', b'k', 0xFF, 0]).unwrap();
    assert_eq!(memory.read_string(address, 8).unwrap(), "ok\u{FFFD}");
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_memory_values() {
    let handle = self_handle();
    let config = MemoryConfig {
        byte_order: ByteOrder::Big,
        max_string_length: 16,
    };
    let memory = TypedMemory::from_config(&handle, &config);
    let mut slot = vec![0u8; 64];
    let address = slot.as_mut_ptr() as u64;

    let cases = vec![
        MemoryValue::I8(-3),
        MemoryValue::U16(0xBEEF),
        MemoryValue::I32(-100_000),
        MemoryValue::U64(u64::MAX - 1),
        MemoryValue::F64(2.5),
        MemoryValue::Bytes(vec![1, 2, 3, 4, 5]),
        MemoryValue::String("hello".to_string()),
    ];

    for value in cases {
        memory.write_value(address, &value).unwrap();
        assert_eq!(
            memory.read_value(address, value.value_type()).unwrap(),
            value
        );
    }

    memory.write_value(address, &MemoryValue::U16(0x0102)).unwrap();
    assert_eq!(slot[0], 0x01);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_typed_errors_come_from_accessor() {
    let handle = self_handle();
    let memory = TypedMemory::new(&handle, ByteOrder::Native);
    assert_eq!(
        memory.read_u64(0x7FFF_FFFF_F000_0000).unwrap_err(),
        ReadError::InvalidAddress
    );
    assert_eq!(
        memory
            .read_value(0x7FFF_FFFF_F000_0000, ValueType::String)
            .unwrap_err(),
        ReadError::InvalidAddress
    );
}
