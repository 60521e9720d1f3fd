//! Integration tests for process attachment and release

use vmprobe::{attach, read, release, AttachError, ReadError, TaskHandle};

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_attach_to_self() {
    let pid = std::process::id();
    let handle = attach(pid).unwrap();
    assert_eq!(handle.pid(), pid);
    assert_eq!(handle.to_string(), format!("TaskHandle(pid={})", pid));
    release(handle);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_attach_to_missing_process() {
    let result = attach(i32::MAX as u32);
    assert_eq!(result.unwrap_err(), AttachError::NoSuchProcess);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_reattach_after_release() {
    let pid = std::process::id();
    for _ in 0..3 {
        let handle = attach(pid).unwrap();
        release(handle);
    }

    // Dropping releases just like `release`
    {
        let _handle = attach(pid).unwrap();
    }
    assert!(attach(pid).is_ok());
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_handle_survives_failed_operations() {
    let handle = attach(std::process::id()).unwrap();
    let local = vec![0x5Au8; 32];

    assert_eq!(
        read(&handle, 0x7FFF_FFFF_F000_0000, 8).unwrap_err(),
        ReadError::InvalidAddress
    );
    assert_eq!(read(&handle, local.as_ptr() as u64, 4).unwrap(), vec![0x5A; 4]);
}

#[test]
#[cfg_attr(miri, ignore = "FFI not supported in Miri")]
fn test_handle_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TaskHandle>();

    let handle = attach(std::process::id()).unwrap();
    let buffers: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 64]).collect();

    std::thread::scope(|scope| {
        for (i, buffer) in buffers.iter().enumerate() {
            let handle = &handle;
            scope.spawn(move || {
                for _ in 0..100 {
                    let bytes = read(handle, buffer.as_ptr() as u64, 64).unwrap();
                    assert!(bytes.iter().all(|&b| b == i as u8));
                }
            });
        }
    });
}

#[test]
fn test_attach_error_messages() {
    assert_eq!(AttachError::NoSuchProcess.to_string(), "No such process");
    assert_eq!(
        AttachError::PermissionDenied.to_string(),
        "Permission denied attaching to process"
    );
}
