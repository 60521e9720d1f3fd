//! Byte-range reads from a target

use super::fault::{self, Failure};
use crate::core::types::{Access, ReadError};
use crate::process::TaskHandle;
use crate::sys::{KernelStatus, StatusKind};
use std::alloc::{self, Layout};
use tracing::trace;

/// Reads exactly `length` bytes starting at `address`
///
/// The buffer is allocated zero-filled and only handed out once the whole
/// range has been copied. A range that is only partly readable fails as a
/// whole. A zero `length` succeeds with an empty buffer without touching
/// the target.
///
/// # Errors
///
/// - [`ReadError::InvalidAddress`] if any byte is unmapped, or if the range
///   wraps past the top of the address space
/// - [`ReadError::PermissionDenied`] if the range is mapped but not readable
/// - [`ReadError::Unknown`] for any other host status
pub fn read(handle: &TaskHandle, address: u64, length: u64) -> Result<Vec<u8>, ReadError> {
    if length == 0 {
        return Ok(Vec::new());
    }
    if address.checked_add(length).is_none() {
        return Err(ReadError::InvalidAddress);
    }

    let Some(mut buffer) = usize::try_from(length).ok().and_then(zeroed_buffer) else {
        // Larger than anything this process could hold
        let status = KernelStatus::new(StatusKind::Fault, 0);
        return Err(fault::classify(handle, status, address, length, Access::Read).into());
    };

    trace!(pid = handle.pid(), address, length, "read");
    handle
        .task()
        .read(address, &mut buffer)
        .map_err(|status| -> ReadError {
            let failure: Failure = fault::classify(handle, status, address, length, Access::Read);
            trace!(pid = handle.pid(), address, code = status.code(), ?failure, "read failed");
            failure.into()
        })?;

    Ok(buffer)
}

/// Fallible zeroed allocation of `len` bytes
///
/// The allocator hands back pages that are already zero, so nothing is
/// committed until the host copies into them.
fn zeroed_buffer(len: usize) -> Option<Vec<u8>> {
    if len == 0 {
        return Some(Vec::new());
    }
    let layout = Layout::array::<u8>(len).ok()?;
    // SAFETY: `layout` has a non-zero size.
    let ptr = unsafe { alloc::alloc_zeroed(layout) };
    if ptr.is_null() {
        return None;
    }
    // SAFETY: `ptr` came from the global allocator with the layout of
    // `len` initialized (zeroed) `u8`s.
    Some(unsafe { Vec::from_raw_parts(ptr, len, len) })
}
