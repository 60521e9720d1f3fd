//! Byte-range writes into a target

use super::fault::{self, Failure};
use crate::core::types::{Access, WriteError};
use crate::process::TaskHandle;
use tracing::trace;

const PREVIEW_BYTES: usize = 16;

/// Writes all of `bytes` starting at `address`
///
/// Either the whole range is written or an error is returned. An empty
/// slice succeeds without touching the target.
///
/// # Errors
///
/// - [`WriteError::InvalidAddress`] if any byte is unmapped, or if the range
///   wraps past the top of the address space
/// - [`WriteError::PermissionDenied`] if the range is mapped but not writable
/// - [`WriteError::Unknown`] for any other host status
pub fn write(handle: &TaskHandle, address: u64, bytes: &[u8]) -> Result<(), WriteError> {
    if bytes.is_empty() {
        return Ok(());
    }
    let length = bytes.len() as u64;
    if address.checked_add(length).is_none() {
        return Err(WriteError::InvalidAddress);
    }

    trace!(
        pid = handle.pid(),
        address,
        length,
        preview = %hex::encode(&bytes[..bytes.len().min(PREVIEW_BYTES)]),
        "write"
    );
    handle
        .task()
        .write(address, bytes)
        .map_err(|status| -> WriteError {
            let failure: Failure = fault::classify(handle, status, address, length, Access::Write);
            trace!(pid = handle.pid(), address, code = status.code(), ?failure, "write failed");
            failure.into()
        })
}
