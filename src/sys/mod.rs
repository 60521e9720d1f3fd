//! Host memory-introspection backends
//!
//! Exactly one backend is compiled in. Each exposes the same `Task` surface:
//! `open`, `read`, `write` and `query_region`, all returning a
//! [`KernelStatus`] on failure, and releases its OS reference on drop.

mod status;

pub(crate) use status::{KernelStatus, StatusKind};

#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) use linux::Task;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
pub(crate) use macos::Task;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub(crate) use self::windows::Task;

/// Converts a target range start into a native pointer value
///
/// Fails with an invalid-address status when `[address, address + len)` does
/// not fit the native pointer width.
#[cfg(not(target_os = "macos"))]
pub(crate) fn native_address(address: u64, len: usize) -> Result<usize, KernelStatus> {
    usize::try_from(address)
        .ok()
        .filter(|start| start.checked_add(len).is_some())
        .ok_or(KernelStatus::new(StatusKind::InvalidAddress, 0))
}
