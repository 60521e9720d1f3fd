//! Windows backend over kernel32 process memory calls

use super::{native_address, KernelStatus, StatusKind};
use crate::core::types::{Address, Protection, RegionInfo};
use std::mem;
use tracing::trace;
use winapi::shared::minwindef::{DWORD, FALSE, LPCVOID, LPVOID};
use winapi::shared::winerror::{
    ERROR_ACCESS_DENIED, ERROR_INVALID_ADDRESS, ERROR_INVALID_PARAMETER, ERROR_NOACCESS,
    ERROR_PARTIAL_COPY,
};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx, WriteProcessMemory};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winnt::{
    HANDLE, MEMORY_BASIC_INFORMATION, MEM_FREE, PAGE_EXECUTE, PAGE_EXECUTE_READ,
    PAGE_EXECUTE_READWRITE, PAGE_EXECUTE_WRITECOPY, PAGE_GUARD, PAGE_READONLY, PAGE_READWRITE,
    PAGE_WRITECOPY, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION, PROCESS_VM_READ,
    PROCESS_VM_WRITE,
};

const ACCESS_RIGHTS: DWORD =
    PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION | PROCESS_QUERY_INFORMATION;

pub(crate) struct Task {
    handle: HANDLE,
}

// Process handles may be used from any thread
unsafe impl Send for Task {}
unsafe impl Sync for Task {}

/// Classifies a Win32 error code
fn win32_status(code: DWORD) -> KernelStatus {
    let kind = match code {
        ERROR_INVALID_PARAMETER => StatusKind::NoSuchProcess,
        ERROR_ACCESS_DENIED => StatusKind::AccessDenied,
        ERROR_INVALID_ADDRESS => StatusKind::InvalidAddress,
        ERROR_PARTIAL_COPY | ERROR_NOACCESS => StatusKind::Fault,
        _ => StatusKind::Other,
    };
    KernelStatus::new(kind, code as i32)
}

fn last_error() -> KernelStatus {
    // SAFETY: reads thread-local state only.
    win32_status(unsafe { GetLastError() })
}

/// Maps a `PAGE_*` value onto read/write/execute
fn page_protection(protect: DWORD) -> Protection {
    if protect & PAGE_GUARD != 0 {
        return Protection::NONE;
    }
    let (read, write, execute) = match protect & 0xFF {
        PAGE_READONLY => (true, false, false),
        PAGE_READWRITE | PAGE_WRITECOPY => (true, true, false),
        PAGE_EXECUTE => (false, false, true),
        PAGE_EXECUTE_READ => (true, false, true),
        PAGE_EXECUTE_READWRITE | PAGE_EXECUTE_WRITECOPY => (true, true, true),
        _ => (false, false, false),
    };
    Protection {
        read,
        write,
        execute,
    }
}

impl Task {
    pub(crate) fn open(pid: u32) -> Result<Self, KernelStatus> {
        // SAFETY: no pointers are passed.
        let handle = unsafe { OpenProcess(ACCESS_RIGHTS, FALSE, pid) };
        if handle.is_null() {
            return Err(last_error());
        }
        Ok(Task { handle })
    }

    /// Fills `buf` from `address`; a short transfer is a fault
    pub(crate) fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), KernelStatus> {
        let remote = native_address(address, buf.len())?;
        let mut copied = 0;
        // SAFETY: the call writes at most `buf.len()` bytes into `buf`.
        let ok = unsafe {
            ReadProcessMemory(
                self.handle,
                remote as LPCVOID,
                buf.as_mut_ptr() as LPVOID,
                buf.len(),
                &mut copied,
            )
        };

        if ok == FALSE {
            return Err(last_error());
        }
        if copied != buf.len() {
            return Err(win32_status(ERROR_PARTIAL_COPY));
        }
        Ok(())
    }

    /// Copies `bytes` to `address`; a short transfer is a fault
    pub(crate) fn write(&self, address: u64, bytes: &[u8]) -> Result<(), KernelStatus> {
        let remote = native_address(address, bytes.len())?;
        let mut copied = 0;
        // SAFETY: the call only reads `bytes.len()` bytes from `bytes`.
        let ok = unsafe {
            WriteProcessMemory(
                self.handle,
                remote as LPVOID,
                bytes.as_ptr() as LPCVOID,
                bytes.len(),
                &mut copied,
            )
        };

        if ok == FALSE {
            return Err(last_error());
        }
        if copied != bytes.len() {
            return Err(win32_status(ERROR_PARTIAL_COPY));
        }
        Ok(())
    }

    /// Walks `VirtualQueryEx` past free ranges; `depth` has no meaning here
    pub(crate) fn query_region(
        &self,
        address: u64,
        _depth: u32,
    ) -> Result<Option<RegionInfo>, KernelStatus> {
        // Nothing lies above the native address space
        let Ok(mut cursor) = usize::try_from(address) else {
            return Ok(None);
        };
        loop {
            // SAFETY: all-zero is a valid MEMORY_BASIC_INFORMATION.
            let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { mem::zeroed() };
            // SAFETY: `mbi` is a valid out-buffer of the size passed.
            let written = unsafe {
                VirtualQueryEx(
                    self.handle,
                    cursor as LPCVOID,
                    &mut mbi,
                    mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };

            if written == 0 {
                let status = last_error();
                return match status.kind() {
                    // Past the highest user address
                    StatusKind::NoSuchProcess => Ok(None),
                    _ => Err(status),
                };
            }

            let base = mbi.BaseAddress as usize;
            let size = mbi.RegionSize;
            let end = match base.checked_add(size) {
                Some(end) if end > cursor => end,
                _ => return Ok(None),
            };

            if mbi.State == MEM_FREE {
                trace!(base, size, "skipping free range");
                cursor = end;
                continue;
            }

            return Ok(Some(RegionInfo {
                base: Address::new(base as u64),
                size: size as u64,
                depth: 0,
                protection: page_protection(mbi.Protect),
            }));
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        // SAFETY: `handle` came from OpenProcess and is closed exactly once.
        if unsafe { CloseHandle(self.handle) } == FALSE {
            trace!(error = ?last_error(), "CloseHandle failed");
        }
    }
}
