//! Linux backend over procfs and `process_vm_readv`/`process_vm_writev`
//!
//! The capability is an open read/write descriptor on `/proc/<pid>/mem`;
//! the kernel applies its ptrace access check when that file is opened.

mod maps;

use super::{native_address, KernelStatus, StatusKind};
use crate::core::types::{Access, RegionInfo};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

pub(crate) struct Task {
    pid: libc::pid_t,
    mem: File,
    vm_syscalls: AtomicBool,
}

impl Task {
    pub(crate) fn open(pid: u32) -> Result<Self, KernelStatus> {
        let pid = match libc::pid_t::try_from(pid) {
            Ok(pid) if pid > 0 => pid,
            _ => return Err(KernelStatus::from_errno(libc::ESRCH)),
        };

        let mem = OpenOptions::new()
            .read(true)
            .write(true)
            .open(format!("/proc/{}/mem", pid))?;

        Ok(Task {
            pid,
            mem,
            vm_syscalls: AtomicBool::new(true),
        })
    }

    /// Fills `buf` from `address`; a short transfer is a fault
    pub(crate) fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), KernelStatus> {
        if self.vm_syscalls.load(Ordering::Relaxed) {
            let local = libc::iovec {
                iov_base: buf.as_mut_ptr().cast(),
                iov_len: buf.len(),
            };
            let remote = libc::iovec {
                iov_base: native_address(address, buf.len())? as *mut libc::c_void,
                iov_len: buf.len(),
            };
            // SAFETY: `local` covers exactly `buf`, which outlives the call.
            // The remote iovec is only interpreted inside the target.
            let copied = unsafe { libc::process_vm_readv(self.pid, &local, 1, &remote, 1, 0) };
            if let Some(result) = self.transferred(copied, buf.len()) {
                return result;
            }
        }

        self.check_range(address, buf.len(), Access::Read)?;
        self.mem
            .read_exact_at(buf, address)
            .map_err(mem_file_status)
    }

    /// Copies `bytes` to `address`; a short transfer is a fault
    pub(crate) fn write(&self, address: u64, bytes: &[u8]) -> Result<(), KernelStatus> {
        if self.vm_syscalls.load(Ordering::Relaxed) {
            let local = libc::iovec {
                iov_base: bytes.as_ptr() as *mut libc::c_void,
                iov_len: bytes.len(),
            };
            let remote = libc::iovec {
                iov_base: native_address(address, bytes.len())? as *mut libc::c_void,
                iov_len: bytes.len(),
            };
            // SAFETY: the kernel only reads through `local`, which covers
            // exactly `bytes`.
            let copied = unsafe { libc::process_vm_writev(self.pid, &local, 1, &remote, 1, 0) };
            if let Some(result) = self.transferred(copied, bytes.len()) {
                return result;
            }
        }

        self.check_range(address, bytes.len(), Access::Write)?;
        self.mem
            .write_all_at(bytes, address)
            .map_err(mem_file_status)
    }

    /// Ignores `depth`: procfs maps have no nesting, every entry reports 0
    pub(crate) fn query_region(
        &self,
        address: u64,
        _depth: u32,
    ) -> Result<Option<RegionInfo>, KernelStatus> {
        maps::query(self.pid, address)
    }

    /// Interprets a `process_vm_*` return value
    ///
    /// `None` means the syscalls are unusable here and the caller should
    /// retry through the mem file.
    fn transferred(&self, copied: isize, wanted: usize) -> Option<Result<(), KernelStatus>> {
        if copied >= 0 {
            return Some(if copied as usize == wanted {
                Ok(())
            } else {
                Err(KernelStatus::new(StatusKind::Fault, libc::EFAULT))
            });
        }

        let status = KernelStatus::last_os_error();
        match status.code() {
            libc::ENOSYS | libc::EPERM => {
                warn!(
                    pid = self.pid,
                    errno = status.code(),
                    "process_vm syscalls unavailable, falling back to /proc/<pid>/mem"
                );
                self.vm_syscalls.store(false, Ordering::Relaxed);
                None
            }
            _ => Some(Err(status)),
        }
    }

    /// The mem file ignores page protections, so they are checked first
    fn check_range(&self, address: u64, len: usize, access: Access) -> Result<(), KernelStatus> {
        let end = address.saturating_add(len as u64);
        if maps::accessible(self.pid, address, end, access)? {
            Ok(())
        } else {
            Err(KernelStatus::new(StatusKind::Fault, libc::EFAULT))
        }
    }
}

/// `EIO` from the mem file means the page is not there
fn mem_file_status(err: io::Error) -> KernelStatus {
    match err.raw_os_error() {
        Some(libc::EIO) => KernelStatus::new(StatusKind::Fault, libc::EIO),
        _ => KernelStatus::from(err),
    }
}
