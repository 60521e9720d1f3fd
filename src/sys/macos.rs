//! macOS backend over Mach VM calls
//!
//! The capability is a send right to the target's task port, obtained with
//! `task_for_pid` and released with `mach_port_deallocate`.

use super::{KernelStatus, StatusKind};
use crate::core::types::{Address, Protection, RegionInfo};
use mach2::kern_return::{
    kern_return_t, KERN_FAILURE, KERN_INVALID_ADDRESS, KERN_INVALID_ARGUMENT,
    KERN_PROTECTION_FAILURE, KERN_SUCCESS,
};
use mach2::mach_port::mach_port_deallocate;
use mach2::message::mach_msg_type_number_t;
use mach2::port::{mach_port_t, MACH_PORT_NULL};
use mach2::traps::{mach_task_self, task_for_pid};
use mach2::vm::{mach_vm_read_overwrite, mach_vm_region_recurse, mach_vm_write};
use mach2::vm_prot::{VM_PROT_EXECUTE, VM_PROT_READ, VM_PROT_WRITE};
use mach2::vm_region::{
    vm_region_recurse_info_t, vm_region_submap_info_64, VM_REGION_SUBMAP_INFO_COUNT_64,
};
use mach2::vm_types::{mach_vm_address_t, mach_vm_size_t, natural_t, vm_offset_t};
use tracing::trace;

pub(crate) struct Task {
    port: mach_port_t,
}

/// Classifies a `kern_return_t` from a VM call
fn kern_status(kr: kern_return_t) -> KernelStatus {
    let kind = match kr {
        KERN_INVALID_ADDRESS => StatusKind::InvalidAddress,
        KERN_PROTECTION_FAILURE => StatusKind::ProtectionFailure,
        _ => StatusKind::Other,
    };
    KernelStatus::new(kind, kr)
}

impl Task {
    pub(crate) fn open(pid: u32) -> Result<Self, KernelStatus> {
        let pid = match libc::pid_t::try_from(pid) {
            Ok(pid) if pid > 0 => pid,
            _ => return Err(KernelStatus::from_errno(libc::ESRCH)),
        };

        // task_for_pid answers KERN_FAILURE for both a dead pid and a denied
        // one, so existence is probed first.
        // SAFETY: signal 0 performs the permission and existence checks only.
        if unsafe { libc::kill(pid, 0) } != 0 {
            let status = KernelStatus::last_os_error();
            if status.kind() == StatusKind::NoSuchProcess {
                return Err(status);
            }
        }

        let mut port: mach_port_t = MACH_PORT_NULL;
        // SAFETY: `port` is a valid out-pointer for the duration of the call.
        let kr = unsafe { task_for_pid(mach_task_self(), pid, &mut port) };
        match kr {
            KERN_SUCCESS => Ok(Task { port }),
            KERN_FAILURE | KERN_PROTECTION_FAILURE => {
                Err(KernelStatus::new(StatusKind::AccessDenied, kr))
            }
            _ => Err(KernelStatus::new(StatusKind::Other, kr)),
        }
    }

    /// Fills `buf` from `address`; a short transfer is a fault
    pub(crate) fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), KernelStatus> {
        let mut copied: mach_vm_size_t = 0;
        // SAFETY: the kernel writes at most `buf.len()` bytes into `buf`.
        let kr = unsafe {
            mach_vm_read_overwrite(
                self.port,
                address as mach_vm_address_t,
                buf.len() as mach_vm_size_t,
                buf.as_mut_ptr() as mach_vm_address_t,
                &mut copied,
            )
        };

        if kr != KERN_SUCCESS {
            return Err(kern_status(kr));
        }
        if copied != buf.len() as mach_vm_size_t {
            return Err(KernelStatus::new(StatusKind::Fault, KERN_INVALID_ADDRESS));
        }
        Ok(())
    }

    /// Copies `bytes` to `address` in a single call
    pub(crate) fn write(&self, address: u64, bytes: &[u8]) -> Result<(), KernelStatus> {
        // The count is 32-bit; splitting would break all-or-nothing.
        let count = mach_msg_type_number_t::try_from(bytes.len())
            .map_err(|_| KernelStatus::new(StatusKind::Other, KERN_INVALID_ARGUMENT))?;

        // SAFETY: the kernel only reads `count` bytes from `bytes`.
        let kr = unsafe {
            mach_vm_write(
                self.port,
                address as mach_vm_address_t,
                bytes.as_ptr() as vm_offset_t,
                count,
            )
        };

        if kr != KERN_SUCCESS {
            return Err(kern_status(kr));
        }
        Ok(())
    }

    /// One `mach_vm_region_recurse` call starting at `depth`
    pub(crate) fn query_region(
        &self,
        address: u64,
        depth: u32,
    ) -> Result<Option<RegionInfo>, KernelStatus> {
        let mut base: mach_vm_address_t = address;
        let mut size: mach_vm_size_t = 0;
        let mut nesting: natural_t = depth;
        // SAFETY: plain integer fields, all-zero is a valid value.
        let mut info: vm_region_submap_info_64 = unsafe { std::mem::zeroed() };
        let mut count: mach_msg_type_number_t = VM_REGION_SUBMAP_INFO_COUNT_64;

        // SAFETY: every out-pointer is valid and `count` matches `info`.
        let kr = unsafe {
            mach_vm_region_recurse(
                self.port,
                &mut base,
                &mut size,
                &mut nesting,
                &mut info as *mut vm_region_submap_info_64 as vm_region_recurse_info_t,
                &mut count,
            )
        };

        match kr {
            KERN_SUCCESS => {}
            // No region at or after `address`
            KERN_INVALID_ADDRESS => return Ok(None),
            _ => return Err(kern_status(kr)),
        }

        let prot = info.protection;
        trace!(base, size, nesting, prot, "mach_vm_region_recurse");

        Ok(Some(RegionInfo {
            base: Address::new(base),
            size,
            depth: nesting,
            protection: Protection {
                read: prot & VM_PROT_READ != 0,
                write: prot & VM_PROT_WRITE != 0,
                execute: prot & VM_PROT_EXECUTE != 0,
            },
        }))
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        // SAFETY: `port` is a send right this task owns exactly once.
        let kr = unsafe { mach_port_deallocate(mach_task_self(), self.port) };
        if kr != KERN_SUCCESS {
            trace!(port = self.port, kr, "mach_port_deallocate failed");
        }
    }
}
