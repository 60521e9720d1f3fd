//! Resolution of ambiguous transfer faults
//!
//! Some hosts answer a failed transfer with one status for both unmapped and
//! protected ranges. The region map is then walked over the requested range
//! to decide which of the two it was.

use crate::core::types::{
    Access, ReadError, RegionQuery, WriteError, DEFAULT_NESTING_DEPTH,
};
use crate::sys::{KernelStatus, StatusKind};

/// How the region map covers a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Coverage {
    /// Contiguously mapped and every region permits the access
    Accessible,
    /// Contiguously mapped but some region forbids the access
    Protected,
    /// At least one byte is not mapped
    Unmapped,
}

/// Walks the map over `[address, address + len)`
///
/// A failed query counts as unmapped. The caller guarantees the range does
/// not wrap.
pub(crate) fn coverage<Q: RegionQuery>(map: &Q, address: u64, len: u64, access: Access) -> Coverage {
    let end = address.saturating_add(len);
    let mut cursor = address;
    let mut protected = false;

    while cursor < end {
        let region = match map.query_region(cursor, DEFAULT_NESTING_DEPTH) {
            Ok(Some(region)) => region,
            Ok(None) | Err(_) => return Coverage::Unmapped,
        };
        if region.base.as_u64() > cursor {
            return Coverage::Unmapped;
        }
        if !region.protection.allows(access) {
            protected = true;
        }
        match region.end() {
            Some(next) if next.as_u64() > cursor => cursor = next.as_u64(),
            // Runs to the top of the address space
            None => break,
            Some(_) => return Coverage::Unmapped,
        }
    }

    if protected {
        Coverage::Protected
    } else {
        Coverage::Accessible
    }
}

/// Access-neutral outcome of a failed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    InvalidAddress,
    PermissionDenied,
    Unknown(i32),
}

/// Collapses a host status from a transfer into a [`Failure`]
pub(crate) fn classify<Q: RegionQuery>(
    map: &Q,
    status: KernelStatus,
    address: u64,
    len: u64,
    access: Access,
) -> Failure {
    match status.kind() {
        StatusKind::InvalidAddress => Failure::InvalidAddress,
        StatusKind::ProtectionFailure | StatusKind::AccessDenied => Failure::PermissionDenied,
        StatusKind::Fault => match coverage(map, address, len, access) {
            Coverage::Protected => Failure::PermissionDenied,
            // Mapped and permitted yet faulting: pages vanished under us
            Coverage::Accessible | Coverage::Unmapped => Failure::InvalidAddress,
        },
        StatusKind::NoSuchProcess | StatusKind::Other => Failure::Unknown(status.code()),
    }
}

impl From<Failure> for ReadError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::InvalidAddress => ReadError::InvalidAddress,
            Failure::PermissionDenied => ReadError::PermissionDenied,
            Failure::Unknown(code) => ReadError::Unknown(code),
        }
    }
}

impl From<Failure> for WriteError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::InvalidAddress => WriteError::InvalidAddress,
            Failure::PermissionDenied => WriteError::PermissionDenied,
            Failure::Unknown(code) => WriteError::Unknown(code),
        }
    }
}
