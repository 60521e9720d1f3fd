//! Normalized outcome of a single host call

use crate::core::types::AttachError;
#[cfg(unix)]
use std::io;

/// What a failed host call meant, independent of the host's numbering
///
/// Not every host produces every kind.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    /// The process identifier names no live process
    NoSuchProcess,
    /// The caller lacks rights over the target
    AccessDenied,
    /// The address range is not mapped
    InvalidAddress,
    /// The range is mapped without the needed protection
    ProtectionFailure,
    /// The host reported a fault without saying which of the two above
    Fault,
    Other,
}

/// Raw outcome of one host call plus its classification
///
/// Never leaves the crate: each component collapses it into its own error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct KernelStatus {
    kind: StatusKind,
    code: i32,
}

impl KernelStatus {
    pub(crate) const fn new(kind: StatusKind, code: i32) -> Self {
        KernelStatus { kind, code }
    }

    pub(crate) const fn kind(&self) -> StatusKind {
        self.kind
    }

    pub(crate) const fn code(&self) -> i32 {
        self.code
    }

    /// Classifies a POSIX errno
    #[cfg(unix)]
    pub(crate) fn from_errno(code: i32) -> Self {
        let kind = match code {
            libc::ESRCH | libc::ENOENT => StatusKind::NoSuchProcess,
            libc::EACCES | libc::EPERM => StatusKind::AccessDenied,
            libc::EFAULT => StatusKind::Fault,
            _ => StatusKind::Other,
        };
        KernelStatus::new(kind, code)
    }

    /// Classifies the calling thread's last OS error
    #[cfg(unix)]
    pub(crate) fn last_os_error() -> Self {
        KernelStatus::from(io::Error::last_os_error())
    }

    /// Collapses the status into the attach taxonomy
    pub(crate) fn into_attach_error(self) -> AttachError {
        match self.kind {
            StatusKind::NoSuchProcess => AttachError::NoSuchProcess,
            StatusKind::AccessDenied | StatusKind::ProtectionFailure => {
                AttachError::PermissionDenied
            }
            _ => AttachError::Unknown(self.code),
        }
    }
}

#[cfg(unix)]
impl From<io::Error> for KernelStatus {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => KernelStatus::from_errno(code),
            // Short positioned I/O surfaces as UnexpectedEof without an errno
            None if err.kind() == io::ErrorKind::UnexpectedEof => {
                KernelStatus::new(StatusKind::Fault, libc::EFAULT)
            }
            None => KernelStatus::new(StatusKind::Other, libc::EIO),
        }
    }
}
