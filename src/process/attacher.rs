//! Acquiring and releasing task handles

use super::TaskHandle;
use crate::core::types::{AttachError, ProcessId};
use crate::sys::Task;
use tracing::debug;

/// Acquires a task handle for `pid`
///
/// Attaching to the calling process's own identifier always succeeds where
/// the host facility exists, which makes self-attach the natural test
/// harness.
///
/// # Errors
///
/// - [`AttachError::NoSuchProcess`] if `pid` names no live process
/// - [`AttachError::PermissionDenied`] if the caller lacks rights over it
/// - [`AttachError::Unknown`] with the raw host status otherwise
pub fn attach(pid: ProcessId) -> Result<TaskHandle, AttachError> {
    match Task::open(pid) {
        Ok(task) => {
            debug!(pid, "attached");
            Ok(TaskHandle::new(task, pid))
        }
        Err(status) => {
            let err = status.into_attach_error();
            debug!(pid, code = status.code(), error = %err, "attach failed");
            Err(err)
        }
    }
}

/// Releases a task handle
///
/// Equivalent to dropping it. Taking the handle by value makes a second
/// release impossible.
pub fn release(handle: TaskHandle) {
    drop(handle);
}
