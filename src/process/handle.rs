//! Owned task handle with RAII release

use crate::core::types::{ProcessId, RegionInfo, RegionQuery, ScanError};
use crate::sys::Task;
use std::fmt;
use tracing::{debug, trace};

/// Capability to read, write and enumerate one process's address space
///
/// Obtained from [`attach`](crate::attach). The OS reference is released
/// when the handle is dropped or passed to [`release`](crate::release).
/// Every operation borrows the handle, so it cannot be released while an
/// operation on it is outstanding.
pub struct TaskHandle {
    task: Task,
    pid: ProcessId,
}

impl TaskHandle {
    pub(crate) fn new(task: Task, pid: ProcessId) -> Self {
        TaskHandle { task, pid }
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub(crate) fn task(&self) -> &Task {
        &self.task
    }
}

impl RegionQuery for TaskHandle {
    fn query_region(&self, address: u64, depth: u32) -> Result<Option<RegionInfo>, ScanError> {
        trace!(pid = self.pid, address, depth, "querying region");
        self.task
            .query_region(address, depth)
            .map_err(|status| ScanError::Unknown(status.code()))
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        debug!(pid = self.pid, "releasing task handle");
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("pid", &self.pid).finish()
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskHandle(pid={})", self.pid)
    }
}
