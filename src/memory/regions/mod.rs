//! Region lookup over a task's virtual memory map

mod scanner;

pub use scanner::{RegionScanner, RegionWalk};

use crate::core::types::{MemoryRegion, RegionInfo, ScanError};
use crate::process::TaskHandle;

/// First region at or after `hint` whose size is at least `min_size`
///
/// Scans at the default nesting depth. Use [`RegionScanner`] to choose a
/// different depth.
pub fn find_region_at_least(
    handle: &TaskHandle,
    hint: u64,
    min_size: u64,
) -> Result<MemoryRegion, ScanError> {
    RegionScanner::new(handle).find_at_least(hint, min_size)
}

/// Region containing `address`, or the first one after it
pub fn region_at(handle: &TaskHandle, address: u64) -> Result<Option<RegionInfo>, ScanError> {
    RegionScanner::new(handle).region_at(address)
}
