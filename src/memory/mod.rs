//! Memory operations on an attached task
//!
//! - [`read`] and [`write`] move byte ranges in and out of the target
//! - [`TypedMemory`] layers scalars, strings and [`MemoryValue`](crate::MemoryValue)s on top
//! - [`regions`] walks the target's virtual memory map

mod fault;
mod reader;
pub mod regions;
mod typed;
mod writer;

pub use reader::read;
pub use regions::{find_region_at_least, region_at, RegionScanner, RegionWalk};
pub use typed::TypedMemory;
pub use writer::write;
