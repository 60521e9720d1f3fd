//! Process attachment
//!
//! [`attach`] turns a process identifier into an owned [`TaskHandle`];
//! [`release`] (or dropping the handle) gives the OS reference back.

mod attacher;
mod handle;

pub use attacher::{attach, release};
pub use handle::TaskHandle;
