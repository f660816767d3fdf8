//! The checkpoint engine of the monitor and the monitor itself.
//!
//! The machine calls ['Monitor::check_checkpoint'] on every instruction fetch and memory access
//! of a memspace with checkpoints, and enters the monitor with ['Monitor::execute_line'] when it
//! returns true.

#[macro_use]
extern crate log;

#[cfg(test)]
mod test;

mod monitor;

pub mod checkpoint;
pub mod cond;
pub mod event;
pub mod host;
pub mod symbol;

pub use checkpoint::{Checkpoint, CheckpointError, CheckpointId, CheckpointStatus, Checkpoints};
pub use cond::CondNode;
pub use event::{CheckpointInfo, CheckpointObserver};
pub use host::{Host, HostError, Timing};
pub use monitor::{Monitor, Resume, Settings};
pub use symbol::Symbols;
