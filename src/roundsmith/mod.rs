//! RoundSmith orchestrator.
//!
//! - `core`: RoundSmith struct and initialization
//! - `tasks`: testable "*_once" functions and the spawned scheduler/fee tasks
//! - `handle`: serialized read/write interface for the serving layer
//! - `tests`: unit tests for the task functions

pub mod core;
pub mod handle;
pub mod tasks;

pub use self::core::{RoundSmith, SharedStore};
pub use self::handle::RoundHandle;

#[cfg(test)]
mod tests;
