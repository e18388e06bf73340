//! DropZone Worker Library
//!
//! In-flight upload bookkeeping: the newest-first [`UploadQueue`] and the
//! [`ProgressSimulator`] that drives synthetic progress for each entry.

pub mod queue;
pub mod simulator;

pub use queue::{QueueError, QueueSummary, UploadQueue};
pub use simulator::{
    Increment, ProgressCounter, ProgressSimulator, ProgressSink, SimulationState, SimulatorConfig,
    Tick,
};
