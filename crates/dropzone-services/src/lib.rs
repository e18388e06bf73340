//! DropZone Services Layer
//!
//! Orchestration of the intake pipeline on top of the core, storage and worker
//! crates. Presentation code (the CLI) talks to [`UploadService`] and never to
//! the store, queue or simulator directly.

pub mod gallery;
pub mod progress;
pub mod upload;

pub use dropzone_storage::{create_store, RecordStore, StoreBackend, StoreError};
pub use dropzone_worker::{QueueSummary, SimulatorConfig};
pub use gallery::{Gallery, GalleryStats};
pub use progress::{QueueProgressSink, UploadEvent};
pub use upload::{IntakeFailure, IntakeReport, UploadService};
