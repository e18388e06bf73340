//! DropZone Infrastructure Library
//!
//! Shared infrastructure for DropZone binaries:
//! - Telemetry initialization (tracing subscriber)
//! - Error reports for user-facing output

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};

pub use error::ErrorResponse;
