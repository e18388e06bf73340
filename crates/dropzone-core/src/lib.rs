//! DropZone Core Library
//!
//! This crate provides the domain models, error types, configuration, and file
//! validation shared by every DropZone component.

pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CandidateFile, FileEntry, FileId, FileKind, FilePatch, FileStatus, NewFileEntry,
};
pub use storage_types::StoreBackend;
pub use validation::{FileValidator, ValidationError};
