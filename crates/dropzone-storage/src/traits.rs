//! Record store abstraction trait
//!
//! This module defines the `RecordStore` trait that all record store adapters
//! must implement.

use async_trait::async_trait;
use dropzone_core::{AppError, FileEntry, FileId, FilePatch, FileStatus, NewFileEntry};
use thiserror::Error;

use crate::StoreBackend;

/// Record store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(FileId),

    /// The backend answered but reported failure, including any failed record
    /// in a batch response.
    #[error("Record store backend error: {0}")]
    Backend(String),

    #[error("File {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: FileId,
        from: FileStatus,
        to: FileStatus,
    },

    #[error("Record store request failed: {0}")]
    Http(String),

    #[error("Failed to decode record store response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            StoreError::Config(msg) => AppError::Config(msg),
            err @ StoreError::InvalidTransition { .. } => AppError::InvalidInput(err.to_string()),
            other => AppError::Backend(other.to_string()),
        }
    }
}

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store abstraction trait
///
/// Durable collection of file metadata. Every call is awaited once; adapters
/// never retry. A failed `create` leaves nothing behind and a failed
/// `update`/`delete` leaves the prior record unchanged.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, newest `uploaded_at` first
    async fn list(&self) -> StoreResult<Vec<FileEntry>>;

    /// A single record by id
    async fn get(&self, id: FileId) -> StoreResult<FileEntry>;

    /// Persist a new record. The store assigns `id` and `uploaded_at`.
    async fn create(&self, entry: NewFileEntry) -> StoreResult<FileEntry>;

    /// Write the present fields of `patch` and return the updated record.
    /// A status that would move backwards is rejected and nothing is written.
    async fn update(&self, id: FileId, patch: FilePatch) -> StoreResult<FileEntry>;

    /// Remove a record
    async fn delete(&self, id: FileId) -> StoreResult<()>;

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;
}
