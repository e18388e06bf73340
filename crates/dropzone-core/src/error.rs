//! Error types module
//!
//! `AppError` is the application-wide error that library errors (validation,
//! store, queue) convert into at the service boundary. `ErrorMetadata` lets an
//! error describe how it should be surfaced to a user.

use crate::models::FileId;
use crate::validation::{Rejection, ValidationError};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "BACKEND_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the user may reasonably try the same action again.
    /// Nothing in DropZone retries automatically.
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed for {name}: {source}")]
    Validation {
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("File not found: {0}")]
    NotFound(FileId),

    #[error("Record store error: {0}")]
    Backend(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::validation(rejection.name, rejection.error)
    }
}

/// Static metadata per variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::Validation { source, .. } => match source {
            ValidationError::FileTooLarge { .. } => (
                "FILE_TOO_LARGE",
                false,
                Some("Choose a smaller file"),
                LogLevel::Debug,
            ),
            ValidationError::UnsupportedType { .. } => (
                "UNSUPPORTED_TYPE",
                false,
                Some("Upload an image, PDF, Office document, or text file"),
                LogLevel::Debug,
            ),
        },
        AppError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Refresh the file list"),
            LogLevel::Debug,
        ),
        AppError::Backend(_) => (
            "BACKEND_ERROR",
            true,
            Some("Try again in a moment"),
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the request and try again"),
            LogLevel::Debug,
        ),
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check the environment configuration"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    pub fn validation(name: impl Into<String>, source: ValidationError) -> Self {
        AppError::Validation {
            name: name.into(),
            source,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation { name, source } => format!("{}: {}", name, source),
            AppError::NotFound(_) => "File not found".to_string(),
            AppError::Backend(_) => "Failed to reach file storage".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Config(ref msg) => msg.clone(),
        }
    }
}
