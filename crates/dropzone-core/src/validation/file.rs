use std::path::Path;

use crate::models::CandidateFile;

/// 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Media types accepted for intake unless configured otherwise.
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
];

/// Per-file rejection reasons. The display strings are user-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File size exceeds {max_mb}MB limit")]
    FileTooLarge { size: u64, max_mb: u64 },

    #[error("File type not supported")]
    UnsupportedType { media_type: String },
}

/// A candidate that failed validation, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub name: String,
    pub error: ValidationError,
}

/// Outcome of validating a batch: accepted candidates keep their order.
#[derive(Debug, Default)]
pub struct BatchValidation {
    pub accepted: Vec<CandidateFile>,
    pub rejected: Vec<Rejection>,
}

/// Size and media-type gate for intake candidates.
///
/// Pure: no I/O, no side effects.
#[derive(Debug, Clone)]
pub struct FileValidator {
    max_file_size: u64,
    allowed_content_types: Vec<String>,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_FILE_SIZE_BYTES,
            DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl FileValidator {
    pub fn new(max_file_size: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_content_types: allowed_content_types
                .into_iter()
                .map(|ct| ct.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    /// Validate a candidate's size and declared media type.
    ///
    /// Size is checked first, so an oversized file is reported as such whatever
    /// its type.
    pub fn validate(&self, size: u64, media_type: &str) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max_mb: self.max_file_size / (1024 * 1024),
            });
        }

        let normalized = media_type.trim().to_lowercase();
        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::UnsupportedType {
                media_type: media_type.to_string(),
            });
        }

        Ok(())
    }

    pub fn validate_file(&self, file: &CandidateFile) -> Result<(), ValidationError> {
        self.validate(file.size, &file.media_type)
    }

    /// Split a batch into accepted and rejected candidates. One bad file never
    /// stops the others.
    pub fn validate_batch(&self, files: Vec<CandidateFile>) -> BatchValidation {
        let mut outcome = BatchValidation::default();
        for file in files {
            match self.validate_file(&file) {
                Ok(()) => outcome.accepted.push(file),
                Err(error) => outcome.rejected.push(Rejection {
                    name: file.name,
                    error,
                }),
            }
        }
        outcome
    }
}

/// Declared media type for a file name, by extension.
///
/// Unknown extensions map to `application/octet-stream`, which the default
/// validator rejects.
pub fn content_type_for_extension(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "exe" => "application/x-msdownload",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
