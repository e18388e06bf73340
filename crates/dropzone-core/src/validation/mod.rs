//! Validation modules

pub mod file;

pub use file::{
    content_type_for_extension, BatchValidation, FileValidator, Rejection, ValidationError,
    DEFAULT_ALLOWED_CONTENT_TYPES, DEFAULT_MAX_FILE_SIZE_BYTES,
};
