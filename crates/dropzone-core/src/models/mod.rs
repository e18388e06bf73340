pub mod file_entry;
pub mod file_kind;

pub use file_entry::{CandidateFile, FileEntry, FileId, FilePatch, FileStatus, NewFileEntry};
pub use file_kind::FileKind;
