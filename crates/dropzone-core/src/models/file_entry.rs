use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of a file entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(FileId)
    }
}

impl From<u64> for FileId {
    fn from(value: u64) -> Self {
        FileId(value)
    }
}

/// Upload status of a file entry.
///
/// Transitions only go forward: `Uploading -> Completed` or `Uploading -> Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Uploading,
    Completed,
    Error,
}

impl FileStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FileStatus::Uploading)
    }

    /// Whether moving from `self` to `next` is allowed. Staying put is allowed.
    pub fn can_transition_to(&self, next: FileStatus) -> bool {
        *self == next || (*self == FileStatus::Uploading && next.is_terminal())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploading => "uploading",
            FileStatus::Completed => "completed",
            FileStatus::Error => "error",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uploading" => Ok(FileStatus::Uploading),
            "completed" => Ok(FileStatus::Completed),
            "error" => Ok(FileStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid file status: {}", s)),
        }
    }
}

/// One file's upload/record state as tracked by the queue or the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: FileId,
    pub name: String,
    pub size: u64,
    pub media_type: String,
    pub progress: u8,
    pub status: FileStatus,
    pub preview: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl FileEntry {
    /// Build a stored entry from a creation payload.
    pub fn from_new(id: FileId, new: NewFileEntry, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            size: new.size,
            media_type: new.media_type,
            progress: new.progress.min(100),
            status: new.status,
            preview: new.preview,
            uploaded_at: Some(uploaded_at),
        }
    }

    pub fn is_image(&self) -> bool {
        is_image_type(&self.media_type)
    }

    pub fn is_completed(&self) -> bool {
        self.status == FileStatus::Completed
    }

    /// Apply the present fields of `patch`. The id is never touched.
    pub fn apply_patch(&mut self, patch: &FilePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(media_type) = &patch.media_type {
            self.media_type = media_type.clone();
        }
        if let Some(progress) = patch.progress {
            self.progress = progress.min(100);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(preview) = &patch.preview {
            self.preview = preview.clone();
        }
    }
}

/// Creation payload for a record store. The store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFileEntry {
    pub name: String,
    pub size: u64,
    pub media_type: String,
    pub progress: u8,
    pub status: FileStatus,
    pub preview: Option<String>,
}

impl NewFileEntry {
    /// A fresh intake record: `uploading` at 0%.
    pub fn uploading(
        name: impl Into<String>,
        size: u64,
        media_type: impl Into<String>,
        preview: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: media_type.into(),
            progress: 0,
            status: FileStatus::Uploading,
            preview,
        }
    }
}

/// Partial update of a stored entry. Only `Some` fields are written.
///
/// `preview` is doubly optional: `Some(None)` clears the preview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Option<String>>,
}

impl FilePatch {
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Default::default()
        }
    }

    pub fn completed() -> Self {
        Self {
            progress: Some(100),
            status: Some(FileStatus::Completed),
            ..Default::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            status: Some(FileStatus::Error),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &FilePatch::default()
    }
}

/// A file offered for intake, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
    pub media_type: String,
    /// Raw bytes, used only to build an image preview.
    pub content: Option<Vec<u8>>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, size: u64, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: media_type.into(),
            content: None,
        }
    }

    pub fn with_content(
        name: impl Into<String>,
        media_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            size: content.len() as u64,
            media_type: media_type.into(),
            content: Some(content),
        }
    }

    pub fn is_image(&self) -> bool {
        is_image_type(&self.media_type)
    }

    /// `data:` URL of the content for image types; `None` otherwise.
    pub fn preview_data_url(&self) -> Option<String> {
        if !self.is_image() {
            return None;
        }
        let content = self.content.as_ref()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        Some(format!(
            "data:{};base64,{}",
            self.media_type.to_lowercase(),
            encoded
        ))
    }
}

fn is_image_type(media_type: &str) -> bool {
    media_type.to_lowercase().starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> FileEntry {
        FileEntry::from_new(
            FileId(7),
            NewFileEntry::uploading("photo.png", 2048, "image/png", None),
            Utc::now(),
        )
    }

    #[test]
    fn test_status_transitions() {
        assert!(FileStatus::Uploading.can_transition_to(FileStatus::Completed));
        assert!(FileStatus::Uploading.can_transition_to(FileStatus::Error));
        assert!(FileStatus::Completed.can_transition_to(FileStatus::Completed));
        assert!(!FileStatus::Completed.can_transition_to(FileStatus::Uploading));
        assert!(!FileStatus::Error.can_transition_to(FileStatus::Completed));
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&FileStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!("ERROR".parse::<FileStatus>().unwrap(), FileStatus::Error);
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut entry = sample_entry();
        entry.apply_patch(&FilePatch::progress(42));
        assert_eq!(entry.progress, 42);
        assert_eq!(entry.status, FileStatus::Uploading);
        assert_eq!(entry.name, "photo.png");

        entry.apply_patch(&FilePatch::completed());
        assert_eq!(entry.progress, 100);
        assert_eq!(entry.status, FileStatus::Completed);
        assert_eq!(entry.id, FileId(7));
    }

    #[test]
    fn test_apply_patch_clears_preview() {
        let mut entry = sample_entry();
        entry.preview = Some("data:image/png;base64,AA==".to_string());
        entry.apply_patch(&FilePatch {
            preview: Some(None),
            ..Default::default()
        });
        assert!(entry.preview.is_none());
    }

    #[test]
    fn test_preview_only_for_images() {
        let image = CandidateFile::with_content("a.png", "image/png", vec![1, 2, 3]);
        assert_eq!(
            image.preview_data_url().as_deref(),
            Some("data:image/png;base64,AQID")
        );

        let text = CandidateFile::with_content("a.txt", "text/plain", b"hi".to_vec());
        assert!(text.preview_data_url().is_none());

        let no_content = CandidateFile::new("b.png", 10, "image/png");
        assert!(no_content.preview_data_url().is_none());
    }

    #[test]
    fn test_file_id_parse() {
        assert_eq!("42".parse::<FileId>().unwrap(), FileId(42));
        assert!("abc".parse::<FileId>().is_err());
        assert_eq!(serde_json::to_string(&FileId(3)).unwrap(), "3");
    }
}
