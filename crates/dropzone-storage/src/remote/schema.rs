//! Wire format of the remote record service.
//!
//! Field translation between `FileEntry` and the backend's column names lives
//! here and nowhere else.

use chrono::{DateTime, Utc};
use dropzone_core::{FileEntry, FileId, FilePatch, FileStatus, NewFileEntry};
use serde::{Deserialize, Serialize};

/// Columns requested on every read.
pub(crate) const FILE_FIELDS: &[&str] = &[
    "Name",
    "size_c",
    "type_c",
    "upload_progress_c",
    "status_c",
    "preview_c",
    "uploaded_at_c",
];

pub(crate) const UPLOADED_AT_FIELD: &str = "uploaded_at_c";

/// A file record as the backend stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredFileRecord {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(default)]
    pub size_c: u64,
    #[serde(default)]
    pub type_c: String,
    /// Some backends return progress as a float.
    #[serde(default)]
    pub upload_progress_c: f64,
    pub status_c: FileStatus,
    #[serde(default)]
    pub preview_c: Option<String>,
    #[serde(default)]
    pub uploaded_at_c: Option<DateTime<Utc>>,
}

impl From<StoredFileRecord> for FileEntry {
    fn from(record: StoredFileRecord) -> Self {
        FileEntry {
            id: FileId(record.id),
            name: record.name,
            size: record.size_c,
            media_type: record.type_c,
            progress: record.upload_progress_c.clamp(0.0, 100.0).floor() as u8,
            status: record.status_c,
            preview: record.preview_c,
            uploaded_at: record.uploaded_at_c,
        }
    }
}

/// Writable columns for a new record.
#[derive(Debug, Serialize)]
pub(crate) struct CreateFileFields {
    #[serde(rename = "Name")]
    pub name: String,
    pub size_c: u64,
    pub type_c: String,
    pub upload_progress_c: u8,
    pub status_c: FileStatus,
    pub preview_c: Option<String>,
    pub uploaded_at_c: DateTime<Utc>,
}

impl CreateFileFields {
    pub fn new(entry: NewFileEntry, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            name: entry.name,
            size_c: entry.size,
            type_c: entry.media_type,
            upload_progress_c: entry.progress.min(100),
            status_c: entry.status,
            preview_c: entry.preview,
            uploaded_at_c: uploaded_at,
        }
    }
}

/// Writable columns for an update. Absent fields are left untouched.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateFileFields {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_c: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_progress_c: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_c: Option<FileStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_c: Option<Option<String>>,
}

impl UpdateFileFields {
    pub fn new(id: FileId, patch: FilePatch) -> Self {
        Self {
            id: id.0,
            name: patch.name,
            size_c: patch.size,
            type_c: patch.media_type,
            upload_progress_c: patch.progress.map(|p| p.min(100)),
            status_c: patch.status,
            preview_c: patch.preview,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FieldSpec {
    pub field: FieldName,
}

#[derive(Debug, Serialize)]
pub(crate) struct FieldName {
    #[serde(rename = "Name")]
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: &'static str,
    pub sorttype: &'static str,
}

/// Body of a list query: projection plus ordering.
#[derive(Debug, Serialize)]
pub(crate) struct FetchParams {
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "orderBy")]
    pub order_by: Vec<OrderBy>,
}

impl FetchParams {
    pub fn newest_first() -> Self {
        Self {
            fields: FILE_FIELDS
                .iter()
                .map(|&name| FieldSpec {
                    field: FieldName { name },
                })
                .collect(),
            order_by: vec![OrderBy {
                field_name: UPLOADED_AT_FIELD,
                sorttype: "DESC",
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RecordsPayload<T> {
    pub records: Vec<T>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeletePayload {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<u64>,
}

/// Per-record outcome inside a batch response.
#[derive(Debug, Deserialize)]
pub(crate) struct RecordResult<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Every response from the record service is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    pub results: Option<Vec<RecordResult<T>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stored_record_translates_to_entry() {
        let record: StoredFileRecord = serde_json::from_value(json!({
            "Id": 12,
            "Name": "report.pdf",
            "size_c": 4096,
            "type_c": "application/pdf",
            "upload_progress_c": 37.8,
            "status_c": "uploading",
            "preview_c": null,
            "uploaded_at_c": "2026-10-18T14:05:00Z"
        }))
        .unwrap();

        let entry = FileEntry::from(record);
        assert_eq!(entry.id, FileId(12));
        assert_eq!(entry.media_type, "application/pdf");
        assert_eq!(entry.progress, 37);
        assert_eq!(entry.status, FileStatus::Uploading);
        assert!(entry.uploaded_at.is_some());
    }

    #[test]
    fn test_record_envelope_without_data_or_results() {
        let envelope: Envelope<StoredFileRecord> =
            serde_json::from_value(json!({"success": false, "message": "Record not found"}))
                .unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert!(envelope.results.is_none());

        let envelope: Envelope<StoredFileRecord> = serde_json::from_value(json!({
            "success": true,
            "results": [{
                "success": true,
                "data": {"Id": 5, "Name": "a.png", "status_c": "completed"}
            }]
        }))
        .unwrap();
        let results = envelope.results.unwrap();
        assert_eq!(results[0].data.as_ref().unwrap().id, 5);
        assert!(results[0].message.is_none());
    }

    #[test]
    fn test_update_fields_skip_absent_columns() {
        let body = serde_json::to_value(UpdateFileFields::new(FileId(3), FilePatch::completed()))
            .unwrap();
        assert_eq!(
            body,
            json!({"Id": 3, "upload_progress_c": 100, "status_c": "completed"})
        );
    }

    #[test]
    fn test_fetch_params_shape() {
        let body = serde_json::to_value(FetchParams::newest_first()).unwrap();
        assert_eq!(body["fields"][0], json!({"field": {"Name": "Name"}}));
        assert_eq!(body["fields"].as_array().unwrap().len(), FILE_FIELDS.len());
        assert_eq!(
            body["orderBy"],
            json!([{"fieldName": "uploaded_at_c", "sorttype": "DESC"}])
        );
    }
}
