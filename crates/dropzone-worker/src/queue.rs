//! Upload queue: the ordered set of in-flight file entries.
//!
//! The queue is a plain synchronous structure. Callers that share it across
//! tasks wrap it in a mutex and never hold the guard across an await.

use dropzone_core::{AppError, FileEntry, FileId, FileStatus};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("No queued upload with id {0}")]
    NotFound(FileId),

    #[error("Progress {percent} is out of range for upload {id}")]
    InvalidProgress { id: FileId, percent: u8 },

    #[error("Upload {id} is already {status}")]
    InvalidTransition { id: FileId, status: FileStatus },

    #[error("Upload {0} is already queued")]
    Duplicate(FileId),
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::NotFound(id) => AppError::NotFound(id),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

/// Counts of queue entries by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub uploading: usize,
    pub completed: usize,
    pub failed: usize,
}

impl QueueSummary {
    pub fn total(&self) -> usize {
        self.uploading + self.completed + self.failed
    }

    /// Human caption such as `2 uploading, 1 completed, 1 failed`.
    /// Zero counts are left out.
    pub fn caption(&self) -> String {
        let mut parts = Vec::new();
        if self.uploading > 0 {
            parts.push(format!("{} uploading", self.uploading));
        }
        if self.completed > 0 {
            parts.push(format!("{} completed", self.completed));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        parts.join(", ")
    }
}

impl fmt::Display for QueueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.caption())
    }
}

/// Newest-first collection of uploads in flight.
#[derive(Debug, Default)]
pub struct UploadQueue {
    entries: Vec<FileEntry>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry at the front, reset to `uploading` at 0%.
    pub fn enqueue(&mut self, mut entry: FileEntry) -> Result<FileId, QueueError> {
        if self.position(entry.id).is_some() {
            return Err(QueueError::Duplicate(entry.id));
        }

        entry.status = FileStatus::Uploading;
        entry.progress = 0;
        let id = entry.id;
        self.entries.insert(0, entry);

        tracing::debug!(file_id = %id, queued = self.entries.len(), "Upload enqueued");
        Ok(id)
    }

    /// Remove an entry. Unknown ids are a no-op.
    pub fn cancel(&mut self, id: FileId) -> Option<FileEntry> {
        let index = self.position(id)?;
        let removed = self.entries.remove(index);
        tracing::debug!(file_id = %id, status = %removed.status, "Upload removed from queue");
        Some(removed)
    }

    /// Remove every entry still uploading; finished ones stay.
    pub fn cancel_uploading(&mut self) -> Vec<FileEntry> {
        let (uploading, kept): (Vec<FileEntry>, Vec<FileEntry>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|e| e.status == FileStatus::Uploading);
        self.entries = kept;
        if !uploading.is_empty() {
            tracing::debug!(count = uploading.len(), "Uploading entries removed from queue");
        }
        uploading
    }

    /// Record progress for an uploading entry. Lower values than the current
    /// progress are ignored.
    pub fn on_progress(&mut self, id: FileId, percent: u8) -> Result<(), QueueError> {
        if percent > 100 {
            return Err(QueueError::InvalidProgress { id, percent });
        }
        let entry = self.uploading_mut(id)?;
        entry.progress = entry.progress.max(percent);
        Ok(())
    }

    pub fn on_complete(&mut self, id: FileId) -> Result<&FileEntry, QueueError> {
        let entry = self.uploading_mut(id)?;
        entry.status = FileStatus::Completed;
        entry.progress = 100;
        Ok(entry)
    }

    pub fn on_error(&mut self, id: FileId) -> Result<&FileEntry, QueueError> {
        let entry = self.uploading_mut(id)?;
        entry.status = FileStatus::Error;
        Ok(entry)
    }

    pub fn get(&self, id: FileId) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: FileId) -> bool {
        self.position(id).is_some()
    }

    /// Entries in display order, newest first.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> QueueSummary {
        self.entries
            .iter()
            .fold(QueueSummary::default(), |mut acc, e| {
                match e.status {
                    FileStatus::Uploading => acc.uploading += 1,
                    FileStatus::Completed => acc.completed += 1,
                    FileStatus::Error => acc.failed += 1,
                }
                acc
            })
    }

    fn position(&self, id: FileId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn uploading_mut(&mut self, id: FileId) -> Result<&mut FileEntry, QueueError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(QueueError::NotFound(id))?;
        if entry.status.is_terminal() {
            return Err(QueueError::InvalidTransition {
                id,
                status: entry.status,
            });
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64) -> FileEntry {
        FileEntry {
            id: FileId(id),
            name: format!("file-{id}.png"),
            size: 1024,
            media_type: "image/png".to_string(),
            progress: 40,
            status: FileStatus::Completed,
            preview: None,
            uploaded_at: None,
        }
    }

    #[test]
    fn enqueue_resets_and_prepends() {
        let mut queue = UploadQueue::new();
        queue.enqueue(entry(1)).unwrap();
        queue.enqueue(entry(2)).unwrap();

        let ids: Vec<u64> = queue.entries().iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
        let first = queue.get(FileId(1)).unwrap();
        assert_eq!(first.status, FileStatus::Uploading);
        assert_eq!(first.progress, 0);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut queue = UploadQueue::new();
        queue.enqueue(entry(1)).unwrap();
        assert_eq!(
            queue.enqueue(entry(1)),
            Err(QueueError::Duplicate(FileId(1)))
        );
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancel_unknown_is_noop() {
        let mut queue = UploadQueue::new();
        queue.enqueue(entry(1)).unwrap();

        assert!(queue.cancel(FileId(9)).is_none());
        assert_eq!(queue.cancel(FileId(1)).map(|e| e.id), Some(FileId(1)));
        assert!(queue.is_empty());
        assert!(queue.cancel(FileId(1)).is_none());
    }

    #[test]
    fn cancel_uploading_keeps_finished_entries() {
        let mut queue = UploadQueue::new();
        for id in 1..=3 {
            queue.enqueue(entry(id)).unwrap();
        }
        queue.on_complete(FileId(2)).unwrap();

        let removed: Vec<u64> = queue.cancel_uploading().iter().map(|e| e.id.0).collect();
        assert_eq!(removed, vec![3, 1]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.summary().completed, 1);
        assert!(queue.cancel_uploading().is_empty());
    }

    #[test]
    fn progress_is_monotonic_and_bounded() {
        let mut queue = UploadQueue::new();
        queue.enqueue(entry(1)).unwrap();

        queue.on_progress(FileId(1), 30).unwrap();
        queue.on_progress(FileId(1), 12).unwrap();
        assert_eq!(queue.get(FileId(1)).unwrap().progress, 30);

        assert_eq!(
            queue.on_progress(FileId(1), 101),
            Err(QueueError::InvalidProgress {
                id: FileId(1),
                percent: 101
            })
        );
        assert_eq!(
            queue.on_progress(FileId(7), 10),
            Err(QueueError::NotFound(FileId(7)))
        );
    }

    #[test]
    fn terminal_entries_reject_updates() {
        let mut queue = UploadQueue::new();
        queue.enqueue(entry(1)).unwrap();

        let done = queue.on_complete(FileId(1)).unwrap();
        assert_eq!(done.progress, 100);
        assert_eq!(done.status, FileStatus::Completed);

        let expected = Err(QueueError::InvalidTransition {
            id: FileId(1),
            status: FileStatus::Completed,
        });
        assert_eq!(queue.on_progress(FileId(1), 50), expected);
        assert_eq!(queue.on_error(FileId(1)).map(|e| e.id), expected.map(|_| FileId(1)));
    }

    #[test]
    fn summary_counts_and_caption() {
        let mut queue = UploadQueue::new();
        for id in 1..=4 {
            queue.enqueue(entry(id)).unwrap();
        }
        queue.on_complete(FileId(1)).unwrap();
        queue.on_error(FileId(2)).unwrap();

        let summary = queue.summary();
        assert_eq!(
            summary,
            QueueSummary {
                uploading: 2,
                completed: 1,
                failed: 1
            }
        );
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.to_string(), "2 uploading, 1 completed, 1 failed");
        assert_eq!(UploadQueue::new().summary().caption(), "");
    }
}
