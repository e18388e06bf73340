//! Bridge from simulated progress to the store, the queue and the gallery.

use async_trait::async_trait;
use dropzone_core::{FileEntry, FileId, FilePatch};
use dropzone_storage::RecordStore;
use dropzone_worker::{ProgressSink, QueueError, UploadQueue};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use crate::gallery::Gallery;

/// Notifications for presentation code following uploads.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Progress { id: FileId, percent: u8 },
    Completed(FileEntry),
    Failed { id: FileId, reason: String },
}

/// Writes each tick to the store, then mirrors it into the queue.
///
/// Completion is only reflected in the queue and the gallery once the store
/// has confirmed `status=completed`. Anything reported for an entry that has
/// left the queue (cancelled, deleted, shut down) is dropped.
pub struct QueueProgressSink {
    store: Arc<dyn RecordStore>,
    queue: Arc<Mutex<UploadQueue>>,
    gallery: Arc<Mutex<Gallery>>,
    events: broadcast::Sender<UploadEvent>,
}

impl QueueProgressSink {
    pub fn new(
        store: Arc<dyn RecordStore>,
        queue: Arc<Mutex<UploadQueue>>,
        gallery: Arc<Mutex<Gallery>>,
        events: broadcast::Sender<UploadEvent>,
    ) -> Self {
        Self {
            store,
            queue,
            gallery,
            events,
        }
    }

    fn publish(&self, event: UploadEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Fail a still-queued entry and record the failure in the store.
    /// Entries cancelled in the meantime are left alone.
    async fn mark_failed(&self, id: FileId, reason: String) {
        if let Err(e) = self.queue.lock().await.on_error(id) {
            tracing::debug!(file_id = %id, error = %e, "Failure for an entry no longer uploading");
            return;
        }
        if let Err(e) = self.store.update(id, FilePatch::failed()).await {
            tracing::warn!(file_id = %id, error = %e, "Failed to record upload failure");
        }
        self.publish(UploadEvent::Failed { id, reason });
    }
}

#[async_trait]
impl ProgressSink for QueueProgressSink {
    async fn on_tick(&self, id: FileId, percent: u8) {
        if !self.queue.lock().await.contains(id) {
            tracing::debug!(file_id = %id, "Tick for an entry no longer queued");
            return;
        }
        if let Err(e) = self.store.update(id, FilePatch::progress(percent)).await {
            tracing::warn!(file_id = %id, percent, error = %e, "Failed to persist upload progress");
        }

        let result = self.queue.lock().await.on_progress(id, percent);
        match result {
            Ok(()) => self.publish(UploadEvent::Progress { id, percent }),
            Err(QueueError::NotFound(_)) => {
                tracing::debug!(file_id = %id, "Progress for an entry no longer queued");
            }
            Err(e) => tracing::warn!(file_id = %id, error = %e, "Rejected progress update"),
        }
    }

    async fn on_finished(&self, id: FileId) {
        let confirmed = match self.store.update(id, FilePatch::completed()).await {
            Ok(record) if record.is_completed() => record,
            Ok(record) => {
                tracing::error!(
                    file_id = %id,
                    status = %record.status,
                    "Record store did not confirm completion"
                );
                self.mark_failed(id, format!("record store reported status {}", record.status))
                    .await;
                return;
            }
            Err(e) => {
                tracing::error!(file_id = %id, error = %e, "Failed to confirm upload completion");
                self.mark_failed(id, e.to_string()).await;
                return;
            }
        };

        {
            // Promote under the queue lock: a cancel either lands first and
            // the entry is skipped, or sees it already completed.
            let mut queue = self.queue.lock().await;
            if let Err(e) = queue.on_complete(id) {
                tracing::info!(file_id = %id, error = %e, "Upload was cancelled while confirming");
                return;
            }
            self.gallery.lock().await.promote(confirmed.clone());
        }

        tracing::info!(
            file_id = %id,
            name = %confirmed.name,
            size = confirmed.size,
            "Upload completed"
        );
        self.publish(UploadEvent::Completed(confirmed));
    }
}
