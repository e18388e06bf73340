//! Upload intake service
//!
//! Runs the intake pipeline for a batch of candidate files:
//! validate → preview → create record → enqueue → simulate.
//! Completion (confirm → promote) is handled by [`QueueProgressSink`].

use std::sync::Arc;
use std::time::Duration;

use dropzone_core::validation::Rejection;
use dropzone_core::{
    AppError, CandidateFile, Config, FileEntry, FileId, FileValidator, NewFileEntry,
};
use dropzone_storage::RecordStore;
use dropzone_worker::{
    ProgressSimulator, ProgressSink, QueueSummary, SimulatorConfig, UploadQueue,
};
use tokio::sync::{broadcast, Mutex};

use crate::gallery::{Gallery, GalleryStats};
use crate::progress::{QueueProgressSink, UploadEvent};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A candidate that passed validation but could not be started.
#[derive(Debug)]
pub struct IntakeFailure {
    pub name: String,
    pub error: AppError,
}

/// Outcome of one intake batch. Every candidate lands in exactly one list.
#[derive(Debug, Default)]
pub struct IntakeReport {
    /// Entries now uploading, in intake order.
    pub accepted: Vec<FileEntry>,
    pub rejected: Vec<Rejection>,
    pub failed: Vec<IntakeFailure>,
}

impl IntakeReport {
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty() && self.failed.is_empty()
    }
}

/// Upload orchestration over a record store.
pub struct UploadService {
    store: Arc<dyn RecordStore>,
    validator: FileValidator,
    simulator: ProgressSimulator,
    queue: Arc<Mutex<UploadQueue>>,
    gallery: Arc<Mutex<Gallery>>,
    events: broadcast::Sender<UploadEvent>,
    sink: Arc<dyn ProgressSink>,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        validator: FileValidator,
        simulator_config: SimulatorConfig,
    ) -> Self {
        let queue = Arc::new(Mutex::new(UploadQueue::new()));
        let gallery = Arc::new(Mutex::new(Gallery::new()));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let sink: Arc<dyn ProgressSink> = Arc::new(QueueProgressSink::new(
            Arc::clone(&store),
            Arc::clone(&queue),
            Arc::clone(&gallery),
            events.clone(),
        ));

        Self {
            store,
            validator,
            simulator: ProgressSimulator::new(simulator_config),
            queue,
            gallery,
            events,
            sink,
        }
    }

    /// Build with the validator and simulator settings from `config`.
    pub fn from_config(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        Self::new(store, config.validator(), SimulatorConfig::from_config(config))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    /// Validate and start uploading a batch.
    ///
    /// Rejections and store failures are reported per file; one bad file
    /// never stops the rest of the batch.
    #[tracing::instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub async fn intake(&self, candidates: Vec<CandidateFile>) -> IntakeReport {
        // 1. Validate
        let batch = self.validator.validate_batch(candidates);
        for rejection in &batch.rejected {
            tracing::info!(
                name = %rejection.name,
                reason = %rejection.error,
                "File rejected"
            );
        }

        let mut report = IntakeReport {
            rejected: batch.rejected,
            ..IntakeReport::default()
        };

        for candidate in batch.accepted {
            match self.start_upload(&candidate).await {
                Ok(entry) => report.accepted.push(entry),
                Err(error) => {
                    tracing::error!(name = %candidate.name, error = %error, "Failed to start upload");
                    report.failed.push(IntakeFailure {
                        name: candidate.name,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            failed = report.failed.len(),
            "Intake finished"
        );
        report
    }

    async fn start_upload(&self, candidate: &CandidateFile) -> Result<FileEntry, AppError> {
        // 2. Preview (images only)
        let preview = candidate.preview_data_url();

        // 3. Create the record; the store assigns id and timestamp
        let new_entry = NewFileEntry::uploading(
            candidate.name.clone(),
            candidate.size,
            candidate.media_type.clone(),
            preview,
        );
        let record = self.store.create(new_entry).await?;

        // 4. Enqueue at 0%
        let id = self.queue.lock().await.enqueue(record.clone())?;

        // 5. Simulate progress
        self.simulator.start(id, Arc::clone(&self.sink));

        tracing::info!(
            file_id = %id,
            name = %record.name,
            size = record.size,
            media_type = %record.media_type,
            "Upload started"
        );
        Ok(record)
    }

    /// Stop an in-flight upload and drop it from the queue. The stored record
    /// is left as it is. Nothing is promoted or published for it afterwards,
    /// even if its completion was already being confirmed. Unknown ids are a
    /// no-op.
    pub async fn cancel(&self, id: FileId) -> Option<FileEntry> {
        self.simulator.cancel(id);
        let removed = self.queue.lock().await.cancel(id);
        if removed.is_some() {
            tracing::info!(file_id = %id, "Upload cancelled");
        }
        removed
    }

    /// Delete the stored record, then drop every local copy of it.
    pub async fn delete(&self, id: FileId) -> Result<(), AppError> {
        self.store.delete(id).await?;

        self.simulator.cancel(id);
        self.queue.lock().await.cancel(id);
        self.gallery.lock().await.remove(id);

        tracing::info!(file_id = %id, "File deleted");
        Ok(())
    }

    pub async fn get(&self, id: FileId) -> Result<FileEntry, AppError> {
        Ok(self.store.get(id).await?)
    }

    /// Reload the gallery from the store and return its entries.
    pub async fn refresh_gallery(&self) -> Result<Vec<FileEntry>, AppError> {
        let start = std::time::Instant::now();
        let records = self.store.list().await?;
        let gallery = Gallery::from_records(records);
        let entries = gallery.entries().to_vec();
        *self.gallery.lock().await = gallery;

        tracing::debug!(
            count = entries.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Gallery refreshed"
        );
        Ok(entries)
    }

    pub async fn queue_entries(&self) -> Vec<FileEntry> {
        self.queue.lock().await.entries().to_vec()
    }

    pub async fn queue_summary(&self) -> QueueSummary {
        self.queue.lock().await.summary()
    }

    pub async fn gallery_entries(&self) -> Vec<FileEntry> {
        self.gallery.lock().await.entries().to_vec()
    }

    pub async fn gallery_stats(&self) -> GalleryStats {
        self.gallery.lock().await.stats()
    }

    /// Wait until no queued entry is still uploading.
    pub async fn wait_for_uploads(&self) {
        let poll = self
            .simulator
            .config()
            .tick_interval
            .max(Duration::from_millis(10));
        while self.queue_summary().await.uploading > 0 {
            tokio::time::sleep(poll).await;
        }
    }

    /// Stop every running timer and drop the uploads still in flight from
    /// the queue. Returns how many uploads were stopped.
    pub async fn shutdown(&self) -> usize {
        let timers = self.simulator.cancel_all();
        let stopped = self.queue.lock().await.cancel_uploading();
        if !stopped.is_empty() {
            tracing::info!(timers, uploads = stopped.len(), "Uploads stopped");
        }
        stopped.len()
    }
}
