use crate::traits::{RecordStore, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use chrono::Utc;
use dropzone_core::{FileEntry, FileId, FilePatch, NewFileEntry};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
    records: BTreeMap<FileId, FileEntry>,
    next_id: u64,
}

/// In-memory record store with artificial latency
///
/// Stands in for the remote backend during offline/demo operation. Ids are
/// assigned from an incrementing counter starting above any seeded record.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    latency: Duration,
}

impl MemoryStore {
    /// Create an empty store
    ///
    /// # Arguments
    /// * `latency` - Delay applied before every operation (zero disables it)
    pub fn new(latency: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                records: BTreeMap::new(),
                next_id: 1,
            })),
            latency,
        }
    }

    /// Create a store pre-populated with `records`, keeping their ids
    pub fn with_records(latency: Duration, records: Vec<FileEntry>) -> Self {
        let next_id = records.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let records = records.into_iter().map(|r| (r.id, r)).collect();
        Self {
            state: Arc::new(RwLock::new(MemoryState { records, next_id })),
            latency,
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<FileEntry>> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut records: Vec<FileEntry> = state.records.values().cloned().collect();
        // Newest first; ids break ties between records created in the same instant
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn get(&self, id: FileId) -> StoreResult<FileEntry> {
        self.simulate_latency().await;
        self.state
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, entry: NewFileEntry) -> StoreResult<FileEntry> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        let id = FileId(state.next_id);
        state.next_id += 1;

        let record = FileEntry::from_new(id, entry, Utc::now());
        state.records.insert(id, record.clone());

        tracing::debug!(file_id = %id, name = %record.name, "Memory store record created");
        Ok(record)
    }

    async fn update(&self, id: FileId, patch: FilePatch) -> StoreResult<FileEntry> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        let record = state.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(next) = patch.status {
            if !record.status.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    id,
                    from: record.status,
                    to: next,
                });
            }
        }
        record.apply_patch(&patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: FileId) -> StoreResult<()> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))?;

        tracing::debug!(file_id = %id, "Memory store record deleted");
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Memory
    }
}

#[cfg(all(test, feature = "store-memory"))]
mod tests {
    use super::*;
    use dropzone_core::FileStatus;

    fn new_png(name: &str) -> NewFileEntry {
        NewFileEntry::uploading(name, 2 * 1024 * 1024, "image/png", None)
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = MemoryStore::default();
        let payload = new_png("photo.png");

        let created = store.create(payload.clone()).await.unwrap();
        assert!(created.uploaded_at.is_some());
        assert_eq!(created.name, payload.name);
        assert_eq!(created.progress, 0);
        assert_eq!(created.status, FileStatus::Uploading);

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = MemoryStore::default();
        let a = store.create(new_png("a.png")).await.unwrap();
        let b = store.create(new_png("b.png")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryStore::default();
        let first = store.create(new_png("first.png")).await.unwrap();
        let second = store.create(new_png("second.png")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_and_missing_ids() {
        let store = MemoryStore::default();
        let created = store.create(new_png("a.png")).await.unwrap();

        let updated = store
            .update(created.id, FilePatch::completed())
            .await
            .unwrap();
        assert_eq!(updated.progress, 100);
        assert_eq!(updated.status, FileStatus::Completed);
        assert_eq!(updated.uploaded_at, created.uploaded_at);

        let missing = store.update(FileId(999), FilePatch::progress(5)).await;
        assert!(matches!(missing, Err(StoreError::NotFound(FileId(999)))));
    }

    #[tokio::test]
    async fn test_update_rejects_backward_status() {
        let store = MemoryStore::default();
        let created = store.create(new_png("a.png")).await.unwrap();
        store
            .update(created.id, FilePatch::completed())
            .await
            .unwrap();

        let result = store
            .update(
                created.id,
                FilePatch {
                    status: Some(FileStatus::Uploading),
                    progress: Some(3),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(StoreError::InvalidTransition {
                from: FileStatus::Completed,
                to: FileStatus::Uploading,
                ..
            })
        ));
        assert!(store.update(created.id, FilePatch::failed()).await.is_err());

        let stored = store.get(created.id).await.unwrap();
        assert_eq!(stored.status, FileStatus::Completed);
        assert_eq!(stored.progress, 100);

        // Re-confirming is allowed
        assert!(store.update(created.id, FilePatch::completed()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let store = MemoryStore::default();
        let created = store.create(new_png("a.png")).await.unwrap();

        store.delete(created.id).await.unwrap();
        assert!(store.get(created.id).await.unwrap_err().is_not_found());
        assert!(store.delete(created.id).await.unwrap_err().is_not_found());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_seeded_records_keep_ids() {
        let seeded = FileEntry::from_new(FileId(41), new_png("old.png"), Utc::now());
        let store = MemoryStore::with_records(Duration::ZERO, vec![seeded.clone()]);

        assert_eq!(store.get(FileId(41)).await.unwrap(), seeded);
        let created = store.create(new_png("new.png")).await.unwrap();
        assert_eq!(created.id, FileId(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let store = MemoryStore::new(Duration::from_millis(300));
        let start = tokio::time::Instant::now();
        store.list().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
