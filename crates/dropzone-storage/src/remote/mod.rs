//! Remote record store
//!
//! Talks JSON to a record-storage service that keeps file metadata in a named
//! collection. Credentials are passed in explicitly through
//! [`RemoteStoreConfig`].

mod schema;

use crate::traits::{RecordStore, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use chrono::Utc;
use dropzone_core::{Config, FileEntry, FileId, FilePatch, NewFileEntry};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use schema::{
    CreateFileFields, DeletePayload, Envelope, FetchParams, RecordResult, RecordsPayload,
    StoredFileRecord, UpdateFileFields,
};

/// Connection settings for the remote record service.
#[derive(Clone, Debug)]
pub struct RemoteStoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub collection: String,
    pub timeout: Duration,
}

impl RemoteStoreConfig {
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let base_url = config
            .record_store_url
            .clone()
            .ok_or_else(|| StoreError::Config("RECORD_STORE_URL not configured".to_string()))?;
        let project_id = config.record_store_project_id.clone().ok_or_else(|| {
            StoreError::Config("RECORD_STORE_PROJECT_ID not configured".to_string())
        })?;
        let public_key = config.record_store_public_key.clone().ok_or_else(|| {
            StoreError::Config("RECORD_STORE_PUBLIC_KEY not configured".to_string())
        })?;

        Ok(Self {
            base_url,
            project_id,
            public_key,
            collection: config.record_store_collection.clone(),
            timeout: config.record_store_timeout(),
        })
    }
}

/// Record store backed by the remote record service
#[derive(Clone, Debug)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
    project_id: String,
    public_key: String,
    collection: String,
}

impl RemoteStore {
    pub fn new(config: RemoteStoreConfig) -> StoreResult<Self> {
        if config.collection.is_empty() {
            return Err(StoreError::Config("collection name is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id,
            public_key: config.public_key,
            collection: config.collection,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn records_url(&self) -> String {
        format!("{}/collections/{}/records", self.base_url, self.collection)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Project-Id", self.project_id.as_str())
            .header("Authorization", format!("Bearer {}", self.public_key))
    }

    /// Send a request and decode the envelope. `not_found` is returned for
    /// HTTP 404 so callers can map it to the id they asked about.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        not_found: Option<FileId>,
    ) -> StoreResult<Envelope<T>> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = not_found {
                return Err(StoreError::NotFound(id));
            }
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Http(format!(
                "status {}: {}",
                status, error_text
            )));
        }

        response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Fail the whole call if the envelope or any record in it failed.
fn check_envelope<T>(envelope: &Envelope<T>, action: &str) -> StoreResult<()> {
    if !envelope.success {
        let message = envelope
            .message
            .clone()
            .unwrap_or_else(|| format!("Failed to {}", action));
        tracing::error!(action = action, message = %message, "Record store call failed");
        return Err(StoreError::Backend(message));
    }

    if let Some(results) = &envelope.results {
        let failed: Vec<&RecordResult<T>> = results.iter().filter(|r| !r.success).collect();
        if !failed.is_empty() {
            let messages: Vec<String> = failed
                .iter()
                .map(|r| r.message.clone().unwrap_or_else(|| "unknown".to_string()))
                .collect();
            tracing::error!(
                action = action,
                failed = failed.len(),
                total = results.len(),
                messages = ?messages,
                "Record store batch partially failed"
            );
            return Err(StoreError::Backend(format!(
                "Failed to {}: {} of {} records failed ({})",
                action,
                failed.len(),
                results.len(),
                messages.join("; ")
            )));
        }
    }

    Ok(())
}

/// First successful record of a batch response.
fn first_record(envelope: Envelope<StoredFileRecord>, action: &str) -> StoreResult<FileEntry> {
    envelope
        .results
        .and_then(|results| results.into_iter().find_map(|r| r.data))
        .or(envelope.data)
        .map(FileEntry::from)
        .ok_or_else(|| StoreError::Decode(format!("{} response carried no record", action)))
}

#[async_trait]
impl RecordStore for RemoteStore {
    async fn list(&self) -> StoreResult<Vec<FileEntry>> {
        let start = std::time::Instant::now();
        let request = self
            .client
            .post(format!("{}/query", self.records_url()))
            .json(&FetchParams::newest_first());

        let envelope: Envelope<Vec<StoredFileRecord>> = self.send(request, None).await?;
        check_envelope(&envelope, "fetch files")?;

        let records: Vec<FileEntry> = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(FileEntry::from)
            .collect();

        tracing::debug!(
            collection = %self.collection,
            count = records.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote store list successful"
        );
        Ok(records)
    }

    async fn get(&self, id: FileId) -> StoreResult<FileEntry> {
        let request = self.client.get(format!("{}/{}", self.records_url(), id));
        let envelope: Envelope<StoredFileRecord> = self.send(request, Some(id)).await?;

        if !envelope.success {
            tracing::debug!(file_id = %id, message = ?envelope.message, "Remote record not found");
            return Err(StoreError::NotFound(id));
        }

        envelope
            .data
            .map(FileEntry::from)
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, entry: NewFileEntry) -> StoreResult<FileEntry> {
        let start = std::time::Instant::now();
        let payload = RecordsPayload {
            records: vec![CreateFileFields::new(entry, Utc::now())],
        };
        let request = self.client.post(self.records_url()).json(&payload);

        let envelope: Envelope<StoredFileRecord> = self.send(request, None).await?;
        check_envelope(&envelope, "create file record")?;
        let created = first_record(envelope, "create")?;

        tracing::info!(
            file_id = %created.id,
            name = %created.name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote store create successful"
        );
        Ok(created)
    }

    async fn update(&self, id: FileId, patch: FilePatch) -> StoreResult<FileEntry> {
        let payload = RecordsPayload {
            records: vec![UpdateFileFields::new(id, patch)],
        };
        let request = self.client.patch(self.records_url()).json(&payload);

        let envelope: Envelope<StoredFileRecord> = self.send(request, Some(id)).await?;
        check_envelope(&envelope, "update file")?;
        first_record(envelope, "update")
    }

    async fn delete(&self, id: FileId) -> StoreResult<()> {
        let start = std::time::Instant::now();
        let payload = DeletePayload {
            record_ids: vec![id.0],
        };
        let request = self.client.delete(self.records_url()).json(&payload);

        let envelope: Envelope<serde_json::Value> = self.send(request, Some(id)).await?;
        check_envelope(&envelope, "delete file")?;

        tracing::info!(
            file_id = %id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote store delete successful"
        );
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Remote
    }
}
