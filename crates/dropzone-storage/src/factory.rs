#[cfg(feature = "store-memory")]
use crate::MemoryStore;
#[cfg(feature = "store-remote")]
use crate::{RemoteStore, RemoteStoreConfig};
#[cfg(not(all(feature = "store-memory", feature = "store-remote")))]
use crate::StoreError;
use crate::{RecordStore, StoreBackend, StoreResult};
use dropzone_core::Config;
use std::sync::Arc;

/// Create a record store based on configuration
pub async fn create_store(config: &Config) -> StoreResult<Arc<dyn RecordStore>> {
    match config.store_backend {
        #[cfg(feature = "store-remote")]
        StoreBackend::Remote => {
            let remote_config = RemoteStoreConfig::from_config(config)?;
            let store = RemoteStore::new(remote_config)?;
            tracing::info!(collection = %store.collection(), "Using remote record store");
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "store-remote"))]
        StoreBackend::Remote => Err(StoreError::Config(
            "Remote record store not available (store-remote feature not enabled)".to_string(),
        )),

        #[cfg(feature = "store-memory")]
        StoreBackend::Memory => {
            let latency = config.memory_store_latency();
            tracing::info!(
                latency_ms = latency.as_millis() as u64,
                "Using in-memory record store"
            );
            Ok(Arc::new(MemoryStore::new(latency)))
        }

        #[cfg(not(feature = "store-memory"))]
        StoreBackend::Memory => Err(StoreError::Config(
            "Memory record store not available (store-memory feature not enabled)".to_string(),
        )),
    }
}
