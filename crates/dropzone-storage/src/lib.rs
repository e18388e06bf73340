//! DropZone Storage Library
//!
//! This crate provides the record store abstraction and its adapters.
//! It includes the `RecordStore` trait, an in-memory adapter for offline/demo
//! operation, and a remote adapter for an HTTP record-storage service.
//!
//! # Field names
//!
//! The public `FileEntry` shape is the only shape the rest of DropZone sees.
//! Translating to a backend's storage schema (e.g. `size` to `size_c`) happens
//! inside the adapter that needs it.

pub mod factory;
#[cfg(feature = "store-memory")]
pub mod memory;
#[cfg(feature = "store-remote")]
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use dropzone_core::StoreBackend;
pub use factory::create_store;
#[cfg(feature = "store-memory")]
pub use memory::MemoryStore;
#[cfg(feature = "store-remote")]
pub use remote::{RemoteStore, RemoteStoreConfig};
pub use traits::{RecordStore, StoreError, StoreResult};
