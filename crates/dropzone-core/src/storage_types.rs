use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Record store backend types
///
/// Selects which `RecordStore` adapter the factory builds. Lives in core because
/// configuration parses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-memory records with artificial latency (offline/demo operation)
    Memory,
    /// HTTP record-storage service keyed by a collection name
    Remote,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mock" => Ok(StoreBackend::Memory),
            "remote" => Ok(StoreBackend::Remote),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Remote => write!(f, "remote"),
        }
    }
}
