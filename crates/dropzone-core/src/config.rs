//! Configuration module
//!
//! Configuration is an explicit value handed to the factories that build the
//! record store, the simulator, and the validator. `Config::from_env` is only a
//! convenience for binaries; library code never reads the environment.

use std::env;
use std::time::Duration;

use crate::storage_types::StoreBackend;
use crate::validation::{FileValidator, DEFAULT_ALLOWED_CONTENT_TYPES};

const MAX_FILE_SIZE_MB: u64 = 50;
const RECORD_STORE_COLLECTION: &str = "file_c";
const RECORD_STORE_TIMEOUT_SECS: u64 = 30;
const MEMORY_STORE_LATENCY_MS: u64 = 300;
const UPLOAD_TICK_INTERVAL_MS: u64 = 200;
const UPLOAD_MAX_INCREMENT: f64 = 15.0;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    /// `text` or `json`
    pub log_format: String,
    // Record store configuration
    pub store_backend: StoreBackend,
    pub record_store_url: Option<String>,
    pub record_store_project_id: Option<String>,
    pub record_store_public_key: Option<String>,
    pub record_store_collection: String,
    pub record_store_timeout_secs: u64,
    pub memory_store_latency_ms: u64,
    // Intake validation
    pub max_file_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    // Progress simulation
    pub upload_tick_interval_ms: u64,
    pub upload_max_increment: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_format: "text".to_string(),
            store_backend: StoreBackend::Memory,
            record_store_url: None,
            record_store_project_id: None,
            record_store_public_key: None,
            record_store_collection: RECORD_STORE_COLLECTION.to_string(),
            record_store_timeout_secs: RECORD_STORE_TIMEOUT_SECS,
            memory_store_latency_ms: MEMORY_STORE_LATENCY_MS,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            upload_tick_interval_ms: UPLOAD_TICK_INTERVAL_MS,
            upload_max_increment: UPLOAD_MAX_INCREMENT,
        }
    }
}

impl Config {
    /// Load from the process environment (and a `.env` file when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing or empty keys fall back to
    /// defaults; malformed numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Config::default();

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or(defaults.environment);

        let log_format = get("LOG_FORMAT")
            .map(|v| v.to_lowercase())
            .unwrap_or(defaults.log_format);

        let store_backend = match get("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.store_backend,
        };

        let max_file_size_mb: u64 =
            parse_or(get("MAX_FILE_SIZE_MB"), MAX_FILE_SIZE_MB, "MAX_FILE_SIZE_MB")?;

        let allowed_content_types = get("ALLOWED_CONTENT_TYPES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_content_types);

        let config = Config {
            environment,
            log_format,
            store_backend,
            record_store_url: get("RECORD_STORE_URL"),
            record_store_project_id: get("RECORD_STORE_PROJECT_ID"),
            record_store_public_key: get("RECORD_STORE_PUBLIC_KEY"),
            record_store_collection: get("RECORD_STORE_COLLECTION")
                .unwrap_or(defaults.record_store_collection),
            record_store_timeout_secs: parse_or(
                get("RECORD_STORE_TIMEOUT_SECS"),
                RECORD_STORE_TIMEOUT_SECS,
                "RECORD_STORE_TIMEOUT_SECS",
            )?,
            memory_store_latency_ms: parse_or(
                get("MEMORY_STORE_LATENCY_MS"),
                MEMORY_STORE_LATENCY_MS,
                "MEMORY_STORE_LATENCY_MS",
            )?,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types,
            upload_tick_interval_ms: parse_or(
                get("UPLOAD_TICK_INTERVAL_MS"),
                UPLOAD_TICK_INTERVAL_MS,
                "UPLOAD_TICK_INTERVAL_MS",
            )?,
            upload_max_increment: parse_or(
                get("UPLOAD_MAX_INCREMENT"),
                UPLOAD_MAX_INCREMENT,
                "UPLOAD_MAX_INCREMENT",
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.store_backend == StoreBackend::Remote {
            if self.record_store_url.is_none() {
                return Err(anyhow::anyhow!(
                    "RECORD_STORE_URL must be set when using the remote store backend"
                ));
            }
            if self.record_store_project_id.is_none() || self.record_store_public_key.is_none() {
                return Err(anyhow::anyhow!(
                    "RECORD_STORE_PROJECT_ID and RECORD_STORE_PUBLIC_KEY must be set when using the remote store backend"
                ));
            }
        }

        if self.record_store_collection.is_empty() {
            return Err(anyhow::anyhow!("RECORD_STORE_COLLECTION cannot be empty"));
        }

        if self.upload_tick_interval_ms == 0 {
            return Err(anyhow::anyhow!("UPLOAD_TICK_INTERVAL_MS must be greater than 0"));
        }

        if !(self.upload_max_increment > 0.0 && self.upload_max_increment <= 100.0) {
            return Err(anyhow::anyhow!("UPLOAD_MAX_INCREMENT must be in (0, 100]"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES cannot be empty"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }

    pub fn validator(&self) -> FileValidator {
        FileValidator::new(self.max_file_size_bytes, self.allowed_content_types.clone())
    }

    pub fn memory_store_latency(&self) -> Duration {
        Duration::from_millis(self.memory_store_latency_ms)
    }

    pub fn record_store_timeout(&self) -> Duration {
        Duration::from_secs(self.record_store_timeout_secs)
    }

    pub fn upload_tick_interval(&self) -> Duration {
        Duration::from_millis(self.upload_tick_interval_ms)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    default: T,
    key: &str,
) -> Result<T, anyhow::Error> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}
