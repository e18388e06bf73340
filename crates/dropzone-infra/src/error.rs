//! User-facing error reports
//!
//! `ErrorResponse` is the serializable shape binaries print when a command
//! fails, built from an `AppError` through its `ErrorMetadata`.

use dropzone_core::{AppError, ErrorMetadata, LogLevel};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<&'static str>,
}

impl ErrorResponse {
    /// Build a report and log the error at its own level.
    pub fn from_app_error(err: &AppError, include_details: bool) -> Self {
        let code = err.error_code();
        match err.log_level() {
            LogLevel::Debug => tracing::debug!(error = %err, code, "Command failed"),
            LogLevel::Warn => tracing::warn!(error = %err, code, "Command failed"),
            LogLevel::Error => {
                tracing::error!(error = %err.detailed_message(), code, "Command failed")
            }
        }

        Self {
            error: err.client_message(),
            code,
            recoverable: err.is_recoverable(),
            details: include_details.then(|| err.detailed_message()),
            suggested_action: err.suggested_action(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"error\":{:?}}}", self.error))
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(action) = self.suggested_action {
            write!(f, " ({})", action)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropzone_core::FileId;

    #[test]
    fn not_found_report() {
        let report = ErrorResponse::from_app_error(&AppError::NotFound(FileId(4)), false);
        assert_eq!(report.error, "File not found");
        assert!(report.details.is_none());

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["code"], report.code);
        assert!(json.get("details").is_none());
    }

    #[test]
    fn backend_report_keeps_details_when_asked() {
        let err = AppError::Backend("status 503: unavailable".to_string());
        let report = ErrorResponse::from_app_error(&err, true);
        assert!(report.recoverable);
        assert!(report.details.unwrap().contains("503"));
    }
}
