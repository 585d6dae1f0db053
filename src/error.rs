//! Error types for sheetwright
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in sheetwright
#[derive(Debug, Error)]
pub enum SheetwrightError {
    /// Generation backend could not be reached or refused the call
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration is missing or inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// Spreadsheet rendering error
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rust_xlsxwriter::XlsxError> for SheetwrightError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SheetwrightError::Workbook(err.to_string())
    }
}

/// Result type alias for sheetwright operations
pub type Result<T> = std::result::Result<T, SheetwrightError>;
