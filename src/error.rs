//! Error types for the cash flow valuation service

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for valuation operations
pub type Result<T> = std::result::Result<T, ValuationError>;

#[derive(Error, Debug)]
pub enum ValuationError {

    // =============================
    // Request / Pipeline Errors
    // =============================

    #[error("{0}")]
    Validation(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid wizard transition: {event} while in {state}")]
    InvalidTransition { state: &'static str, event: &'static str },

    #[error("An export is already in progress")]
    ExportInFlight,

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(#[from] calamine::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ValuationError {
    /// HTTP status this error surfaces as
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValuationError::Validation(_) => StatusCode::BAD_REQUEST,
            ValuationError::NotFound(_) => StatusCode::NOT_FOUND,
            ValuationError::InvalidTransition { .. } | ValuationError::ExportInFlight => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used as the `error` field of 5xx envelopes
    pub fn public_label(&self) -> &'static str {
        match self {
            ValuationError::Processing(_)
            | ValuationError::CsvError(_)
            | ValuationError::SpreadsheetError(_) => "Failed to process file",
            ValuationError::Template(_) => "Failed to download template",
            ValuationError::NotFound(_) => "Endpoint not found",
            _ => "Internal server error",
        }
    }
}
