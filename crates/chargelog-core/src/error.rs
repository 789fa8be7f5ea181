//! Error types for the chargelog-core library.
//!
//! Receipt parsing and statistics never fail; errors only arise at the
//! edges (vision responses, record validation, config and file I/O).

use thiserror::Error;

/// Main error type for the chargelog library.
#[derive(Error, Debug)]
pub enum ChargelogError {
    /// Vision analysis response error.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Charge record validation error.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to vision-model analysis responses.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The response contains no JSON object.
    #[error("response contains no JSON object")]
    NoJson,

    /// The JSON object does not match the analysis contract.
    #[error("malformed analysis JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to building a charge record from a draft.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// Location is empty after trimming.
    #[error("location must not be empty")]
    EmptyLocation,

    /// A numeric field holds a value that cannot be stored.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Charger type label not recognised.
    #[error("unknown charger type: {0}")]
    UnknownChargerType(String),
}

/// Result type for the chargelog library.
pub type Result<T> = std::result::Result<T, ChargelogError>;
