//! Error types for the ddtft-core library.

use thiserror::Error;

/// Main error type for the ddtft library.
#[derive(Error, Debug)]
pub enum DdtftError {
    /// Document field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON in a token dump or configuration file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors returned by the extraction pipeline.
///
/// Missing or rejected fields are not errors: they leave the field empty and
/// surface as warnings on the extraction result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The caller broke the input contract.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the ddtft library.
pub type Result<T> = std::result::Result<T, DdtftError>;
