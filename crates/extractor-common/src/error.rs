//! Error types shared by extractor components

use thiserror::Error;

/// Result type alias for shared extractor operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

/// Errors raised while encoding or decoding the wire contracts in [`crate::types`]
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid job message: {0}")]
    InvalidMessage(String),

    #[error("Invalid partition label: {0}")]
    InvalidLabel(String),
}
