//! Store error types

use thiserror::Error;

/// Errors surfaced by an [`crate::AnalysisStore`] implementation
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced analysis does not exist
    #[error("Analysis {0} not found")]
    NotFound(u64),

    /// Payload rejected before persistence (not valid JSON text)
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    /// Backend failure (I/O, connectivity, ...)
    #[error("Storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        StoreError::Internal(msg.into())
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
