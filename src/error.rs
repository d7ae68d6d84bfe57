//! Domain-specific error types for nb-batch

use thiserror::Error;

use crate::engine::EngineError;

/// Main error type for a batch run
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Item {index}/{total} ({label}) failed: {source}")]
    ItemFailed {
        index: usize,
        total: usize,
        label: String,
        #[source]
        source: EngineError,
    },

    #[error("Batch incomplete: {failed} of {total} items failed")]
    Incomplete { failed: usize, total: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {message}")]
    Output { message: String },
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        BatchError::Output {
            message: err.to_string(),
        }
    }
}

/// Result type alias for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;
