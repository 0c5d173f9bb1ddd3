//! Error types for the session core

use thiserror::Error;

use crate::runtime::StackError;

/// Version metadata could not be obtained
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read version metadata from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid version metadata: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no version metadata available: {0}")]
    NotFound(String),
}

/// Session initialization failed; fatal for the turn
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to fetch version: {0}")]
    Fetch(#[from] FetchError),

    /// A branch that requires frames found the stack empty
    #[error("stack invariant violated: {0}")]
    Stack(#[from] StackError),
}
