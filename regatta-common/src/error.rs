//! Common error types for the regatta tools

use thiserror::Error;

/// Common result type for regatta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the ingest and audit tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required input not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or source data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two source records claimed the same identity
    #[error("Conflict: {0}")]
    Conflict(String),
}
