//! Error types for metric extraction.
//!
//! Backend failures stay inside the engine: `RecognizerError` is logged and
//! absorbed, so callers only ever see `ExtractionError`.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("Entity backend is not reachable at {0}")]
    Connection(String),

    #[error("Entity backend returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("Entity backend timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed entity response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Entity backend setup failed: {0}")]
    Recognizer(#[from] RecognizerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
