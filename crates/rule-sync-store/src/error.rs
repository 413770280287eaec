//! Config store error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out after {timeout_ms}ms reading {data_id}")]
    Timeout { data_id: String, timeout_ms: u64 },

    #[error("Config store unauthorized")]
    Unauthorized,

    #[error("Config store returned error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Config store rejected write: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
