//! Sync error types

use rule_sync_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config store error: {0}")]
    Connection(#[from] StoreError),

    #[error("Failed to decode rules: {0}")]
    Decode(String),

    #[error("Failed to encode rules: {0}")]
    Encode(String),
}

impl SyncError {
    /// Whether the failure came from talking to the store
    pub fn is_connection(&self) -> bool {
        matches!(self, SyncError::Connection(_))
    }
}
