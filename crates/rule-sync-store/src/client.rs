//! Config store client trait

use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;

/// Remote key/value configuration store
///
/// Entries are addressed by a `(data_id, group_id)` pair. Implementations
/// must be safe to share between concurrent callers.
#[async_trait]
pub trait ConfigStoreClient: Send + Sync {
    /// Read the content stored under a key.
    ///
    /// Returns `Ok(None)` when nothing is stored there. The call must not
    /// outlive `timeout`; expiry is reported as [`StoreError::Timeout`].
    async fn get(
        &self,
        data_id: &str,
        group_id: &str,
        timeout: Duration,
    ) -> Result<Option<String>, StoreError>;

    /// Replace the content stored under a key
    async fn put(&self, data_id: &str, group_id: &str, content: &str) -> Result<(), StoreError>;
}
