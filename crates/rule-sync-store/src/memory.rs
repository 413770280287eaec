//! In-memory config store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::client::ConfigStoreClient;
use crate::error::StoreError;

/// Config store held in process memory
///
/// Keeps the last written content per `(data_id, group_id)` and counts
/// calls so callers can assert whether the store was contacted.
#[derive(Default)]
pub struct MemoryConfigStore {
    entries: RwLock<HashMap<(String, String), String>>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without counting it as a put
    pub fn insert(&self, data_id: &str, group_id: &str, content: impl Into<String>) {
        self.entries
            .write()
            .insert((data_id.to_string(), group_id.to_string()), content.into());
    }

    /// Current content of an entry
    pub fn content(&self, data_id: &str, group_id: &str) -> Option<String> {
        self.entries
            .read()
            .get(&(data_id.to_string(), group_id.to_string()))
            .cloned()
    }

    /// Snapshot of all entries, sorted by key
    pub fn contents(&self) -> Vec<((String, String), String)> {
        let mut all: Vec<_> = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Number of `get` calls served
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Number of `put` calls served
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStoreClient for MemoryConfigStore {
    async fn get(
        &self,
        data_id: &str,
        group_id: &str,
        _timeout: Duration,
    ) -> Result<Option<String>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        debug!("Memory store get: {}/{}", group_id, data_id);
        Ok(self.content(data_id, group_id))
    }

    async fn put(&self, data_id: &str, group_id: &str, content: &str) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        debug!("Memory store put: {}/{} ({} bytes)", group_id, data_id, content.len());
        self.insert(data_id, group_id, content);
        Ok(())
    }
}
