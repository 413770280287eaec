//! Config store double for provider/publisher tests

use async_trait::async_trait;
use parking_lot::Mutex;
use rule_sync_store::{ConfigStoreClient, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Failure the double reports instead of serving a call
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    Timeout,
    Unavailable,
}

impl Fault {
    fn to_error(self, data_id: &str, timeout: Duration) -> StoreError {
        match self {
            Fault::Timeout => StoreError::Timeout {
                data_id: data_id.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            },
            Fault::Unavailable => StoreError::Server {
                status: 503,
                message: "unavailable".to_string(),
            },
        }
    }
}

/// Records every call and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    entries: Mutex<HashMap<(String, String), String>>,
    get_fault: Mutex<Option<Fault>>,
    put_fault: Mutex<Option<Fault>>,
    gets: Mutex<Vec<(String, String, Duration)>>,
    puts: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, data_id: &str, group_id: &str, content: &str) -> Self {
        self.entries
            .lock()
            .insert((data_id.to_string(), group_id.to_string()), content.to_string());
        self
    }

    pub fn failing_get(self, fault: Fault) -> Self {
        *self.get_fault.lock() = Some(fault);
        self
    }

    pub fn failing_put(self, fault: Fault) -> Self {
        *self.put_fault.lock() = Some(fault);
        self
    }

    pub fn entry(&self, data_id: &str, group_id: &str) -> Option<String> {
        self.entries
            .lock()
            .get(&(data_id.to_string(), group_id.to_string()))
            .cloned()
    }

    /// `(data_id, group_id, timeout)` of every get, in call order
    pub fn gets(&self) -> Vec<(String, String, Duration)> {
        self.gets.lock().clone()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStoreClient for RecordingStore {
    async fn get(
        &self,
        data_id: &str,
        group_id: &str,
        timeout: Duration,
    ) -> Result<Option<String>, StoreError> {
        self.gets
            .lock()
            .push((data_id.to_string(), group_id.to_string(), timeout));

        if let Some(fault) = *self.get_fault.lock() {
            return Err(fault.to_error(data_id, timeout));
        }

        Ok(self.entry(data_id, group_id))
    }

    async fn put(&self, data_id: &str, group_id: &str, content: &str) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        if let Some(fault) = *self.put_fault.lock() {
            return Err(fault.to_error(data_id, Duration::ZERO));
        }

        self.entries
            .lock()
            .insert((data_id.to_string(), group_id.to_string()), content.to_string());
        Ok(())
    }
}
