//! Rule collection encoding
//!
//! Rule collections travel through the config store as UTF-8 JSON arrays,
//! one element per rule.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::error::SyncError;

/// Two-way mapping between a rule collection and its stored text
pub trait Converter<T>: Send + Sync {
    /// Serialize a collection, preserving element order
    fn encode(&self, rules: &[T]) -> Result<String, SyncError>;

    /// Parse stored text back into a collection.
    ///
    /// Malformed input is an error, never a partial result.
    fn decode(&self, content: &str) -> Result<Vec<T>, SyncError>;
}

/// JSON array converter backed by serde_json
pub struct JsonConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonConverter<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Converter<T> for JsonConverter<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, rules: &[T]) -> Result<String, SyncError> {
        serde_json::to_string(rules).map_err(|e| SyncError::Encode(e.to_string()))
    }

    fn decode(&self, content: &str) -> Result<Vec<T>, SyncError> {
        serde_json::from_str(content).map_err(|e| SyncError::Decode(e.to_string()))
    }
}
