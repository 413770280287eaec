//! Connection configuration shared by providers and publishers
//!
//! Loading from disk is done in the rule-sync binary; this is the
//! immutable, already validated form handed to the core at startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Group used when the deployment does not name one
pub const DEFAULT_GROUP_ID: &str = "DEFAULT_GROUP";

/// Timeout applied to every fetch
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 3000;

/// Config store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Store address (`host:port` or URL)
    pub server_addr: String,
    /// Namespace the rules live in
    #[serde(default)]
    pub namespace: String,
    /// Group shared by every rule type
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl ConnectionConfig {
    pub fn new(server_addr: impl Into<String>) -> Self {
        Self {
            server_addr: server_addr.into(),
            namespace: String::new(),
            group_id: default_group_id(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::new("127.0.0.1:8848");
        assert_eq!(config.group_id, "DEFAULT_GROUP");
        assert_eq!(config.namespace, "");
        assert_eq!(config.fetch_timeout(), Duration::from_millis(3000));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"server_addr":"nacos:8848"}"#).unwrap();
        assert_eq!(config.group_id, DEFAULT_GROUP_ID);
        assert_eq!(config.fetch_timeout_ms, DEFAULT_FETCH_TIMEOUT_MS);
    }
}
