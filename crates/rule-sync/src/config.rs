//! Configuration loading and management

use anyhow::{Context, Result};
use rule_sync_core::{ConnectionConfig, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_GROUP_ID};
use rule_sync_store::NacosClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub nacos: NacosConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the settings were read from, `None` when defaults were used
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Nacos connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NacosConfig {
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
    /// Namespace id; empty selects the public namespace
    #[serde(default)]
    pub namespace: String,
    /// Group shared by all rule types
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Timeout of rule fetches
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Timeout of every other request, publishes included
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for NacosConfig {
    fn default() -> Self {
        Self {
            server_addr: default_server_addr(),
            namespace: String::new(),
            group_id: default_group_id(),
            username: None,
            password: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_server_addr() -> String {
    "127.0.0.1:8848".to_string()
}

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT_MS
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.source = Some(config_path.to_path_buf());
        Ok(config)
    }

    /// Replace connection settings given on the command line or environment
    pub fn apply_overrides(
        &mut self,
        server_addr: Option<String>,
        namespace: Option<String>,
        group_id: Option<String>,
    ) {
        if let Some(server_addr) = server_addr {
            self.nacos.server_addr = server_addr;
        }
        if let Some(namespace) = namespace {
            self.nacos.namespace = namespace;
        }
        if let Some(group_id) = group_id {
            self.nacos.group_id = group_id;
        }
    }

    /// Reject settings the store cannot be used with
    pub fn validate(&self) -> Result<()> {
        if self.nacos.server_addr.trim().is_empty() {
            anyhow::bail!("nacos.server_addr must not be empty");
        }
        if self.nacos.group_id.trim().is_empty() {
            anyhow::bail!("nacos.group_id must not be empty");
        }
        if self.nacos.fetch_timeout_ms == 0 {
            anyhow::bail!("nacos.fetch_timeout_ms must be greater than zero");
        }
        if self.nacos.request_timeout_ms == 0 {
            anyhow::bail!("nacos.request_timeout_ms must be greater than zero");
        }
        if self.nacos.username.is_some() != self.nacos.password.is_some() {
            anyhow::bail!("nacos.username and nacos.password must be set together");
        }
        Ok(())
    }

    /// Settings handed to providers and publishers
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            server_addr: self.nacos.server_addr.clone(),
            namespace: self.nacos.namespace.clone(),
            group_id: self.nacos.group_id.clone(),
            fetch_timeout_ms: self.nacos.fetch_timeout_ms,
        }
    }

    /// Settings for the Nacos HTTP client
    pub fn nacos_client(&self) -> NacosClientConfig {
        NacosClientConfig {
            server_addr: self.nacos.server_addr.clone(),
            namespace: self.nacos.namespace.clone(),
            username: self.nacos.username.clone(),
            password: self.nacos.password.clone(),
            request_timeout: Duration::from_millis(self.nacos.request_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/rule-sync.toml").unwrap();

        assert_eq!(config.nacos.server_addr, "127.0.0.1:8848");
        assert_eq!(config.nacos.group_id, "DEFAULT_GROUP");
        assert_eq!(config.nacos.fetch_timeout_ms, 3000);
        assert_eq!(config.logging.level, "info");
        assert!(config.source.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"
[nacos]
server_addr = "nacos.internal:8848"
namespace = "prod"
group_id = "SENTINEL_GROUP"
username = "nacos"
password = "nacos"

[logging]
level = "debug"
format = "json"
"#,
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.nacos.server_addr, "nacos.internal:8848");
        assert_eq!(config.nacos.namespace, "prod");
        assert_eq!(config.nacos.group_id, "SENTINEL_GROUP");
        assert_eq!(config.nacos.fetch_timeout_ms, 3000);
        assert_eq!(config.nacos.request_timeout_ms, 5000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.source.as_deref(), Some(file.path()));
        assert!(config.validate().is_ok());

        let connection = config.connection();
        assert_eq!(connection.group_id, "SENTINEL_GROUP");
        assert_eq!(connection.namespace, "prod");

        let client = config.nacos_client();
        assert_eq!(client.username.as_deref(), Some("nacos"));
        assert_eq!(client.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_load_malformed_file() {
        let file = write_config("[nacos\nserver_addr = ");

        let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("10.0.0.1:8848".to_string()), None, Some("G".to_string()));

        assert_eq!(config.nacos.server_addr, "10.0.0.1:8848");
        assert_eq!(config.nacos.namespace, "");
        assert_eq!(config.nacos.group_id, "G");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = Config::default();
        config.nacos.group_id = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.nacos.fetch_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.nacos.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));

        let mut config = Config::default();
        config.nacos.username = Some("nacos".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.nacos.server_addr = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
