//! Rule publisher: writes an application's rules to the config store

use rule_sync_store::ConfigStoreClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::binding::{RuleType, RuleTypeBinding};
use crate::config::ConnectionConfig;
use crate::error::SyncError;
use crate::key::ConfigKey;

/// Publishes rule collections of one rule type
pub struct RulePublisher<T> {
    client: Arc<dyn ConfigStoreClient>,
    binding: RuleTypeBinding<T>,
    group_id: String,
}

impl<T> RulePublisher<T> {
    /// Create a publisher writing to `client` under the configured group
    pub fn new(
        client: Arc<dyn ConfigStoreClient>,
        binding: RuleTypeBinding<T>,
        config: &ConnectionConfig,
    ) -> Self {
        Self {
            client,
            binding,
            group_id: config.group_id.clone(),
        }
    }

    pub fn rule_type(&self) -> RuleType {
        self.binding.rule_type()
    }

    /// Key this publisher writes for an application
    pub fn key(&self, app_name: &str) -> ConfigKey {
        self.binding.key(app_name, &self.group_id)
    }

    /// Replace the rules stored for an application.
    ///
    /// The application name must not be empty. `None` is accepted and does
    /// nothing, so this cannot be used to remove what is stored; an empty
    /// slice is written as `[]`. A single write is attempted.
    pub async fn publish(&self, app_name: &str, rules: Option<&[T]>) -> Result<(), SyncError> {
        if app_name.is_empty() {
            return Err(SyncError::InvalidArgument(
                "app name cannot be empty".to_string(),
            ));
        }

        let rule_type = self.rule_type();

        let Some(rules) = rules else {
            debug!("No {} rules given for {}, skipping publish", rule_type, app_name);
            metrics::counter!("rule_sync_publish_total", "rule_type" => rule_type.as_str(), "outcome" => "skipped")
                .increment(1);
            return Ok(());
        };

        let key = self.key(app_name);

        let content = self.binding.converter().encode(rules).inspect_err(|e| {
            warn!("Failed to encode {} rules for {}: {}", rule_type, key, e);
            metrics::counter!("rule_sync_publish_total", "rule_type" => rule_type.as_str(), "outcome" => "error")
                .increment(1);
        })?;

        info!(
            "Publishing {} {} rules: dataId={}, groupId={}",
            rules.len(),
            rule_type,
            key.data_id,
            key.group_id
        );
        debug!("Publishing {}: {}", key, content);

        if let Err(e) = self
            .client
            .put(&key.data_id, &key.group_id, &content)
            .await
        {
            warn!("Failed to publish {}: {}", key, e);
            metrics::counter!("rule_sync_publish_total", "rule_type" => rule_type.as_str(), "outcome" => "error")
                .increment(1);
            return Err(e.into());
        }

        metrics::counter!("rule_sync_publish_total", "rule_type" => rule_type.as_str(), "outcome" => "ok")
            .increment(1);
        Ok(())
    }
}
