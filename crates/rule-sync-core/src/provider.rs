//! Rule provider: reads an application's rules from the config store

use rule_sync_store::ConfigStoreClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::binding::{RuleType, RuleTypeBinding};
use crate::config::ConnectionConfig;
use crate::error::SyncError;
use crate::key::ConfigKey;

/// Fetches rule collections of one rule type
pub struct RuleProvider<T> {
    client: Arc<dyn ConfigStoreClient>,
    binding: RuleTypeBinding<T>,
    group_id: String,
    timeout: Duration,
}

impl<T> RuleProvider<T> {
    /// Create a provider reading from `client` under the configured group
    pub fn new(
        client: Arc<dyn ConfigStoreClient>,
        binding: RuleTypeBinding<T>,
        config: &ConnectionConfig,
    ) -> Self {
        Self {
            client,
            binding,
            group_id: config.group_id.clone(),
            timeout: config.fetch_timeout(),
        }
    }

    pub fn rule_type(&self) -> RuleType {
        self.binding.rule_type()
    }

    /// Key this provider reads for an application
    pub fn key(&self, app_name: &str) -> ConfigKey {
        self.binding.key(app_name, &self.group_id)
    }

    /// Fetch the rules stored for an application.
    ///
    /// Nothing stored (or an empty payload) is an empty collection, not an
    /// error. Store failures and undecodable payloads are returned as is;
    /// there is no retry.
    pub async fn fetch(&self, app_name: &str) -> Result<Vec<T>, SyncError> {
        let rule_type = self.rule_type();
        let key = self.key(app_name);

        info!(
            "Fetching {} rules: dataId={}, groupId={}",
            rule_type, key.data_id, key.group_id
        );

        let content = match self
            .client
            .get(&key.data_id, &key.group_id, self.timeout)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to fetch {}: {}", key, e);
                metrics::counter!("rule_sync_fetch_total", "rule_type" => rule_type.as_str(), "outcome" => "error")
                    .increment(1);
                return Err(e.into());
            }
        };

        debug!("Fetched {}: {:?}", key, content);

        let Some(content) = content.filter(|c| !c.is_empty()) else {
            info!("No {} rules stored for {}", rule_type, key);
            metrics::counter!("rule_sync_fetch_total", "rule_type" => rule_type.as_str(), "outcome" => "empty")
                .increment(1);
            return Ok(Vec::new());
        };

        match self.binding.converter().decode(&content) {
            Ok(rules) => {
                metrics::counter!("rule_sync_fetch_total", "rule_type" => rule_type.as_str(), "outcome" => "ok")
                    .increment(1);
                Ok(rules)
            }
            Err(e) => {
                warn!("Stored {} rules at {} are malformed: {}", rule_type, key, e);
                metrics::counter!("rule_sync_fetch_total", "rule_type" => rule_type.as_str(), "outcome" => "error")
                    .increment(1);
                Err(e)
            }
        }
    }
}
