//! Startup wiring of providers and publishers
//!
//! One [`RuleSync`] is built at process start from the store client and the
//! connection config, and hands out a provider/publisher pair per rule type.

use rule_sync_store::ConfigStoreClient;
use std::sync::Arc;
use tracing::info;

use crate::binding::{RuleType, RuleTypeBinding};
use crate::config::ConnectionConfig;
use crate::key::{compose_key, ConfigKey};
use crate::provider::RuleProvider;
use crate::publisher::RulePublisher;
use crate::rules::{ApiDefinitionEntity, FlowRuleEntity, GatewayFlowRuleEntity};

/// Provider and publisher of one rule type, sharing one binding
pub struct RuleChannel<T> {
    binding: RuleTypeBinding<T>,
    provider: RuleProvider<T>,
    publisher: RulePublisher<T>,
}

impl<T> RuleChannel<T> {
    pub fn new(
        client: Arc<dyn ConfigStoreClient>,
        binding: RuleTypeBinding<T>,
        config: &ConnectionConfig,
    ) -> Self {
        Self {
            provider: RuleProvider::new(client.clone(), binding.clone(), config),
            publisher: RulePublisher::new(client, binding.clone(), config),
            binding,
        }
    }

    pub fn binding(&self) -> &RuleTypeBinding<T> {
        &self.binding
    }

    pub fn provider(&self) -> &RuleProvider<T> {
        &self.provider
    }

    pub fn publisher(&self) -> &RulePublisher<T> {
        &self.publisher
    }
}

/// All rule channels of a deployment
pub struct RuleSync {
    group_id: String,
    flow: RuleChannel<FlowRuleEntity>,
    gateway_flow: RuleChannel<GatewayFlowRuleEntity>,
    gateway_api: RuleChannel<ApiDefinitionEntity>,
}

impl RuleSync {
    pub fn new(client: Arc<dyn ConfigStoreClient>, config: &ConnectionConfig) -> Self {
        info!(
            "Rule sync using group {} in namespace {:?}",
            config.group_id, config.namespace
        );

        Self {
            group_id: config.group_id.clone(),
            flow: RuleChannel::new(client.clone(), RuleTypeBinding::flow_rules(), config),
            gateway_flow: RuleChannel::new(
                client.clone(),
                RuleTypeBinding::gateway_flow_rules(),
                config,
            ),
            gateway_api: RuleChannel::new(client, RuleTypeBinding::gateway_api_groups(), config),
        }
    }

    pub fn flow_rules(&self) -> &RuleChannel<FlowRuleEntity> {
        &self.flow
    }

    pub fn gateway_flow_rules(&self) -> &RuleChannel<GatewayFlowRuleEntity> {
        &self.gateway_flow
    }

    pub fn gateway_api_groups(&self) -> &RuleChannel<ApiDefinitionEntity> {
        &self.gateway_api
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Key of an application's rules of the given type
    pub fn key(&self, app_name: &str, rule_type: RuleType) -> ConfigKey {
        compose_key(app_name, rule_type.suffix(), &self.group_id)
    }
}
