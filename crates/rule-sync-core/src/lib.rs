//! Rule Sync Core
//!
//! This crate keeps traffic-control rule sets in a remote configuration
//! store: key naming, rule encoding and the fetch/publish operations.

pub mod binding;
pub mod config;
pub mod converter;
pub mod error;
pub mod key;
pub mod provider;
pub mod publisher;
pub mod rules;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use binding::{
    RuleType, RuleTypeBinding, API_DATA_ID_POSTFIX, FLOW_DATA_ID_POSTFIX,
    GW_FLOW_DATA_ID_POSTFIX,
};
pub use config::{ConnectionConfig, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_GROUP_ID};
pub use converter::{Converter, JsonConverter};
pub use error::SyncError;
pub use key::{compose_key, ConfigKey};
pub use provider::RuleProvider;
pub use publisher::RulePublisher;
pub use rules::{
    ApiDefinitionEntity, ApiPredicateItemEntity, ClusterFlowConfig, FlowRuleEntity, GatewayFlowRuleEntity,
    GatewayParamFlowItemEntity,
};
pub use sync::{RuleChannel, RuleSync};
