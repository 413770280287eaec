//! Rule type registry and bindings
//!
//! Each rule type owns exactly one dataId suffix. A [`RuleTypeBinding`]
//! pairs that suffix with the converter for the type's entities and is what
//! parameterizes a provider/publisher pair.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::converter::{Converter, JsonConverter};
use crate::key::{compose_key, ConfigKey};
use crate::rules::{ApiDefinitionEntity, FlowRuleEntity, GatewayFlowRuleEntity};

/// dataId suffix of service flow rules
pub const FLOW_DATA_ID_POSTFIX: &str = "-flow-rules";

/// dataId suffix of gateway flow rules
pub const GW_FLOW_DATA_ID_POSTFIX: &str = "-gw-flow-rules";

/// dataId suffix of gateway API groups
pub const API_DATA_ID_POSTFIX: &str = "-gw-api-group-rules";

/// Kind of rule set kept in the config store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    /// Service flow rules
    Flow,
    /// Gateway flow rules
    GatewayFlow,
    /// Gateway API group definitions
    GatewayApi,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [RuleType::Flow, RuleType::GatewayFlow, RuleType::GatewayApi];

    /// The dataId suffix for this rule type
    pub fn suffix(&self) -> &'static str {
        match self {
            RuleType::Flow => FLOW_DATA_ID_POSTFIX,
            RuleType::GatewayFlow => GW_FLOW_DATA_ID_POSTFIX,
            RuleType::GatewayApi => API_DATA_ID_POSTFIX,
        }
    }

    /// Find the rule type owning a suffix
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.suffix() == suffix)
    }

    /// Short name used on the command line and in metrics labels
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Flow => "flow",
            RuleType::GatewayFlow => "gw-flow",
            RuleType::GatewayApi => "gw-api",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flow" => Ok(RuleType::Flow),
            "gw-flow" | "gateway-flow" => Ok(RuleType::GatewayFlow),
            "gw-api" | "gateway-api" => Ok(RuleType::GatewayApi),
            other => Err(format!(
                "unknown rule type '{}' (expected flow, gw-flow or gw-api)",
                other
            )),
        }
    }
}

/// A rule type together with the converter for its entities
pub struct RuleTypeBinding<T> {
    rule_type: RuleType,
    converter: Arc<dyn Converter<T>>,
}

impl<T> Clone for RuleTypeBinding<T> {
    fn clone(&self) -> Self {
        Self {
            rule_type: self.rule_type,
            converter: Arc::clone(&self.converter),
        }
    }
}

impl<T> fmt::Debug for RuleTypeBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTypeBinding")
            .field("rule_type", &self.rule_type)
            .field("suffix", &self.suffix())
            .finish_non_exhaustive()
    }
}

impl<T> RuleTypeBinding<T> {
    pub fn new(rule_type: RuleType, converter: Arc<dyn Converter<T>>) -> Self {
        Self {
            rule_type,
            converter,
        }
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }

    pub fn suffix(&self) -> &'static str {
        self.rule_type.suffix()
    }

    pub fn converter(&self) -> &dyn Converter<T> {
        self.converter.as_ref()
    }

    /// Key of an application's rules of this type
    pub fn key(&self, app_name: &str, group_id: &str) -> ConfigKey {
        compose_key(app_name, self.suffix(), group_id)
    }
}

impl RuleTypeBinding<FlowRuleEntity> {
    pub fn flow_rules() -> Self {
        Self::new(RuleType::Flow, Arc::new(JsonConverter::new()))
    }
}

impl RuleTypeBinding<GatewayFlowRuleEntity> {
    pub fn gateway_flow_rules() -> Self {
        Self::new(RuleType::GatewayFlow, Arc::new(JsonConverter::new()))
    }
}

impl RuleTypeBinding<ApiDefinitionEntity> {
    pub fn gateway_api_groups() -> Self {
        Self::new(RuleType::GatewayApi, Arc::new(JsonConverter::new()))
    }
}
