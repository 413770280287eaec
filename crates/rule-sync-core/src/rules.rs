//! Rule entities as the dashboard stores them
//!
//! Field names follow the dashboard's camelCase JSON. Everything except
//! nested lists is optional so payloads written by other dashboard versions
//! still decode.

use serde::{Deserialize, Serialize};

/// Service flow control rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRuleEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Origin the rule applies to (`default` for any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// 0 = thread count, 1 = QPS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    /// 0 = direct, 1 = relate, 2 = chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_resource: Option<String>,
    /// 0 = reject, 1 = warm up, 2 = rate limiter, 3 = warm up + rate limiter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_behavior: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warm_up_period_sec: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_queueing_time_ms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_config: Option<ClusterFlowConfig>,
    /// Milliseconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmt_create: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmt_modified: Option<i64>,
}

/// Cluster mode settings of a flow rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterFlowConfig {
    /// Globally unique id of the rule on the token server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<i64>,
    /// 0 = average by local, 1 = global
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold_type: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_to_local_when_fail: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_interval_ms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_timeout_strategy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_refuse_strategy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_offline_time: Option<i64>,
}

/// Parameter matcher of a gateway flow rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayParamFlowItemEntity {
    /// 0 = client IP, 1 = host, 2 = header, 3 = URL param, 4 = cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_strategy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_strategy: Option<i32>,
}

/// Gateway flow control rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayFlowRuleEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmt_create: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmt_modified: Option<i64>,
    /// Route id or API group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// 0 = route id, 1 = custom API group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_mode: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
    /// 0 = second, 1 = minute, 2 = hour, 3 = day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_unit: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_behavior: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_queueing_timeout_ms: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_item: Option<GatewayParamFlowItemEntity>,
}

/// Path predicate of a gateway API group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPredicateItemEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// 0 = exact, 1 = prefix, 2 = regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_strategy: Option<i32>,
}

/// Gateway API group definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinitionEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmt_create: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmt_modified: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_name: Option<String>,
    #[serde(default)]
    pub predicate_items: Vec<ApiPredicateItemEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_dashboard_flow_rule() {
        let json = r#"{
            "id": 1,
            "app": "app1",
            "ip": "10.0.0.5",
            "port": 8719,
            "limitApp": "default",
            "resource": "/hello",
            "grade": 1,
            "count": 20.0,
            "strategy": 0,
            "controlBehavior": 0,
            "clusterMode": false,
            "gmtCreate": 1668400000000,
            "gmtModified": 1668400000000
        }"#;

        let rule: FlowRuleEntity = serde_json::from_str(json).unwrap();
        assert_eq!(rule.resource.as_deref(), Some("/hello"));
        assert_eq!(rule.limit_app.as_deref(), Some("default"));
        assert_eq!(rule.count, Some(20.0));
        assert_eq!(rule.cluster_mode, Some(false));
    }

    #[test]
    fn test_cluster_config_round_trip() {
        let rule = FlowRuleEntity {
            resource: Some("/hello".to_string()),
            cluster_mode: Some(true),
            cluster_config: Some(ClusterFlowConfig {
                flow_id: Some(42),
                threshold_type: Some(1),
                fallback_to_local_when_fail: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""clusterConfig":{"flowId":42"#));
        let decoded: FlowRuleEntity = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, rule);
    }

    #[test]
    fn test_null_cluster_config_is_dropped() {
        let rule: FlowRuleEntity =
            serde_json::from_str(r#"{"resource":"/hello","clusterConfig":null}"#).unwrap();
        assert!(rule.cluster_config.is_none());

        let json = serde_json::to_string(&rule).unwrap();
        assert!(!json.contains("clusterConfig"));
        let decoded: FlowRuleEntity = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, rule);
    }

    #[test]
    fn test_decode_gateway_rule_with_param_item() {
        let json = r#"{
            "app": "gateway",
            "resource": "user_route",
            "resourceMode": 0,
            "grade": 1,
            "count": 5,
            "interval": 1,
            "intervalUnit": 0,
            "paramItem": {"parseStrategy": 2, "fieldName": "X-User", "matchStrategy": 0}
        }"#;

        let rule: GatewayFlowRuleEntity = serde_json::from_str(json).unwrap();
        let item = rule.param_item.unwrap();
        assert_eq!(item.parse_strategy, Some(2));
        assert_eq!(item.field_name.as_deref(), Some("X-User"));
        assert!(item.pattern.is_none());
    }

    #[test]
    fn test_api_definition_without_predicates() {
        let api: ApiDefinitionEntity = serde_json::from_str(r#"{"apiName":"empty"}"#).unwrap();
        assert!(api.predicate_items.is_empty());
    }
}
