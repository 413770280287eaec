//! Rule Sync - keep dashboard traffic-control rules in Nacos

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::Config;
use rule_sync_core::{RuleChannel, RuleSync, RuleType};
use rule_sync_store::{ConfigStoreClient, MemoryConfigStore, NacosClient};

/// Rule Sync - fetch and publish traffic-control rules in Nacos
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/rule-sync.toml")]
    config: String,

    /// Nacos server address
    #[arg(long, env = "RULE_SYNC_SERVER_ADDR")]
    server_addr: Option<String>,

    /// Nacos namespace
    #[arg(long, env = "RULE_SYNC_NAMESPACE")]
    namespace: Option<String>,

    /// Group the rules are stored under
    #[arg(long, env = "RULE_SYNC_GROUP_ID")]
    group_id: Option<String>,

    /// Config store to talk to
    #[arg(long, value_enum, default_value_t = StoreKind::Nacos)]
    store: StoreKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Remote Nacos server
    Nacos,
    /// Process memory, nothing leaves the process
    Memory,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an application's rules as JSON
    Fetch {
        /// Application name
        #[arg(short, long)]
        app: String,
        /// Rule type: flow, gw-flow or gw-api
        #[arg(short = 't', long)]
        rule_type: RuleType,
    },
    /// Replace an application's rules with the JSON array in a file
    Publish {
        /// Application name
        #[arg(short, long)]
        app: String,
        /// Rule type: flow, gw-flow or gw-api
        #[arg(short = 't', long)]
        rule_type: RuleType,
        /// File holding a JSON array, `-` for stdin. Without it nothing is published
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Print the dataId and groupId of an application's rules
    ShowKey {
        /// Application name
        #[arg(short, long)]
        app: String,
        /// Rule type: flow, gw-flow or gw-api
        #[arg(short = 't', long)]
        rule_type: RuleType,
    },
    /// Check that the Nacos server is reachable
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    config.apply_overrides(args.server_addr, args.namespace, args.group_id);
    config.validate()?;

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting Rule Sync v{}", env!("CARGO_PKG_VERSION"));
    match &config.source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("Config file not found at {}, using defaults", args.config),
    }

    let connection = config.connection();

    if let Command::ShowKey { app, rule_type } = &args.command {
        let key = rule_sync_core::compose_key(app, rule_type.suffix(), &connection.group_id);
        println!("dataId:  {}", key.data_id);
        println!("groupId: {}", key.group_id);
        return Ok(());
    }

    let nacos = match args.store {
        StoreKind::Nacos => Some(Arc::new(NacosClient::new(config.nacos_client())?)),
        StoreKind::Memory => None,
    };
    let client: Arc<dyn ConfigStoreClient> = match &nacos {
        Some(nacos) => nacos.clone(),
        None => Arc::new(MemoryConfigStore::new()),
    };

    let sync = RuleSync::new(client, &connection);

    match args.command {
        Command::Fetch { app, rule_type } => {
            let output = match rule_type {
                RuleType::Flow => fetch_json(sync.flow_rules(), &app).await?,
                RuleType::GatewayFlow => fetch_json(sync.gateway_flow_rules(), &app).await?,
                RuleType::GatewayApi => fetch_json(sync.gateway_api_groups(), &app).await?,
            };
            println!("{}", output);
        }
        Command::Publish {
            app,
            rule_type,
            file,
        } => {
            let content = match file.as_deref() {
                Some(path) => Some(read_rules_file(path).await?),
                None => None,
            };
            let content = content.as_deref();

            let published = match rule_type {
                RuleType::Flow => publish_json(sync.flow_rules(), &app, content).await?,
                RuleType::GatewayFlow => {
                    publish_json(sync.gateway_flow_rules(), &app, content).await?
                }
                RuleType::GatewayApi => {
                    publish_json(sync.gateway_api_groups(), &app, content).await?
                }
            };

            match published {
                Some(count) => info!("Published {} {} rules for {}", count, rule_type, app),
                None => info!("No rules file given, nothing published"),
            }
        }
        Command::Ping => {
            let nacos = nacos.context("ping needs --store nacos")?;
            let reachable = nacos.ping().await?;
            println!(
                "{} is {}",
                nacos.base_url(),
                if reachable { "reachable" } else { "not healthy" }
            );
            if !reachable {
                anyhow::bail!("Nacos server is not healthy");
            }
        }
        Command::ShowKey { .. } => unreachable!("handled before connecting"),
    }

    Ok(())
}

/// Fetch a channel's rules and render them as pretty JSON
async fn fetch_json<T: Serialize>(channel: &RuleChannel<T>, app: &str) -> Result<String> {
    let rule_type = channel.binding().rule_type();

    let rules = channel
        .provider()
        .fetch(app)
        .await
        .with_context(|| format!("Failed to fetch {} rules for {}", rule_type, app))?;

    serde_json::to_string_pretty(&rules).context("Failed to render rules")
}

/// Decode `content` with the channel's converter and publish it.
///
/// Returns the number of rules published, `None` when there was no content.
async fn publish_json<T>(
    channel: &RuleChannel<T>,
    app: &str,
    content: Option<&str>,
) -> Result<Option<usize>> {
    let rule_type = channel.binding().rule_type();

    let rules = content
        .map(|c| channel.binding().converter().decode(c))
        .transpose()
        .with_context(|| format!("Rules file is not a valid {} rule array", rule_type))?;

    channel
        .publisher()
        .publish(app, rules.as_deref())
        .await
        .with_context(|| format!("Failed to publish {} rules for {}", rule_type, app))?;

    Ok(rules.map(|r| r.len()))
}

/// Read a rules file, `-` meaning stdin
async fn read_rules_file(path: &str) -> Result<String> {
    if path == "-" {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read rules from stdin")?;
        return Ok(content);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read rules file: {}", path))
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output, logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_sync_core::{ConnectionConfig, FlowRuleEntity};

    #[test]
    fn test_parse_fetch() {
        let args = Args::try_parse_from(["rule-sync", "fetch", "--app", "app1", "-t", "gw-flow"])
            .unwrap();

        assert_eq!(args.store, StoreKind::Nacos);
        match args.command {
            Command::Fetch { app, rule_type } => {
                assert_eq!(app, "app1");
                assert_eq!(rule_type, RuleType::GatewayFlow);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_publish_without_file() {
        let args = Args::try_parse_from([
            "rule-sync", "--store", "memory", "publish", "--app", "app1", "-t", "flow",
        ])
        .unwrap();

        assert_eq!(args.store, StoreKind::Memory);
        assert!(matches!(args.command, Command::Publish { file: None, .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_rule_type() {
        let result =
            Args::try_parse_from(["rule-sync", "fetch", "--app", "app1", "-t", "degrade"]);
        assert!(result.is_err());
    }

    fn memory_sync() -> (Arc<MemoryConfigStore>, RuleSync) {
        let store = Arc::new(MemoryConfigStore::new());
        let sync = RuleSync::new(store.clone(), &ConnectionConfig::new("127.0.0.1:8848"));
        (store, sync)
    }

    #[tokio::test]
    async fn test_publish_json_then_fetch_json() {
        let (store, sync) = memory_sync();

        let published = publish_json(
            sync.flow_rules(),
            "app1",
            Some(r#"[{"resource":"/hello","count":3.0}]"#),
        )
        .await
        .unwrap();
        assert_eq!(published, Some(1));

        let output = fetch_json(sync.flow_rules(), "app1").await.unwrap();
        let rules: Vec<FlowRuleEntity> = serde_json::from_str(&output).unwrap();
        assert_eq!(rules[0].resource.as_deref(), Some("/hello"));
        assert!(store.content("app1-flow-rules", "DEFAULT_GROUP").is_some());
    }

    #[tokio::test]
    async fn test_publish_json_without_content_is_noop() {
        let (store, sync) = memory_sync();

        let published = publish_json(sync.gateway_api_groups(), "app1", None)
            .await
            .unwrap();

        assert_eq!(published, None);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_json_rejects_invalid_rules() {
        let (store, sync) = memory_sync();

        let err = publish_json(sync.flow_rules(), "app1", Some(r#"{"not":"an array"}"#))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not a valid flow rule array"));
        assert_eq!(store.put_count(), 0);
    }
}
