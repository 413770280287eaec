//! Nacos config store client
//!
//! Talks to the Nacos v1 Open API:
//! - `GET  /nacos/v1/cs/configs` reads a config
//! - `POST /nacos/v1/cs/configs` publishes a config
//! - `POST /nacos/v1/auth/login` exchanges credentials for an access token

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::client::ConfigStoreClient;
use crate::error::StoreError;

const CONFIGS_PATH: &str = "/nacos/v1/cs/configs";
const LOGIN_PATH: &str = "/nacos/v1/auth/login";
const LIVENESS_PATH: &str = "/nacos/v1/console/health/liveness";

/// Nacos client configuration
#[derive(Clone, Debug)]
pub struct NacosClientConfig {
    /// Server address, either `host:port` or a full URL
    pub server_addr: String,
    /// Namespace (tenant) id; empty means the public namespace
    pub namespace: String,
    /// Username for authentication
    pub username: Option<String>,
    /// Password for authentication
    pub password: Option<String>,
    /// Upper bound for requests that carry no timeout of their own
    pub request_timeout: Duration,
}

/// Login response from Nacos
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    /// Seconds the token stays valid
    #[serde(default)]
    token_ttl: Option<u64>,
}

/// Access token held between requests
#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn from_login(login: LoginResponse) -> Self {
        Self {
            value: login.access_token,
            expires_at: login
                .token_ttl
                .map(|ttl| Instant::now() + Duration::from_secs(ttl)),
        }
    }

    fn is_fresh(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

/// Nacos Open API client
pub struct NacosClient {
    config: NacosClientConfig,
    base_url: String,
    client: Client,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl NacosClient {
    /// Create a new Nacos client
    pub fn new(config: NacosClientConfig) -> Result<Self, StoreError> {
        let base_url = normalize_server_addr(&config.server_addr)?;

        let client = Client::builder().timeout(config.request_timeout).build()?;

        info!(
            "Created Nacos client for {} (namespace: {:?})",
            base_url, config.namespace
        );

        Ok(Self {
            config,
            base_url,
            client,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn has_credentials(&self) -> bool {
        self.config.username.is_some() && self.config.password.is_some()
    }

    /// Exchange credentials for an access token
    async fn authenticate(&self) -> Result<Option<CachedToken>, StoreError> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return Ok(None);
        };

        info!("Authenticating with Nacos at {}", self.base_url);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, LOGIN_PATH))
            .form(&[("username", username.as_str()), ("password", password.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!("Nacos login failed with status {}", response.status());
            return Err(StoreError::Unauthorized);
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Malformed login response: {}", e)))?;

        Ok(Some(CachedToken::from_login(login)))
    }

    /// Get the access token, logging in if none is cached or it has expired
    async fn access_token(&self) -> Result<Option<String>, StoreError> {
        {
            let token = self.token.read().await;
            if let Some(t) = token.as_ref().filter(|t| t.is_fresh()) {
                return Ok(Some(t.value.clone()));
            }
        }

        let token = self.authenticate().await?;
        let value = token.as_ref().map(|t| t.value.clone());
        if token.is_some() {
            let mut cached = self.token.write().await;
            *cached = token;
        }

        Ok(value)
    }

    /// Send a request built by `build`, refreshing the token once if it is rejected
    async fn send<F>(&self, build: F) -> Result<Response, StoreError>
    where
        F: Fn(Option<&str>) -> RequestBuilder,
    {
        let token = self.access_token().await?;
        let response = build(token.as_deref()).send().await?;

        if is_auth_failure(response.status()) && self.has_credentials() {
            debug!("Access token rejected, refreshing...");

            {
                let mut cached = self.token.write().await;
                *cached = None;
            }

            let token = self.access_token().await?;
            return Ok(build(token.as_deref()).send().await?);
        }

        Ok(response)
    }

    /// Query parameters addressing a config entry
    fn key_params<'a>(
        &'a self,
        data_id: &'a str,
        group_id: &'a str,
        token: Option<&'a str>,
    ) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("dataId", data_id), ("group", group_id)];
        if !self.config.namespace.is_empty() {
            params.push(("tenant", self.config.namespace.as_str()));
        }
        if let Some(token) = token {
            params.push(("accessToken", token));
        }
        params
    }

    /// Read a config entry, `None` when the server has none
    async fn read_config(
        &self,
        data_id: &str,
        group_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let url = format!("{}{}", self.base_url, CONFIGS_PATH);

        let response = self
            .send(|token| {
                self.client
                    .get(&url)
                    .query(&self.key_params(data_id, group_id, token))
            })
            .await?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Config not found: dataId={}, group={}", data_id, group_id);
            return Ok(None);
        }

        if is_auth_failure(status) {
            return Err(StoreError::Unauthorized);
        }

        if !status.is_success() {
            return Err(StoreError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(Some(response.text().await?))
    }

    /// Check if the server is reachable
    pub async fn ping(&self) -> Result<bool, StoreError> {
        let url = format!("{}{}", self.base_url, LIVENESS_PATH);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl ConfigStoreClient for NacosClient {
    async fn get(
        &self,
        data_id: &str,
        group_id: &str,
        timeout: Duration,
    ) -> Result<Option<String>, StoreError> {
        debug!("Fetching config: dataId={}, group={}", data_id, group_id);

        // Login, token refresh and the body read all count against `timeout`
        match tokio::time::timeout(timeout, self.read_config(data_id, group_id)).await {
            Ok(Err(StoreError::Http(e))) if e.is_timeout() => Err(timeout_error(data_id, timeout)),
            Ok(result) => result,
            Err(_) => {
                debug!("Fetching {} timed out after {:?}", data_id, timeout);
                Err(timeout_error(data_id, timeout))
            }
        }
    }

    async fn put(&self, data_id: &str, group_id: &str, content: &str) -> Result<(), StoreError> {
        let url = format!("{}{}", self.base_url, CONFIGS_PATH);

        debug!(
            "Publishing config: dataId={}, group={} ({} bytes)",
            data_id,
            group_id,
            content.len()
        );

        let response = self
            .send(|token| {
                let mut form = self.key_params(data_id, group_id, None);
                form.push(("content", content));
                form.push(("type", "json"));

                let mut request = self.client.post(&url).form(&form);
                if let Some(token) = token {
                    request = request.query(&[("accessToken", token)]);
                }
                request
            })
            .await?;

        let status = response.status();

        if is_auth_failure(status) {
            return Err(StoreError::Unauthorized);
        }

        if !status.is_success() {
            return Err(StoreError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        if body.trim() != "true" {
            return Err(StoreError::Rejected(format!(
                "{}/{}: {}",
                group_id,
                data_id,
                body.trim()
            )));
        }

        Ok(())
    }
}

fn timeout_error(data_id: &str, timeout: Duration) -> StoreError {
    StoreError::Timeout {
        data_id: data_id.to_string(),
        timeout_ms: timeout.as_millis() as u64,
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Turn `host:port` or a URL into a base URL without a trailing slash
fn normalize_server_addr(addr: &str) -> Result<String, StoreError> {
    let addr = addr.trim();
    if addr.is_empty() {
        return Err(StoreError::Configuration(
            "Nacos server address is empty".to_string(),
        ));
    }

    let with_scheme = if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    };

    let url = Url::parse(&with_scheme).map_err(|e| {
        StoreError::Configuration(format!("Invalid Nacos server address {}: {}", addr, e))
    })?;

    if url.host_str().is_none() {
        return Err(StoreError::Configuration(format!(
            "Nacos server address has no host: {}",
            addr
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
