//! HTTP JSON-RPC client for a single Hive Engine node, backed by `reqwest`.
//!
//! Requests go to `<base_url><endpoint>`, e.g.
//! `https://api.hive-engine.com/rpc/contracts`.

use async_trait::async_trait;
use std::time::Duration;

use hiveengine_core::error::TransportError;
use hiveengine_core::policy::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, RateLimiter, RateLimiterConfig,
    RetryConfig, RetryPolicy,
};
use hiveengine_core::request::{Endpoint, JsonRpcRequest, JsonRpcResponse};
use hiveengine_core::transport::{HealthStatus, RpcTransport};

use crate::normalize_base_url;

/// Configuration for [`HttpRpcClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub rate_limiter: RateLimiterConfig,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            rate_limiter: RateLimiterConfig::default(),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("hiveengine-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    /// Settings for a node that sits inside a pool: one quick retry, then
    /// let the pool move on to the next node.
    pub fn for_pool() -> Self {
        Self {
            retry: RetryConfig {
                max_retries: 1,
                ..RetryConfig::default()
            },
            request_timeout: Duration::from_secs(15),
            ..Self::default()
        }
    }
}

/// HTTP JSON-RPC client for one node.
pub struct HttpRpcClient {
    base_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    circuit: CircuitBreaker,
    rate_limiter: RateLimiter,
}

impl HttpRpcClient {
    pub fn new(base_url: impl AsRef<str>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, http, config))
    }

    /// Build on top of an existing `reqwest::Client` (shared connection pool).
    pub fn with_client(
        base_url: impl AsRef<str>,
        http: reqwest::Client,
        config: HttpClientConfig,
    ) -> Self {
        let base_url = normalize_base_url(base_url.as_ref());
        Self {
            circuit: CircuitBreaker::new(base_url.clone(), config.circuit_breaker),
            retry: RetryPolicy::new(config.retry),
            rate_limiter: RateLimiter::new(config.rate_limiter),
            http,
            base_url,
        }
    }

    pub fn default_for(base_url: impl AsRef<str>) -> Result<Self, TransportError> {
        Self::new(base_url, HttpClientConfig::default())
    }

    /// Full URL of `endpoint` on this node.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    async fn post<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, TransportError>
    where
        B: serde::Serialize + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.endpoint_url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited {
                node: self.base_url.clone(),
            });
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<R>()
            .await
            .map_err(|e| TransportError::Http(format!("invalid JSON-RPC body: {e}")))
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(
        &self,
        endpoint: Endpoint,
        req: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, TransportError> {
        self.rate_limiter.acquire().await;

        if !self.circuit.is_allowed() {
            return Err(TransportError::CircuitOpen {
                node: self.base_url.clone(),
            });
        }

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.post::<_, JsonRpcResponse>(endpoint, &req).await {
                Ok(resp) => {
                    self.circuit.record_success();
                    return Ok(resp);
                }
                Err(e) if e.is_retryable() => {
                    self.circuit.record_failure();
                    match self.retry.next_delay(attempt) {
                        Some(delay) if self.circuit.is_allowed() => {
                            tracing::warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                node = %self.base_url,
                                method = %req.method,
                                "retrying request"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        _ => {
                            tracing::debug!(
                                attempt,
                                error = %e,
                                node = %self.base_url,
                                "giving up on node"
                            );
                            return Err(e);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One HTTP call carrying a JSON array of requests.
    async fn send_batch(
        &self,
        endpoint: Endpoint,
        reqs: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        if reqs.is_empty() {
            return Ok(vec![]);
        }
        self.rate_limiter.acquire().await;
        let result = self.post::<_, Vec<JsonRpcResponse>>(endpoint, &reqs).await;
        match &result {
            Ok(_) => self.circuit.record_success(),
            Err(e) if e.is_retryable() => self.circuit.record_failure(),
            Err(_) => {}
        }
        result
    }

    fn health(&self) -> HealthStatus {
        match self.circuit.state() {
            CircuitState::Open => HealthStatus::Unhealthy,
            CircuitState::HalfOpen => HealthStatus::Degraded,
            CircuitState::Closed => HealthStatus::Healthy,
        }
    }

    fn url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for HttpRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpcClient")
            .field("base_url", &self.base_url)
            .field("circuit", &self.circuit)
            .finish()
    }
}
