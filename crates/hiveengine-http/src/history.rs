//! Client for the Hive Engine account history service.
//!
//! History is not served over JSON-RPC but by a separate REST service:
//! `GET <history_url>accountHistory?account=..&symbol=..&limit=..&offset=..`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use hiveengine_core::error::TransportError;

use crate::normalize_base_url;

pub const DEFAULT_HISTORY_URL: &str = "https://history.hive-engine.com/";

/// Query parameters for `accountHistory`.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryQuery {
    pub account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl HistoryQuery {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            symbol: None,
            limit: 1000,
            offset: 0,
        }
    }

    pub fn symbol(mut self, symbol: impl AsRef<str>) -> Self {
        self.symbol = Some(symbol.as_ref().to_uppercase());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HistoryClient {
    base_url: String,
    http: reqwest::Client,
}

impl HistoryClient {
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of account history, newest first.
    pub async fn account_history(&self, query: &HistoryQuery) -> Result<Vec<Value>, TransportError> {
        let url = format!("{}accountHistory", self.base_url);
        tracing::debug!(account = %query.account, symbol = ?query.symbol, "fetching account history");

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| TransportError::Http(format!("invalid history body: {e}")))?;
        match body {
            Value::Array(rows) => Ok(rows),
            other => Err(TransportError::Other(format!(
                "unexpected history payload: {other}"
            ))),
        }
    }
}
