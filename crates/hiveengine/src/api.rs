//! The Hive Engine RPC API.
//!
//! [`Api`] sends JSON-RPC calls to the `blockchain` and `contracts`
//! endpoints through any [`RpcTransport`], normally a failover
//! [`NodePool`](hiveengine_core::NodePool), and reads account history from
//! the history service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use hiveengine_core::policy::RetryConfig;
use hiveengine_core::{with_last_id, Endpoint, NodePoolConfig, RpcTransport, TransportError};
use hiveengine_http::{HistoryClient, HistoryQuery, HttpClientConfig};
use hiveengine_nodes::{pool_from_urls, Nodes, DEFAULT_NODES};

use crate::config::{ApiConfig, MAX_FIND_LIMIT};
use crate::error::{EngineError, Result};
use crate::ops::Submitter;

/// Paging and index options for `find`.
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    pub limit: u32,
    pub offset: u32,
    pub indexes: Vec<Value>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            limit: MAX_FIND_LIMIT,
            offset: 0,
            indexes: Vec::new(),
        }
    }
}

impl FindOptions {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sort by `field`, descending when `descending` is set.
    pub fn with_index(mut self, field: &str, descending: bool) -> Self {
        self.indexes.push(json!({ "index": field, "descending": descending }));
        self
    }
}

/// Client for one Hive Engine network. Cheap to clone; clones share the
/// transport and the request id counter.
#[derive(Clone)]
pub struct Api {
    transport: Arc<dyn RpcTransport>,
    history: HistoryClient,
    next_id: Arc<AtomicU64>,
    page_size: u32,
    ssc_id: String,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("url", &self.transport.url())
            .field("history_url", &self.history.base_url())
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Api {
    pub fn new(transport: Arc<dyn RpcTransport>, history: HistoryClient) -> Self {
        Self {
            transport,
            history,
            next_id: Arc::new(AtomicU64::new(0)),
            page_size: MAX_FIND_LIMIT,
            ssc_id: ApiConfig::default().ssc_id,
        }
    }

    pub fn builder() -> ApiBuilder {
        ApiBuilder::default()
    }

    /// Api over a failover pool of `urls`, in the given order.
    pub fn from_urls<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = ApiConfig::default();
        let pool = pool_from_urls(urls, http_config(&config), pool_config(&config))?;
        let history = HistoryClient::new(&config.history_url, config.request_timeout())?;
        Ok(Self::new(Arc::new(pool), history))
    }

    /// Api over the best ranked Beacon nodes, or the built-in defaults when
    /// Beacon cannot be reached.
    pub async fn discover() -> Result<Self> {
        Self::builder().discover(true).build().await
    }

    pub async fn from_config(config: &ApiConfig) -> Result<Self> {
        config.validate()?;

        let mut urls = Vec::new();
        if config.discover {
            match Nodes::new()?.as_urls(config.discover_limit).await {
                Ok(found) => urls = found,
                Err(e) => tracing::warn!(error = %e, "node discovery failed"),
            }
        }
        if urls.is_empty() {
            urls = config.nodes.clone();
        }
        if urls.is_empty() {
            urls = DEFAULT_NODES.iter().map(|s| s.to_string()).collect();
        }
        tracing::info!(nodes = urls.len(), first = %urls[0], "hive engine api ready");

        let pool = pool_from_urls(&urls, http_config(config), pool_config(config))?;
        let history = HistoryClient::new(&config.history_url, config.request_timeout())?;
        let mut api = Self::new(Arc::new(pool), history);
        api.page_size = config.page_size;
        api.ssc_id = config.ssc_id.clone();
        Ok(api)
    }

    /// Page size for `find_all`; clamped to `1..=1000`.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_FIND_LIMIT);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Identifier of the transport, the first node URL for a pool.
    pub fn url(&self) -> &str {
        self.transport.url()
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    pub fn history_url(&self) -> &str {
        self.history.base_url()
    }

    /// A dry-run submitter carrying this network's sidechain id.
    pub fn submitter(&self) -> Submitter {
        let mut submitter = Submitter::default();
        submitter.set_id(self.ssc_id.clone());
        submitter
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn rpc(&self, endpoint: Endpoint, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id();
        Ok(self.transport.call_value(id, endpoint, method, params).await?)
    }

    // ── blockchain endpoint ──────────────────────────────────────────────

    pub async fn get_latest_block_info(&self) -> Result<Value> {
        self.rpc(Endpoint::Blockchain, "getLatestBlockInfo", json!({})).await
    }

    pub async fn get_status(&self) -> Result<Value> {
        self.rpc(Endpoint::Blockchain, "getStatus", json!({})).await
    }

    pub async fn get_block_info(&self, block_number: u64) -> Result<Value> {
        self.rpc(
            Endpoint::Blockchain,
            "getBlockInfo",
            json!({ "blockNumber": block_number }),
        )
        .await
    }

    pub async fn get_block_range_info(&self, start_block_number: u64, count: u32) -> Result<Value> {
        self.rpc(
            Endpoint::Blockchain,
            "getBlockRangeInfo",
            json!({ "startBlockNumber": start_block_number, "count": count }),
        )
        .await
    }

    pub async fn get_transaction_info(&self, txid: &str) -> Result<Value> {
        self.rpc(
            Endpoint::Blockchain,
            "getTransactionInfo",
            json!({ "txid": txid }),
        )
        .await
    }

    // ── contracts endpoint ───────────────────────────────────────────────

    pub async fn get_contract(&self, name: &str) -> Result<Value> {
        self.rpc(Endpoint::Contracts, "getContract", json!({ "name": name }))
            .await
    }

    /// First row of `table` matching `query`, if any.
    pub async fn find_one(
        &self,
        contract: &str,
        table: &str,
        query: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let params = json!({ "contract": contract, "table": table, "query": query.into() });
        let result = self.rpc(Endpoint::Contracts, "findOne", params).await?;
        Ok(match result {
            Value::Null => None,
            Value::Array(rows) => rows.into_iter().next(),
            row => Some(row),
        })
    }

    /// One page of rows of `table` matching `query`.
    pub async fn find(
        &self,
        contract: &str,
        table: &str,
        query: impl Into<Value>,
        options: &FindOptions,
    ) -> Result<Vec<Value>> {
        let params = json!({
            "contract": contract,
            "table": table,
            "query": query.into(),
            "limit": options.limit,
            "offset": options.offset,
            "indexes": options.indexes,
        });
        match self.rpc(Endpoint::Contracts, "find", params).await? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(EngineError::Transport(TransportError::Other(format!(
                "find on {contract}.{table} returned a non-list result: {other}"
            )))),
        }
    }

    /// One page of rows after the cursor `last_id`. Without a cursor the
    /// query is sent unchanged.
    pub async fn find_many(
        &self,
        contract: &str,
        table: &str,
        query: impl Into<Value>,
        limit: u32,
        last_id: Option<Value>,
    ) -> Result<Vec<Value>> {
        let query = match last_id {
            Some(id) => with_last_id(query.into(), id),
            None => query.into(),
        };
        let options = FindOptions::default().with_limit(limit);
        self.find(contract, table, query, &options).await
    }

    /// Every row of `table` matching `query`, paging on `_id`.
    ///
    /// Stops at the first short or empty page, or when a page's last `_id`
    /// is missing. A page whose last `_id` does not move the cursor forward
    /// is dropped, so the result holds no repeated rows.
    pub async fn find_all(
        &self,
        contract: &str,
        table: &str,
        query: impl Into<Value>,
    ) -> Result<Vec<Value>> {
        let query = query.into();
        let page_size = self.page_size;
        let mut rows = Vec::new();
        let mut last_id: Option<Value> = None;

        loop {
            let page = self
                .find_many(contract, table, query.clone(), page_size, last_id.clone())
                .await?;
            let fetched = page.len();
            let next_id = page.last().and_then(|row| row.get("_id")).cloned();
            if fetched > 0 && last_id.is_some() && next_id == last_id {
                // A node that ignores the cursor serves the same page again.
                tracing::warn!(contract, table, "cursor did not advance, stopping pagination");
                break;
            }
            rows.extend(page);
            tracing::debug!(contract, table, fetched, total = rows.len(), "find_all page");

            if fetched < page_size as usize {
                break;
            }
            match next_id {
                Some(id) => last_id = Some(id),
                None => {
                    tracing::warn!(contract, table, "page has no _id, stopping pagination");
                    break;
                }
            }
        }
        Ok(rows)
    }

    pub async fn find_one_typed<T: DeserializeOwned>(
        &self,
        contract: &str,
        table: &str,
        query: impl Into<Value>,
    ) -> Result<Option<T>> {
        match self.find_one(contract, table, query).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_typed<T: DeserializeOwned>(
        &self,
        contract: &str,
        table: &str,
        query: impl Into<Value>,
        options: &FindOptions,
    ) -> Result<Vec<T>> {
        decode_rows(self.find(contract, table, query, options).await?)
    }

    pub async fn find_all_typed<T: DeserializeOwned>(
        &self,
        contract: &str,
        table: &str,
        query: impl Into<Value>,
    ) -> Result<Vec<T>> {
        decode_rows(self.find_all(contract, table, query).await?)
    }

    // ── history service ─────────────────────────────────────────────────

    /// Account history for `symbol`, newest first.
    pub async fn get_history(
        &self,
        account: &str,
        symbol: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        let query = HistoryQuery::new(account)
            .symbol(symbol)
            .limit(limit)
            .offset(offset);
        Ok(self.history.account_history(&query).await?)
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(EngineError::from))
        .collect()
}

fn http_config(config: &ApiConfig) -> HttpClientConfig {
    HttpClientConfig {
        retry: RetryConfig {
            max_retries: config.max_retries,
            ..RetryConfig::default()
        },
        request_timeout: config.request_timeout(),
        ..HttpClientConfig::default()
    }
}

fn pool_config(config: &ApiConfig) -> NodePoolConfig {
    NodePoolConfig {
        rotate: config.rotate,
        request_timeout: config.request_timeout(),
        ..NodePoolConfig::default()
    }
}

/// Builder over [`ApiConfig`].
#[derive(Debug, Clone, Default)]
pub struct ApiBuilder {
    config: ApiConfig,
}

impl ApiBuilder {
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn node(mut self, url: impl Into<String>) -> Self {
        self.config.nodes.push(url.into());
        self
    }

    pub fn nodes<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.nodes.extend(urls.into_iter().map(Into::into));
        self
    }

    pub fn history_url(mut self, url: impl Into<String>) -> Self {
        self.config.history_url = url.into();
        self
    }

    pub fn discover(mut self, discover: bool) -> Self {
        self.config.discover = discover;
        self
    }

    pub fn discover_limit(mut self, limit: usize) -> Self {
        self.config.discover_limit = Some(limit);
        self
    }

    pub fn rotate(mut self, rotate: bool) -> Self {
        self.config.rotate = rotate;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.config.page_size = page_size;
        self
    }

    pub fn ssc_id(mut self, ssc_id: impl Into<String>) -> Self {
        self.config.ssc_id = ssc_id.into();
        self
    }

    pub async fn build(self) -> Result<Api> {
        Api::from_config(&self.config).await
    }
}
