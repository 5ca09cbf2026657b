//! hiveengine-nodes: where to find Hive Engine nodes.
//!
//! Nodes come from the PeakD Beacon benchmark service, which ranks public
//! Hive Engine RPC and history nodes by score. Results are cached on disk
//! for an hour. When Beacon is unreachable the built-in [`DEFAULT_NODES`]
//! are used.
//!
//! # Quick start
//! ```rust,no_run
//! use hiveengine_nodes::Nodes;
//!
//! # async fn run() -> Result<(), hiveengine_nodes::NodeError> {
//! let mut nodes = Nodes::new()?;
//! let pool = hiveengine_nodes::discover_pool(&mut nodes, Some(4), Default::default()).await?;
//! println!("{} nodes", pool.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod node;

use std::sync::Arc;
use std::time::Duration;

use hiveengine_core::{NodePool, NodePoolConfig, RpcTransport, TransportError};
use hiveengine_http::{HttpClientConfig, HttpRpcClient};
use serde_json::Value;
use thiserror::Error;

pub use cache::{NodeCache, CACHE_DURATION};
pub use node::{parse_beacon, Node};

pub const BEACON_NODES_URL: &str = "https://beacon.peakd.com/api/he/nodes";
pub const BEACON_HISTORY_NODES_URL: &str = "https://beacon.peakd.com/api/heh/nodes";

/// Well-known public RPC nodes, used when discovery is off or fails.
pub const DEFAULT_NODES: &[&str] = &[
    "https://api.hive-engine.com/rpc/",
    "https://engine.rishipanthee.com/",
    "https://herpc.dtools.dev/",
    "https://api.primersion.com/",
    "https://herpc.actifit.io/",
];

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("node url cannot be empty")]
    EmptyUrl,

    #[error("unable to reach beacon service: {0}")]
    Beacon(String),

    #[error("beacon returned an unexpected structure; expected a list")]
    UnexpectedPayload,

    #[error("no usable nodes")]
    NoNodes,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Accessor for Beacon node benchmarks with an in-memory copy of the last list.
#[derive(Debug, Clone)]
pub struct Nodes {
    http: reqwest::Client,
    beacon_url: String,
    history_url: String,
    cache: Option<NodeCache>,
    nodes: Vec<Node>,
}

impl Nodes {
    /// Accessor using the public Beacon URLs and the default disk cache.
    /// Nothing is fetched until a list is requested.
    pub fn new() -> Result<Self, NodeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NodeError::Beacon(e.to_string()))?;
        Ok(Self {
            http,
            beacon_url: BEACON_NODES_URL.to_string(),
            history_url: BEACON_HISTORY_NODES_URL.to_string(),
            cache: Some(NodeCache::default()),
            nodes: Vec::new(),
        })
    }

    /// Accessor pre-filled with `nodes`; no network access until `refresh`.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, NodeError> {
        let mut this = Self::new()?;
        this.nodes = nodes;
        Ok(this)
    }

    pub fn with_beacon_urls(mut self, nodes_url: impl Into<String>, history_url: impl Into<String>) -> Self {
        self.beacon_url = nodes_url.into();
        self.history_url = history_url.into();
        self
    }

    /// Replace the disk cache; `None` always hits the network.
    pub fn with_cache(mut self, cache: Option<NodeCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Reload the node list from Beacon.
    pub async fn refresh(&mut self) -> Result<&[Node], NodeError> {
        self.nodes = self.beacon(None).await?;
        tracing::info!(count = self.nodes.len(), "hive engine node list refreshed");
        Ok(&self.nodes)
    }

    /// Ranked RPC nodes from Beacon.
    pub async fn beacon(&self, limit: Option<usize>) -> Result<Vec<Node>, NodeError> {
        self.fetch(&self.beacon_url, limit).await
    }

    /// Ranked account history nodes from Beacon.
    pub async fn beacon_history(&self, limit: Option<usize>) -> Result<Vec<Node>, NodeError> {
        self.fetch(&self.history_url, limit).await
    }

    /// The current list, refreshing first when it is empty.
    pub async fn node_list(&mut self) -> Result<Vec<Node>, NodeError> {
        if self.nodes.is_empty() {
            self.refresh().await?;
        }
        Ok(self.nodes.clone())
    }

    /// The `limit` best ranked nodes.
    pub async fn fastest(&mut self, limit: usize) -> Result<Vec<Node>, NodeError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut nodes = self.node_list().await?;
        nodes.truncate(limit);
        Ok(nodes)
    }

    pub async fn as_urls(&mut self, limit: Option<usize>) -> Result<Vec<String>, NodeError> {
        let mut nodes = self.node_list().await?;
        if let Some(limit) = limit {
            nodes.truncate(limit);
        }
        Ok(nodes.into_iter().map(|n| n.url).collect())
    }

    /// URL of the best ranked node, if any.
    pub async fn primary_url(&mut self) -> Result<Option<String>, NodeError> {
        Ok(self.node_list().await?.into_iter().next().map(|n| n.url))
    }

    /// The in-memory list without touching the network.
    pub fn cached(&self) -> &[Node] {
        &self.nodes
    }

    async fn fetch(&self, url: &str, limit: Option<usize>) -> Result<Vec<Node>, NodeError> {
        if let Some(payload) = self.cache.as_ref().and_then(|c| c.load(url)) {
            return parse_beacon(&payload, limit);
        }

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| NodeError::Beacon(e.to_string()))?;
        let payload: Value = resp
            .json()
            .await
            .map_err(|_| NodeError::Beacon("beacon returned invalid JSON payload".into()))?;

        let nodes = parse_beacon(&payload, limit)?;
        if let Some(cache) = &self.cache {
            cache.store(url, &payload);
        }
        Ok(nodes)
    }
}

/// Build a failover pool over `urls`, preserving their order.
pub fn pool_from_urls<I, S>(
    urls: I,
    http_config: HttpClientConfig,
    pool_config: NodePoolConfig,
) -> Result<NodePool, NodeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let http = reqwest::Client::builder()
        .timeout(http_config.request_timeout)
        .user_agent(http_config.user_agent.clone())
        .build()
        .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

    let transports: Vec<Arc<dyn RpcTransport>> = urls
        .into_iter()
        .filter(|u| !u.as_ref().trim().is_empty())
        .map(|u| {
            Arc::new(HttpRpcClient::with_client(u, http.clone(), http_config.clone()))
                as Arc<dyn RpcTransport>
        })
        .collect();

    if transports.is_empty() {
        return Err(NodeError::NoNodes);
    }
    Ok(NodePool::new(transports, pool_config))
}

/// Pool over the built-in [`DEFAULT_NODES`].
pub fn default_pool(pool_config: NodePoolConfig) -> Result<NodePool, NodeError> {
    pool_from_urls(DEFAULT_NODES.iter().copied(), HttpClientConfig::for_pool(), pool_config)
}

/// Pool over the best Beacon nodes, falling back to [`DEFAULT_NODES`] when
/// discovery fails or finds nothing.
pub async fn discover_pool(
    nodes: &mut Nodes,
    limit: Option<usize>,
    pool_config: NodePoolConfig,
) -> Result<NodePool, NodeError> {
    let urls = match nodes.as_urls(limit).await {
        Ok(urls) if !urls.is_empty() => urls,
        Ok(_) => {
            tracing::warn!("beacon returned no nodes, using defaults");
            return default_pool(pool_config);
        }
        Err(e) => {
            tracing::warn!(error = %e, "node discovery failed, using defaults");
            return default_pool(pool_config);
        }
    };
    pool_from_urls(urls, HttpClientConfig::for_pool(), pool_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_keeps_url_order() {
        let pool = pool_from_urls(
            ["https://b.example", "https://a.example/"],
            HttpClientConfig::default(),
            NodePoolConfig::default(),
        )
        .unwrap();
        assert_eq!(pool.urls(), ["https://b.example/", "https://a.example/"]);
    }

    #[test]
    fn empty_url_list_is_an_error() {
        let err = pool_from_urls(Vec::<String>::new(), HttpClientConfig::default(), NodePoolConfig::default())
            .unwrap_err();
        assert!(matches!(err, NodeError::NoNodes));
    }

    #[test]
    fn default_pool_has_all_defaults() {
        let pool = default_pool(NodePoolConfig::default()).unwrap();
        assert_eq!(pool.len(), DEFAULT_NODES.len());
    }

    #[tokio::test]
    async fn prefilled_accessor_helpers() {
        let mut nodes = Nodes::from_nodes(vec![
            Node::new(1.0, "https://fastest.example").unwrap(),
            Node::new(2.0, "https://sluggish.example").unwrap(),
        ])
        .unwrap();

        assert_eq!(
            nodes.primary_url().await.unwrap().as_deref(),
            Some("https://fastest.example/")
        );
        let two: Vec<String> = nodes.fastest(2).await.unwrap().into_iter().map(|n| n.url).collect();
        assert_eq!(two, ["https://fastest.example/", "https://sluggish.example/"]);
        assert!(nodes.fastest(0).await.unwrap().is_empty());
        assert_eq!(nodes.fastest(5).await.unwrap().len(), 2);
        assert_eq!(nodes.as_urls(Some(1)).await.unwrap(), ["https://fastest.example/"]);
    }
}
