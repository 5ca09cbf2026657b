//! A ranked Hive Engine node and the Beacon payload parser.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NodeError;

/// A node endpoint with its benchmark rank (lower is faster).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub rank: f64,
    pub url: String,
    /// The raw benchmark entry this node was built from.
    #[serde(default)]
    pub data: Value,
    /// Why the benchmark considers this node unhealthy, if it does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failing_cause: Option<String>,
}

impl Node {
    pub fn new(rank: f64, url: &str) -> Result<Self, NodeError> {
        let cleaned = url.trim();
        if cleaned.is_empty() {
            return Err(NodeError::EmptyUrl);
        }
        Ok(Self {
            rank,
            url: format!("{}/", cleaned.trim_end_matches('/')),
            data: Value::Null,
            failing_cause: None,
        })
    }

    pub fn as_url(&self) -> &str {
        &self.url
    }

    pub fn is_failing(&self) -> bool {
        self.failing_cause.is_some()
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.rank.partial_cmp(&other.rank)
    }
}

/// Turn a Beacon `/nodes` payload into nodes sorted by rank.
///
/// Entries without a usable `endpoint` are skipped. `rank` is
/// `100 - score` floored at zero, or 100 when the entry has no score.
pub fn parse_beacon(payload: &Value, limit: Option<usize>) -> Result<Vec<Node>, NodeError> {
    let entries = payload.as_array().ok_or(NodeError::UnexpectedPayload)?;

    let mut nodes: Vec<Node> = entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let endpoint = obj.get("endpoint")?.as_str()?;
            let rank = obj
                .get("score")
                .and_then(Value::as_f64)
                .map(|score| (100.0 - score).max(0.0))
                .unwrap_or(100.0);
            let mut node = Node::new(rank, endpoint).ok()?;
            node.failing_cause = obj
                .get("fail")
                .and_then(Value::as_f64)
                .filter(|fails| *fails > 0.0)
                .map(|fails| format!("{} failed health checks", fails as i64));
            node.data = entry.clone();
            Some(node)
        })
        .collect();

    nodes.sort_by(|a, b| a.rank.partial_cmp(&b.rank).unwrap_or(Ordering::Equal));
    if let Some(limit) = limit {
        nodes.truncate(limit);
    }
    Ok(nodes)
}
