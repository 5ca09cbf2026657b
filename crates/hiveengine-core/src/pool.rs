//! Multi-node failover pool.
//!
//! Every call starts at a node chosen by the pool (round-robin cursor, or
//! always the first node when rotation is off) and walks the remaining
//! nodes in order until one answers. Nodes whose circuit is open are
//! skipped; each node is tried at most once per call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::policy::{CircuitBreaker, CircuitBreakerConfig};
use crate::request::{Endpoint, JsonRpcRequest, JsonRpcResponse};
use crate::transport::{HealthStatus, RpcTransport};

#[derive(Debug, Clone)]
pub struct NodePoolConfig {
    /// Circuit breaker config applied to each node.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Timeout per attempt on a single node.
    pub request_timeout: Duration,
    /// Spread calls round-robin (`true`) or prefer the first node (`false`).
    pub rotate: bool,
}

impl Default for NodePoolConfig {
    fn default() -> Self {
        Self {
            circuit_breaker: CircuitBreakerConfig::default(),
            request_timeout: Duration::from_secs(30),
            rotate: false,
        }
    }
}

struct NodeSlot {
    transport: Arc<dyn RpcTransport>,
    circuit: CircuitBreaker,
}

/// Pool of node transports with per-node circuit breakers and try-next fallback.
pub struct NodePool {
    slots: Vec<NodeSlot>,
    cursor: AtomicUsize,
    config: NodePoolConfig,
}

impl std::fmt::Debug for NodePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodePool")
            .field("urls", &self.urls())
            .field("rotate", &self.config.rotate)
            .finish()
    }
}

impl NodePool {
    /// Build a pool; the order of `transports` is the preference order.
    pub fn new(transports: Vec<Arc<dyn RpcTransport>>, config: NodePoolConfig) -> Self {
        let slots = transports
            .into_iter()
            .map(|t| NodeSlot {
                circuit: CircuitBreaker::new(t.url(), config.circuit_breaker.clone()),
                transport: t,
            })
            .collect();
        Self {
            slots,
            cursor: AtomicUsize::new(0),
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Node URLs in preference order.
    pub fn urls(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.transport.url().to_string()).collect()
    }

    /// `(url, transport health, circuit state)` for each node.
    pub fn health_summary(&self) -> Vec<(String, HealthStatus, String)> {
        self.slots
            .iter()
            .map(|s| {
                (
                    s.transport.url().to_string(),
                    s.transport.health(),
                    s.circuit.state().to_string(),
                )
            })
            .collect()
    }

    /// Indices of the nodes to try for one call, in order.
    fn attempt_order(&self) -> Vec<usize> {
        let n = self.slots.len();
        if n == 0 {
            return Vec::new();
        }
        let start = if self.config.rotate {
            self.cursor.fetch_add(1, Ordering::Relaxed) % n
        } else {
            0
        };
        (0..n)
            .map(|i| (start + i) % n)
            .filter(|&idx| self.slots[idx].circuit.is_allowed())
            .collect()
    }

    async fn send_to(
        &self,
        slot: &NodeSlot,
        endpoint: Endpoint,
        req: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, TransportError> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, slot.transport.send(endpoint, req))
            .await
            .map_err(|_| TransportError::Timeout {
                ms: timeout.as_millis() as u64,
            })?
    }
}

#[async_trait]
impl RpcTransport for NodePool {
    async fn send(
        &self,
        endpoint: Endpoint,
        req: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, TransportError> {
        if self.slots.is_empty() {
            return Err(TransportError::NoNodes);
        }
        let order = self.attempt_order();
        let mut last_err = None;

        for idx in order {
            let slot = &self.slots[idx];
            match self.send_to(slot, endpoint, req.clone()).await {
                Ok(resp) => {
                    slot.circuit.record_success();
                    return Ok(resp);
                }
                Err(e) if e.is_retryable() => {
                    slot.circuit.record_failure();
                    tracing::warn!(
                        node = %slot.transport.url(),
                        method = %req.method,
                        error = %e,
                        "node failed, falling back to next node"
                    );
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or(TransportError::AllNodesDown))
    }

    fn health(&self) -> HealthStatus {
        let up = self.slots.iter().filter(|s| s.circuit.is_allowed()).count();
        match up {
            0 => HealthStatus::Unhealthy,
            n if n == self.slots.len() => HealthStatus::Healthy,
            _ => HealthStatus::Degraded,
        }
    }

    fn url(&self) -> &str {
        self.slots
            .first()
            .map(|s| s.transport.url())
            .unwrap_or("pool")
    }
}
