//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to a Hive Engine node.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, bad body).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// The node answered HTTP 429.
    #[error("Rate limit exceeded (node: {node})")]
    RateLimited { node: String },

    /// Circuit breaker is open for this node.
    #[error("Circuit breaker open for node: {node}")]
    CircuitOpen { node: String },

    /// Every node in the pool has an open circuit.
    #[error("All nodes unavailable")]
    AllNodesDown,

    /// The pool was built without any node.
    #[error("No nodes configured")]
    NoNodes,

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized into the requested type.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if another attempt (same or next node) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Timeout { .. } | Self::RateLimited { .. } | Self::CircuitOpen { .. }
        )
    }

    /// Returns `true` if the node answered with a JSON-RPC error.
    pub fn is_node_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(TransportError::Http("reset".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 10 }.is_retryable());
        assert!(TransportError::CircuitOpen { node: "a".into() }.is_retryable());
        assert!(!TransportError::AllNodesDown.is_retryable());
    }

    #[test]
    fn rpc_error_is_not_retryable() {
        let err = TransportError::Rpc(JsonRpcError {
            code: -32601,
            message: "Method not found".into(),
            data: None,
        });
        assert!(!err.is_retryable());
        assert!(err.is_node_error());
        assert_eq!(err.to_string(), "RPC error -32601: Method not found");
    }
}
