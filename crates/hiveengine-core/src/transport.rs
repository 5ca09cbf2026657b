//! The `RpcTransport` trait: the core abstraction for talking to nodes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::{Endpoint, JsonRpcRequest, JsonRpcResponse};

/// Node health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Node is responding normally.
    Healthy,
    /// Node is responding but some requests fail (circuit half-open, or part of a pool is down).
    Degraded,
    /// Node is not responding (circuit open).
    Unhealthy,
    /// Not yet checked.
    Unknown,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The async trait every node transport implements.
///
/// Implementations must be `Send + Sync` so they can be shared as
/// `Arc<dyn RpcTransport>` across tasks; the trait is object safe.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request to `endpoint` and return the response.
    async fn send(
        &self,
        endpoint: Endpoint,
        req: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, TransportError>;

    /// Send a batch of JSON-RPC requests to `endpoint`.
    ///
    /// Default implementation sends them sequentially; override for true batching.
    async fn send_batch(
        &self,
        endpoint: Endpoint,
        reqs: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        let mut responses = Vec::with_capacity(reqs.len());
        for req in reqs {
            responses.push(self.send(endpoint, req).await?);
        }
        Ok(responses)
    }

    /// Return the current health status of this transport.
    fn health(&self) -> HealthStatus {
        HealthStatus::Unknown
    }

    /// Return the transport's identifier (node base URL or a label).
    fn url(&self) -> &str;

    /// Call `method` and return the raw `result` value.
    async fn call_value(
        &self,
        id: u64,
        endpoint: Endpoint,
        method: &str,
        params: Value,
    ) -> Result<Value, TransportError> {
        let req = JsonRpcRequest::new(id, method, params);
        let resp = self.send(endpoint, req).await?;
        resp.into_result().map_err(TransportError::Rpc)
    }
}

/// Typed convenience calls, available on every transport including `dyn RpcTransport`.
#[async_trait]
pub trait RpcTransportExt: RpcTransport {
    /// Call a method and deserialize the result.
    async fn call<T: DeserializeOwned + Send>(
        &self,
        id: u64,
        endpoint: Endpoint,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let result = self.call_value(id, endpoint, method, params).await?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}

impl<T: RpcTransport + ?Sized> RpcTransportExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RpcId;
    use serde_json::json;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl RpcTransport for Echo {
        async fn send(
            &self,
            endpoint: Endpoint,
            req: JsonRpcRequest,
        ) -> Result<JsonRpcResponse, TransportError> {
            Ok(JsonRpcResponse::success(
                req.id,
                json!({"endpoint": endpoint.path(), "method": req.method}),
            ))
        }

        fn url(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn typed_call_through_trait_object() {
        #[derive(serde::Deserialize)]
        struct Out {
            endpoint: String,
            method: String,
        }

        let transport: Arc<dyn RpcTransport> = Arc::new(Echo);
        let out: Out = transport
            .call(1, Endpoint::Blockchain, "getStatus", Value::Null)
            .await
            .unwrap();
        assert_eq!(out.endpoint, "blockchain");
        assert_eq!(out.method, "getStatus");
    }

    #[tokio::test]
    async fn default_batch_is_sequential() {
        let reqs = vec![
            JsonRpcRequest::new(1, "a", Value::Null),
            JsonRpcRequest::new(2, "b", Value::Null),
        ];
        let resps = Echo.send_batch(Endpoint::Contracts, reqs).await.unwrap();
        assert_eq!(resps.len(), 2);
        assert_eq!(resps[1].id, RpcId::Number(2));
    }
}
