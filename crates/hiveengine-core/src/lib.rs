//! hiveengine-core: foundation traits and types for Hive Engine clients.
//!
//! # Overview
//!
//! Hive Engine nodes speak JSON-RPC 2.0 over HTTP on two endpoints,
//! `blockchain` and `contracts`. This crate defines everything that does not
//! depend on a concrete HTTP stack:
//!
//! - [`RpcTransport`]: the async trait every node transport implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] / [`Endpoint`]: wire types
//! - [`TransportError`]: structured error type
//! - [`policy`] module: retry, circuit breaker, rate limiter
//! - [`pool`] module: multi-node failover pool
//! - [`query`] module: Mongo-style query builders used by `find`

pub mod error;
pub mod policy;
pub mod pool;
pub mod query;
pub mod request;
pub mod transport;

pub use error::TransportError;
pub use pool::{NodePool, NodePoolConfig};
pub use query::{with_last_id, Cond, Query};
pub use request::{Endpoint, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::{HealthStatus, RpcTransport};
