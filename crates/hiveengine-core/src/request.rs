//! JSON-RPC 2.0 wire types as spoken by Hive Engine nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The two RPC endpoints every Hive Engine node exposes.
///
/// The endpoint is appended to the node base URL, e.g.
/// `https://api.hive-engine.com/rpc/` + `contracts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Block and transaction lookups (`getLatestBlockInfo`, `getBlockInfo`, ...).
    Blockchain,
    /// Smart contract tables (`find`, `findOne`, `getContract`).
    Contracts,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Blockchain => "blockchain",
            Self::Contracts => "contracts",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// JSON-RPC request ID: string, number, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A JSON-RPC 2.0 request.
///
/// Hive Engine methods take named parameters, so `params` is usually an
/// object (`{"contract": "tokens", "table": "balances", ...}`). Methods
/// without parameters send an empty object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: RpcId,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        let params = if params.is_null() {
            Value::Object(Default::default())
        } else {
            params
        };
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: RpcId::Number(id),
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default = "null_id")]
    pub id: RpcId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

fn null_id() -> RpcId {
    RpcId::Null
}

impl JsonRpcResponse {
    /// Build a successful response, mostly useful for test transports.
    pub fn success(id: RpcId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Returns `true` if the response carries no error object.
    ///
    /// A missing `result` is valid: `findOne` answers `null` when nothing matches.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Unwrap the result value or return the node's error.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization_uses_named_params() {
        let req = JsonRpcRequest::new(
            7,
            "findOne",
            json!({"contract": "tokens", "table": "tokens", "query": {"symbol": "BEE"}}),
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "findOne");
        assert_eq!(json["id"], 7);
        assert_eq!(json["params"]["query"]["symbol"], "BEE");
    }

    #[test]
    fn null_params_become_empty_object() {
        let req = JsonRpcRequest::new(1, "getLatestBlockInfo", Value::Null);
        assert_eq!(req.params, json!({}));
    }

    #[test]
    fn null_result_is_ok() {
        let resp: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert!(resp.is_ok());
        assert_eq!(resp.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn response_into_result_error() {
        let resp: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "invalid params"}
        }))
        .unwrap();
        assert!(!resp.is_ok());
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Blockchain.path(), "blockchain");
        assert_eq!(Endpoint::Contracts.to_string(), "contracts");
    }
}
