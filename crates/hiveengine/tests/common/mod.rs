//! In-memory sidechain for action tests: `find` and `findOne` answered from
//! fixture tables, every submitted operation recorded.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hiveengine::ops::dry_run_body;
use hiveengine::{Api, DryRunBroadcaster, Submitter};
use hiveengine_core::{Endpoint, JsonRpcRequest, JsonRpcResponse, RpcTransport, TransportError};
use hiveengine_http::HistoryClient;
use serde_json::{json, Value};

#[derive(Default)]
pub struct Fixtures {
    tables: HashMap<(String, String), Vec<Value>>,
    pub calls: Mutex<Vec<JsonRpcRequest>>,
}

impl Fixtures {
    pub fn with(mut self, contract: &str, table: &str, rows: Vec<Value>) -> Self {
        self.tables
            .insert((contract.to_string(), table.to_string()), rows);
        self
    }

    fn rows(&self, params: &Value) -> Vec<Value> {
        let contract = params["contract"].as_str().unwrap_or_default().to_string();
        let table = params["table"].as_str().unwrap_or_default().to_string();
        let query = params["query"].as_object().cloned().unwrap_or_default();
        self.tables
            .get(&(contract, table))
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        // Only plain equality on top-level scalars is modelled.
                        query
                            .iter()
                            .filter(|(_, v)| !v.is_object())
                            .all(|(k, v)| row.get(k) == Some(v))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl RpcTransport for Fixtures {
    async fn send(
        &self,
        _endpoint: Endpoint,
        req: JsonRpcRequest,
    ) -> Result<JsonRpcResponse, TransportError> {
        self.calls.lock().unwrap().push(req.clone());
        let result = match req.method.as_str() {
            "find" => Value::Array(self.rows(&req.params)),
            "findOne" => self.rows(&req.params).into_iter().next().unwrap_or(Value::Null),
            _ => Value::Null,
        };
        Ok(JsonRpcResponse::success(req.id, result))
    }

    fn url(&self) -> &str {
        "fixtures"
    }
}

pub fn api(fixtures: Fixtures) -> Api {
    let history = HistoryClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    Api::new(Arc::new(fixtures), history)
}

pub fn dry_run() -> (Submitter, Arc<DryRunBroadcaster>) {
    let broadcaster = Arc::new(DryRunBroadcaster::new());
    (Submitter::new(broadcaster.clone()), broadcaster)
}

/// The decoded `json` field of a dry-run `custom_json` result.
pub fn contract_body(result: &Value) -> Value {
    let op = dry_run_body(result).expect("dry run result");
    serde_json::from_str(op["json"].as_str().expect("json string")).unwrap()
}

pub fn signer(result: &Value) -> (Value, Value) {
    let op = dry_run_body(result).expect("dry run result");
    (
        op["required_auths"].clone(),
        op["required_posting_auths"].clone(),
    )
}

pub fn token(symbol: &str, issuer: &str, precision: u32, max_supply: &str, supply: &str) -> Value {
    json!({
        "issuer": issuer,
        "symbol": symbol,
        "name": symbol,
        "precision": precision,
        "maxSupply": max_supply,
        "supply": supply,
        "circulatingSupply": supply,
    })
}

pub fn balance(account: &str, symbol: &str, balance: &str, stake: &str) -> Value {
    json!({
        "account": account,
        "symbol": symbol,
        "balance": balance,
        "stake": stake,
    })
}

/// A sidechain with BEE, SWAP.HIVE and a token issued by alice.
pub fn standard() -> Fixtures {
    Fixtures::default()
        .with(
            "tokens",
            "tokens",
            vec![
                token("BEE", "null", 8, "9007199254740991", "2000000"),
                token("SWAP.HIVE", "honey-swap", 8, "9007199254740991", "500000"),
                token("ALC", "alice", 3, "1000.000", "100.000"),
                token("FULL", "alice", 0, "10", "10"),
            ],
        )
        .with(
            "tokens",
            "balances",
            vec![
                balance("alice", "BEE", "10.00000000", "2.00000000"),
                balance("alice", "SWAP.HIVE", "5.00000000", "0"),
                balance("alice", "ALC", "50.000", "0"),
                balance("bob", "BEE", "1.00000000", "0"),
            ],
        )
}
