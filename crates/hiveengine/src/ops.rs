//! Hive operations that carry Hive Engine contract actions.
//!
//! Sidechain writes ride on Hive `custom_json` operations with the id
//! `ssc-mainnet-hive`. This crate only builds them; signing and broadcasting
//! are left to a [`Broadcaster`] implementation.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{EngineError, Result};

pub const SSC_MAINNET_ID: &str = "ssc-mainnet-hive";

/// The JSON body of a sidechain action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAction {
    pub contract_name: String,
    pub contract_action: String,
    pub contract_payload: Value,
}

impl ContractAction {
    pub fn new(contract: &str, action: &str, payload: Value) -> Self {
        Self {
            contract_name: contract.to_string(),
            contract_action: action.to_string(),
            contract_payload: payload,
        }
    }
}

/// An unsigned `custom_json` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomJson {
    pub id: String,
    pub json: ContractAction,
    pub required_auths: Vec<String>,
    pub required_posting_auths: Vec<String>,
}

impl CustomJson {
    /// Signed with the active key of `account`.
    pub fn active(id: &str, account: &str, json: ContractAction) -> Self {
        Self {
            id: id.to_string(),
            json,
            required_auths: vec![account.to_string()],
            required_posting_auths: Vec::new(),
        }
    }

    /// Signed with the posting key of `account`.
    pub fn posting(id: &str, account: &str, json: ContractAction) -> Self {
        Self {
            id: id.to_string(),
            json,
            required_auths: Vec::new(),
            required_posting_auths: vec![account.to_string()],
        }
    }

    /// The operation as Hive expects it, with `json` as a string.
    pub fn to_operation(&self) -> Result<Value> {
        Ok(json!([
            "custom_json",
            {
                "required_auths": self.required_auths,
                "required_posting_auths": self.required_posting_auths,
                "id": self.id,
                "json": serde_json::to_string(&self.json)?,
            }
        ]))
    }
}

/// An unsigned Hive `transfer` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiveTransfer {
    pub from: String,
    pub to: String,
    /// Asset string, e.g. `"1.000 HIVE"`.
    pub amount: String,
    pub memo: String,
}

impl HiveTransfer {
    pub fn to_operation(&self) -> Value {
        json!(["transfer", self])
    }
}

/// Signs and broadcasts operations to the Hive chain.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast_custom_json(&self, op: CustomJson) -> Result<Value>;

    async fn broadcast_transfer(&self, op: HiveTransfer) -> Result<Value>;
}

/// Broadcaster that signs nothing: it returns the unsigned operation and
/// keeps a copy of everything it was given.
#[derive(Debug, Default)]
pub struct DryRunBroadcaster {
    sent: Mutex<Vec<Value>>,
}

impl DryRunBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations received so far, oldest first.
    pub fn operations(&self) -> Vec<Value> {
        self.sent.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    fn record(&self, op: Value) -> Value {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(op.clone());
        }
        json!({ "operations": [op], "signed": false })
    }
}

#[async_trait]
impl Broadcaster for DryRunBroadcaster {
    async fn broadcast_custom_json(&self, op: CustomJson) -> Result<Value> {
        tracing::debug!(id = %op.id, action = %op.json.contract_action, "dry run custom_json");
        Ok(self.record(op.to_operation()?))
    }

    async fn broadcast_transfer(&self, op: HiveTransfer) -> Result<Value> {
        tracing::debug!(to = %op.to, amount = %op.amount, "dry run transfer");
        Ok(self.record(op.to_operation()))
    }
}

/// Where domain objects send their write actions: the sidechain id plus a
/// broadcaster.
#[derive(Clone)]
pub struct Submitter {
    ssc_id: String,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Default for Submitter {
    fn default() -> Self {
        Self::new(Arc::new(DryRunBroadcaster::new()))
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter").field("ssc_id", &self.ssc_id).finish()
    }
}

impl Submitter {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            ssc_id: SSC_MAINNET_ID.to_string(),
            broadcaster,
        }
    }

    pub fn ssc_id(&self) -> &str {
        &self.ssc_id
    }

    /// Override the sidechain id (default `ssc-mainnet-hive`).
    pub fn set_id(&mut self, ssc_id: impl Into<String>) {
        self.ssc_id = ssc_id.into();
    }

    pub async fn active(
        &self,
        account: &str,
        contract: &str,
        action: &str,
        payload: Value,
    ) -> Result<Value> {
        let op = CustomJson::active(&self.ssc_id, account, ContractAction::new(contract, action, payload));
        self.broadcaster.broadcast_custom_json(op).await
    }

    pub async fn posting(
        &self,
        account: &str,
        contract: &str,
        action: &str,
        payload: Value,
    ) -> Result<Value> {
        let op = CustomJson::posting(&self.ssc_id, account, ContractAction::new(contract, action, payload));
        self.broadcaster.broadcast_custom_json(op).await
    }

    pub async fn transfer(&self, op: HiveTransfer) -> Result<Value> {
        if op.amount.trim().is_empty() {
            return Err(EngineError::InvalidArgument("transfer amount is empty".into()));
        }
        self.broadcaster.broadcast_transfer(op).await
    }
}

/// Helper for tests and callers that want the `custom_json` body back from
/// a [`DryRunBroadcaster`] result.
pub fn dry_run_body(result: &Value) -> Option<&Value> {
    result.get("operations")?.get(0)?.get(1)
}
