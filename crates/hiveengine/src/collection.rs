//! NFT instances owned by one account.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{json, Value};

use crate::account::validate_account_name;
use crate::api::Api;
use crate::error::{EngineError, Result};
use crate::nft::PartyType;
use crate::nfts::Nfts;
use crate::ops::Submitter;

/// Concurrent instance-table scans during `refresh`.
const LOAD_CONCURRENCY: usize = 8;

/// Instance ids of one NFT symbol, as used by the nft contract actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftRef {
    pub symbol: String,
    pub ids: Vec<String>,
}

impl NftRef {
    pub fn new<I, S>(symbol: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbol: symbol.to_uppercase(),
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    fn to_value(&self) -> Value {
        json!({ "symbol": self.symbol, "ids": self.ids })
    }
}

#[derive(Debug, Clone)]
pub struct Collection {
    api: Api,
    account: String,
    /// Symbol to owned instances; symbols without instances are absent.
    collection: BTreeMap<String, Vec<Value>>,
    submitter: Submitter,
}

impl Collection {
    pub async fn load(api: &Api, account: &str) -> Result<Self> {
        validate_account_name(account)?;
        let mut collection = Self {
            api: api.clone(),
            account: account.to_string(),
            collection: BTreeMap::new(),
            submitter: api.submitter(),
        };
        collection.refresh().await?;
        Ok(collection)
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn set_id(&mut self, ssc_id: impl Into<String>) {
        self.submitter.set_id(ssc_id);
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn collection(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.collection
    }

    /// Rescan every NFT instance table for this account.
    pub async fn refresh(&mut self) -> Result<()> {
        let nfts = Nfts::load(&self.api).await?;
        let symbols: Vec<String> = nfts
            .get_symbol_list()
            .into_iter()
            .map(str::to_string)
            .collect();

        let api = &self.api;
        let account = self.account.as_str();
        let found: Vec<(String, Vec<Value>)> = stream::iter(symbols)
            .map(|symbol| async move {
                let table = format!("{symbol}instances");
                let rows = api
                    .find_all("nft", &table, json!({ "account": account }))
                    .await?;
                Ok::<_, EngineError>((symbol, rows))
            })
            .buffer_unordered(LOAD_CONCURRENCY)
            .try_collect()
            .await?;

        self.collection = found
            .into_iter()
            .filter(|(_, rows)| !rows.is_empty())
            .collect();
        tracing::debug!(
            account = %self.account,
            symbols = self.collection.len(),
            "nft collection loaded"
        );
        Ok(())
    }

    pub async fn change_account(&mut self, account: &str) -> Result<()> {
        validate_account_name(account)?;
        self.account = account.to_string();
        self.refresh().await
    }

    /// Owned instance `id` of `symbol`.
    pub fn get_nft(&self, id: u64, symbol: &str) -> Option<&Value> {
        self.collection
            .get(&symbol.to_uppercase())?
            .iter()
            .find(|row| row.get("_id").and_then(Value::as_u64) == Some(id))
    }

    pub async fn transfer(
        &self,
        to: &str,
        nfts: &[NftRef],
        from_type: PartyType,
        to_type: PartyType,
    ) -> Result<Value> {
        let mut payload = json!({ "to": to, "nfts": refs(nfts)? });
        set_party_types(&mut payload, from_type, to_type);
        self.submitter
            .active(&self.account, "nft", "transfer", payload)
            .await
    }

    pub async fn burn(&self, nfts: &[NftRef]) -> Result<Value> {
        self.submitter
            .active(&self.account, "nft", "burn", json!({ "nfts": refs(nfts)? }))
            .await
    }

    pub async fn delegate(
        &self,
        to: &str,
        nfts: &[NftRef],
        from_type: PartyType,
        to_type: PartyType,
    ) -> Result<Value> {
        let mut payload = json!({ "to": to, "nfts": refs(nfts)? });
        set_party_types(&mut payload, from_type, to_type);
        self.submitter
            .active(&self.account, "nft", "delegate", payload)
            .await
    }

    pub async fn undelegate(&self, nfts: &[NftRef], from_type: PartyType) -> Result<Value> {
        let mut payload = json!({ "nfts": refs(nfts)? });
        if from_type == PartyType::Contract {
            payload["fromType"] = json!(from_type.as_str());
        }
        self.submitter
            .active(&self.account, "nft", "undelegate", payload)
            .await
    }
}

fn refs(nfts: &[NftRef]) -> Result<Vec<Value>> {
    if nfts.is_empty() {
        return Err(EngineError::InvalidArgument("nfts cannot be empty".into()));
    }
    Ok(nfts.iter().map(NftRef::to_value).collect())
}

// User is the contract default and is omitted from the payload.
fn set_party_types(payload: &mut Value, from_type: PartyType, to_type: PartyType) {
    if from_type == PartyType::Contract {
        payload["fromType"] = json!(from_type.as_str());
    }
    if to_type == PartyType::Contract {
        payload["toType"] = json!(to_type.as_str());
    }
}
