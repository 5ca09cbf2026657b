//! One NFT definition of the `nft` contract: reads and issuer actions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::api::{Api, FindOptions};
use crate::config::MAX_FIND_LIMIT;
use crate::error::{EngineError, Result};
use crate::ops::Submitter;

/// Who sends or receives an NFT: a Hive account or a sidechain contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartyType {
    #[default]
    User,
    Contract,
}

impl PartyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Contract => "contract",
        }
    }
}

/// A row of `nft.nfts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftInfo {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub issuer: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub max_supply: Value,
    #[serde(default)]
    pub supply: Value,
    #[serde(default)]
    pub circulating_supply: Value,
    #[serde(default)]
    pub delegation_enabled: bool,
    #[serde(default)]
    pub undelegation_cooldown: Option<u64>,
    #[serde(default)]
    pub authorized_issuing_accounts: Vec<String>,
    #[serde(default)]
    pub authorized_issuing_contracts: Vec<String>,
    /// Property name to its definition (type, isReadOnly, editors).
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub group_by: Vec<String>,
}

/// Optional fields of a new property definition.
#[derive(Debug, Clone, Default)]
pub struct PropertyOptions {
    pub is_read_only: Option<bool>,
    pub authorized_editing_accounts: Option<Vec<String>>,
    pub authorized_editing_contracts: Option<Vec<String>>,
}

/// Optional fields of an `issue` action.
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    pub from_type: Option<PartyType>,
    pub to_type: Option<PartyType>,
    pub lock_tokens: Option<Value>,
    pub lock_nfts: Option<Vec<Value>>,
    pub properties: Option<Value>,
    /// Signs instead of the issuer.
    pub authorized_account: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Nft {
    api: Api,
    info: NftInfo,
    submitter: Submitter,
}

impl Nft {
    pub async fn load(api: &Api, symbol: &str) -> Result<Self> {
        let symbol = symbol.to_uppercase();
        let info = api
            .find_one_typed::<NftInfo>("nft", "nfts", json!({ "symbol": symbol }))
            .await?
            .ok_or(EngineError::NftDoesNotExist(symbol))?;
        Ok(Self::from_info(api, info))
    }

    pub fn from_info(api: &Api, info: NftInfo) -> Self {
        Self {
            api: api.clone(),
            info,
            submitter: api.submitter(),
        }
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn set_id(&mut self, ssc_id: impl Into<String>) {
        self.submitter.set_id(ssc_id);
    }

    /// Reload the definition.
    pub async fn refresh(&mut self) -> Result<()> {
        self.info = Self::load(&self.api, &self.info.symbol).await?.info;
        Ok(())
    }

    pub fn info(&self) -> &NftInfo {
        &self.info
    }

    pub fn symbol(&self) -> &str {
        &self.info.symbol
    }

    pub fn issuer(&self) -> &str {
        &self.info.issuer
    }

    /// Names of the defined data properties.
    pub fn properties(&self) -> Vec<&str> {
        self.info.properties.keys().map(String::as_str).collect()
    }

    fn instances_table(&self) -> String {
        format!("{}instances", self.info.symbol)
    }

    /// Instances carrying the data property `name`.
    pub async fn get_property(&self, name: &str) -> Result<Vec<Value>> {
        self.api
            .find_all("nft", &self.instances_table(), json!({ "properties.name": name }))
            .await
    }

    /// Instances owned by `account`.
    pub async fn get_collection(&self, account: &str) -> Result<Vec<Value>> {
        self.api
            .find_all("nft", &self.instances_table(), json!({ "account": account }))
            .await
    }

    pub async fn get_id(&self, id: u64) -> Result<Option<Value>> {
        self.api
            .find_one("nft", &self.instances_table(), json!({ "_id": id }))
            .await
    }

    /// Trades of this NFT; `query` may filter on priceSymbol or timestamp.
    pub async fn get_trade_history(
        &self,
        query: Value,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.market_table("tradesHistory", query, limit, offset).await
    }

    /// Open interest; `query` may filter on side, priceSymbol or grouping.
    pub async fn get_open_interest(
        &self,
        query: Value,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.market_table("openInterest", query, limit, offset).await
    }

    /// Instances for sale; `query` may filter on ownedBy, account, nftId,
    /// grouping or priceSymbol.
    pub async fn get_sell_book(
        &self,
        query: Value,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.market_table("sellBook", query, limit, offset).await
    }

    async fn market_table(
        &self,
        suffix: &str,
        query: Value,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Value>> {
        market_rows(&self.api, &self.info.symbol, suffix, query, limit, offset).await
    }

    async fn as_issuer_active(&self, action: &str, payload: Value) -> Result<Value> {
        self.submitter
            .active(&self.info.issuer, "nft", action, payload)
            .await
    }

    async fn as_issuer_posting(&self, action: &str, payload: Value) -> Result<Value> {
        self.submitter
            .posting(&self.info.issuer, "nft", action, payload)
            .await
    }

    pub async fn update_url(&self, url: &str) -> Result<Value> {
        self.as_issuer_posting("updateUrl", json!({ "symbol": self.info.symbol, "url": url }))
            .await
    }

    pub async fn update_metadata(&self, metadata: Value) -> Result<Value> {
        self.as_issuer_posting(
            "updateMetadata",
            json!({ "symbol": self.info.symbol, "metadata": metadata }),
        )
        .await
    }

    pub async fn update_name(&self, name: &str) -> Result<Value> {
        self.as_issuer_posting("updateName", json!({ "symbol": self.info.symbol, "name": name }))
            .await
    }

    pub async fn update_org_name(&self, org_name: &str) -> Result<Value> {
        self.as_issuer_posting(
            "updateOrgName",
            json!({ "symbol": self.info.symbol, "orgName": org_name }),
        )
        .await
    }

    pub async fn update_product_name(&self, product_name: &str) -> Result<Value> {
        self.as_issuer_posting(
            "updateProductName",
            json!({ "symbol": self.info.symbol, "productName": product_name }),
        )
        .await
    }

    pub async fn add_authorized_issuing_accounts(&self, accounts: &[&str]) -> Result<Value> {
        self.as_issuer_active(
            "addAuthorizedIssuingAccounts",
            json!({ "symbol": self.info.symbol, "accounts": accounts }),
        )
        .await
    }

    pub async fn add_authorized_issuing_contracts(&self, contracts: &[&str]) -> Result<Value> {
        self.as_issuer_active(
            "addAuthorizedIssuingContracts",
            json!({ "symbol": self.info.symbol, "contracts": contracts }),
        )
        .await
    }

    pub async fn remove_authorized_issuing_accounts(&self, accounts: &[&str]) -> Result<Value> {
        self.as_issuer_active(
            "removeAuthorizedIssuingAccounts",
            json!({ "symbol": self.info.symbol, "accounts": accounts }),
        )
        .await
    }

    pub async fn remove_authorized_issuing_contracts(&self, contracts: &[&str]) -> Result<Value> {
        self.as_issuer_active(
            "removeAuthorizedIssuingContracts",
            json!({ "symbol": self.info.symbol, "contracts": contracts }),
        )
        .await
    }

    pub async fn transfer_ownership(&self, to: &str) -> Result<Value> {
        self.as_issuer_active(
            "transferOwnership",
            json!({ "symbol": self.info.symbol, "to": to }),
        )
        .await
    }

    /// Define a data property; `prop_type` is number, string or boolean.
    pub async fn add_property(
        &self,
        name: &str,
        prop_type: &str,
        options: PropertyOptions,
    ) -> Result<Value> {
        if !matches!(prop_type, "number" | "string" | "boolean") {
            return Err(EngineError::InvalidArgument(format!(
                "property type must be number, string or boolean, got {prop_type:?}"
            )));
        }
        let mut payload = json!({ "symbol": self.info.symbol, "name": name, "type": prop_type });
        if let Some(read_only) = options.is_read_only {
            payload["isReadOnly"] = json!(read_only);
        }
        if let Some(accounts) = options.authorized_editing_accounts {
            payload["authorizedEditingAccounts"] = json!(accounts);
        }
        if let Some(contracts) = options.authorized_editing_contracts {
            payload["authorizedEditingContracts"] = json!(contracts);
        }
        self.as_issuer_active("addProperty", payload).await
    }

    /// Replace the editors of property `name`.
    pub async fn set_property_permissions(
        &self,
        name: &str,
        accounts: Option<&[&str]>,
        contracts: Option<&[&str]>,
    ) -> Result<Value> {
        let mut payload = json!({ "symbol": self.info.symbol, "name": name });
        if let Some(accounts) = accounts {
            payload["accounts"] = json!(accounts);
        }
        if let Some(contracts) = contracts {
            payload["contracts"] = json!(contracts);
        }
        self.as_issuer_active("setPropertyPermissions", payload).await
    }

    /// Write property values on instances, e.g.
    /// `[{"id": "573", "properties": {"color": "red"}}]`. Signed with the
    /// posting key of `authorized_account`, or of the issuer.
    pub async fn set_properties(
        &self,
        nfts: Vec<Value>,
        from_type: Option<PartyType>,
        authorized_account: Option<&str>,
    ) -> Result<Value> {
        if nfts.is_empty() {
            return Err(EngineError::InvalidArgument("nfts cannot be empty".into()));
        }
        let mut payload = json!({ "symbol": self.info.symbol, "nfts": nfts });
        if let Some(from_type) = from_type {
            payload["fromType"] = json!(from_type.as_str());
        }
        let signer = authorized_account.unwrap_or(&self.info.issuer);
        self.submitter
            .posting(signer, "nft", "setProperties", payload)
            .await
    }

    /// Properties the market groups open interest by.
    pub async fn set_group_by(&self, properties: &[&str]) -> Result<Value> {
        self.as_issuer_active(
            "setGroupBy",
            json!({ "symbol": self.info.symbol, "properties": properties }),
        )
        .await
    }

    /// Change a property definition; only allowed before the first issue.
    pub async fn update_property_definition(
        &self,
        name: &str,
        new_name: Option<&str>,
        prop_type: Option<&str>,
        is_read_only: Option<bool>,
    ) -> Result<Value> {
        let mut payload = json!({ "symbol": self.info.symbol, "name": name });
        if let Some(new_name) = new_name {
            payload["newName"] = json!(new_name);
        }
        if let Some(prop_type) = prop_type {
            payload["type"] = json!(prop_type);
        }
        if let Some(read_only) = is_read_only {
            payload["isReadOnly"] = json!(read_only);
        }
        self.as_issuer_active("updatePropertyDefinition", payload)
            .await
    }

    /// Issue one instance to `to`, paying the fee in `fee_symbol`.
    pub async fn issue(&self, to: &str, fee_symbol: &str, options: IssueOptions) -> Result<Value> {
        let mut payload = json!({
            "symbol": self.info.symbol,
            "to": to,
            "feeSymbol": fee_symbol.to_uppercase(),
        });
        if let Some(from_type) = options.from_type {
            payload["fromType"] = json!(from_type.as_str());
        }
        if let Some(to_type) = options.to_type {
            payload["toType"] = json!(to_type.as_str());
        }
        if let Some(lock_tokens) = options.lock_tokens {
            payload["lockTokens"] = lock_tokens;
        }
        if let Some(lock_nfts) = options.lock_nfts {
            payload["lockNfts"] = json!(lock_nfts);
        }
        if let Some(properties) = options.properties {
            payload["properties"] = properties;
        }
        let signer = options
            .authorized_account
            .as_deref()
            .unwrap_or(&self.info.issuer);
        self.submitter.active(signer, "nft", "issue", payload).await
    }

    /// Issue several instances in one action.
    pub async fn issue_multiple(
        &self,
        instances: Vec<Value>,
        authorized_account: Option<&str>,
    ) -> Result<Value> {
        if instances.is_empty() {
            return Err(EngineError::InvalidArgument("instances cannot be empty".into()));
        }
        let signer = authorized_account.unwrap_or(&self.info.issuer);
        self.submitter
            .active(signer, "nft", "issueMultiple", json!({ "instances": instances }))
            .await
    }

    /// Allow delegation; undelegated instances return after
    /// `undelegation_cooldown` days.
    pub async fn enable_delegation(&self, undelegation_cooldown: u32) -> Result<Value> {
        self.as_issuer_active(
            "enableDelegation",
            json!({ "symbol": self.info.symbol, "undelegationCooldown": undelegation_cooldown }),
        )
        .await
    }
}

/// Rows of the nftmarket table `<symbol><suffix>`: one page when
/// `limit <= 1000`, every row when `limit` is `None` or larger.
pub(crate) async fn market_rows(
    api: &Api,
    symbol: &str,
    suffix: &str,
    query: Value,
    limit: Option<u32>,
    offset: u32,
) -> Result<Vec<Value>> {
    let table = format!("{}{suffix}", symbol.to_uppercase());
    match limit {
        Some(limit) if limit <= MAX_FIND_LIMIT => {
            let options = FindOptions::default().with_limit(limit).with_offset(offset);
            api.find("nftmarket", &table, query, &options).await
        }
        _ => api.find_all("nftmarket", &table, query).await,
    }
}
