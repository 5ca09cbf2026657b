//! Token definitions from the `tokens` contract.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::Api;
use crate::error::{EngineError, Result};
use crate::quantity::Quantity;

/// A row of `tokens.tokens`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub issuer: String,
    pub symbol: String,
    pub name: String,
    /// JSON encoded by the issuer (url, icon, desc).
    #[serde(default)]
    pub metadata: String,
    pub precision: u32,
    pub max_supply: Quantity,
    pub supply: Quantity,
    pub circulating_supply: Quantity,
    #[serde(default)]
    pub staking_enabled: bool,
    #[serde(default)]
    pub unstaking_cooldown: Option<u64>,
    #[serde(default)]
    pub delegation_enabled: bool,
    #[serde(default)]
    pub undelegation_cooldown: Option<u64>,
    #[serde(default)]
    pub number_transactions: Option<u64>,
    #[serde(default)]
    pub total_staked: Option<Quantity>,
}

/// One token with the Api it was loaded from.
#[derive(Debug, Clone)]
pub struct Token {
    api: Api,
    info: TokenInfo,
}

impl Token {
    pub async fn load(api: &Api, symbol: &str) -> Result<Self> {
        let symbol = symbol.to_uppercase();
        let info = api
            .find_one_typed::<TokenInfo>("tokens", "tokens", json!({ "symbol": symbol }))
            .await?
            .ok_or(EngineError::TokenDoesNotExist(symbol))?;
        Ok(Self::from_info(api, info))
    }

    pub fn from_info(api: &Api, info: TokenInfo) -> Self {
        Self {
            api: api.clone(),
            info,
        }
    }

    pub fn info(&self) -> &TokenInfo {
        &self.info
    }

    pub fn symbol(&self) -> &str {
        &self.info.symbol
    }

    pub fn precision(&self) -> u32 {
        self.info.precision
    }

    /// `amount` truncated to this token's precision.
    pub fn quantize(&self, amount: &Quantity) -> Quantity {
        amount.quantize(self.info.precision)
    }

    /// `amount` truncated to this token's precision, rejecting amounts that
    /// truncate to zero or below.
    pub fn checked_amount(&self, amount: &Quantity) -> Result<Quantity> {
        let quantized = self.quantize(amount);
        if !quantized.is_positive() {
            return Err(EngineError::InvalidTokenAmount {
                precision: self.info.precision,
            });
        }
        Ok(quantized)
    }

    /// Every balance row holding this token.
    pub async fn get_holder(&self) -> Result<Vec<Value>> {
        self.api
            .find_all("tokens", "balances", json!({ "symbol": self.info.symbol }))
            .await
    }

    pub async fn get_market_info(&self) -> Result<Option<Value>> {
        self.api
            .find_one("market", "metrics", json!({ "symbol": self.info.symbol }))
            .await
    }

    pub async fn get_buy_book(&self) -> Result<Vec<Value>> {
        self.api
            .find_all("market", "buyBook", json!({ "symbol": self.info.symbol }))
            .await
    }

    pub async fn get_sell_book(&self) -> Result<Vec<Value>> {
        self.api
            .find_all("market", "sellBook", json!({ "symbol": self.info.symbol }))
            .await
    }
}

/// Every token defined on the sidechain.
#[derive(Debug, Clone)]
pub struct Tokens {
    api: Api,
    tokens: Vec<TokenInfo>,
}

impl Tokens {
    pub async fn load(api: &Api) -> Result<Self> {
        let mut tokens = Self {
            api: api.clone(),
            tokens: Vec::new(),
        };
        tokens.refresh().await?;
        Ok(tokens)
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.tokens = self
            .api
            .find_all_typed("tokens", "tokens", json!({}))
            .await?;
        tracing::debug!(count = self.tokens.len(), "token list loaded");
        Ok(())
    }

    /// Case-insensitive lookup.
    pub fn get_token(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.symbol.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TokenInfo> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_row_deserializes() {
        let info: TokenInfo = serde_json::from_value(json!({
            "_id": 1,
            "issuer": "null",
            "symbol": "BEE",
            "name": "Hive Engine Token",
            "metadata": "{\"url\":\"https://hive-engine.com\"}",
            "precision": 8,
            "maxSupply": "9007199254740991.00000000",
            "supply": "2000000.00000000",
            "circulatingSupply": "1500000.00000000",
            "stakingEnabled": true,
            "unstakingCooldown": 40,
            "delegationEnabled": true,
            "undelegationCooldown": 7,
            "numberTransactions": 4,
            "totalStaked": "1000.00000000"
        }))
        .unwrap();
        assert_eq!(info.precision, 8);
        assert_eq!(info.supply.to_string(), "2000000.00000000");
        assert_eq!(info.unstaking_cooldown, Some(40));
    }

    #[test]
    fn minimal_token_row() {
        let info: TokenInfo = serde_json::from_value(json!({
            "issuer": "alice",
            "symbol": "TKN",
            "name": "Token",
            "precision": 3,
            "maxSupply": "1000.000",
            "supply": "0",
            "circulatingSupply": "0"
        }))
        .unwrap();
        assert!(!info.staking_enabled);
        assert!(info.total_staked.is_none());
    }
}
