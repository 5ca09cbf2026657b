//! The order book market and the HIVE / SWAP.HIVE peg.

use serde::Serialize;
use serde_json::{json, Value};

use crate::account::validate_account_name;
use crate::api::{Api, FindOptions};
use crate::error::{EngineError, Result};
use crate::ops::{ContractAction, HiveTransfer, Submitter};
use crate::quantity::Quantity;
use crate::tokens::{Token, Tokens};
use crate::wallet::Wallet;

pub const SWAP_HIVE: &str = "SWAP.HIVE";
/// Account that converts deposited HIVE into SWAP.HIVE.
pub const DEPOSIT_ACCOUNT: &str = "honey-swap";
pub const DEFAULT_BOOK_LIMIT: u32 = 100;
pub const DEFAULT_TRADES_LIMIT: u32 = 30;

/// Memo of a peg deposit; fields serialize in declaration order.
#[derive(Serialize)]
struct PegMemo<'a> {
    id: &'a str,
    json: ContractAction,
}

/// Side of an open order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Buy,
    Sell,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::str::FromStr for OrderType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(EngineError::InvalidArgument(format!(
                "order type must be buy or sell, got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Market {
    api: Api,
    tokens: Tokens,
    metrics: Vec<Value>,
    submitter: Submitter,
}

impl Market {
    pub async fn load(api: &Api) -> Result<Self> {
        let tokens = Tokens::load(api).await?;
        let mut market = Self {
            api: api.clone(),
            tokens,
            metrics: Vec::new(),
            submitter: api.submitter(),
        };
        market.refresh().await?;
        Ok(market)
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn set_id(&mut self, ssc_id: impl Into<String>) {
        self.submitter.set_id(ssc_id);
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.metrics = self.get_metrics().await?;
        Ok(())
    }

    /// Metrics as of the last refresh.
    pub fn metrics(&self) -> &[Value] {
        &self.metrics
    }

    pub async fn get_metrics(&self) -> Result<Vec<Value>> {
        self.api
            .find("market", "metrics", json!({}), &FindOptions::default())
            .await
    }

    pub async fn get_buy_book(
        &self,
        symbol: &str,
        account: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.symbol_table("buyBook", symbol, account, limit, offset)
            .await
    }

    pub async fn get_sell_book(
        &self,
        symbol: &str,
        account: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.symbol_table("sellBook", symbol, account, limit, offset)
            .await
    }

    pub async fn get_trades_history(
        &self,
        symbol: &str,
        account: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.symbol_table("tradesHistory", symbol, account, limit, offset)
            .await
    }

    async fn symbol_table(
        &self,
        table: &str,
        symbol: &str,
        account: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        if self.tokens.get_token(symbol).is_none() {
            return Err(EngineError::TokenDoesNotExist(symbol.to_uppercase()));
        }
        let mut query = json!({ "symbol": symbol.to_uppercase() });
        if let Some(account) = account {
            query["account"] = json!(account);
        }
        let options = FindOptions::default().with_limit(limit).with_offset(offset);
        self.api.find("market", table, query, &options).await
    }

    /// Convert SWAP.HIVE back to HIVE.
    pub async fn withdraw(&self, account: &str, amount: &Quantity) -> Result<Value> {
        let wallet = Wallet::load(&self.api, account).await?;
        wallet.require_balance(SWAP_HIVE, amount)?;
        let quantity = Token::load(&self.api, SWAP_HIVE)
            .await?
            .checked_amount(amount)?;
        self.submitter
            .active(
                account,
                "hivepegged",
                "withdraw",
                json!({ "quantity": quantity.to_string() }),
            )
            .await
    }

    /// Send HIVE to the peg account; it credits SWAP.HIVE on the sidechain.
    pub async fn deposit(&self, account: &str, amount: &Quantity) -> Result<Value> {
        validate_account_name(account)?;
        let hive = amount.quantize(3);
        if !hive.is_positive() {
            return Err(EngineError::InvalidTokenAmount { precision: 3 });
        }
        let memo = serde_json::to_string(&PegMemo {
            id: self.submitter.ssc_id(),
            json: ContractAction::new("hivepegged", "buy", json!({})),
        })?;
        self.submitter
            .transfer(HiveTransfer {
                from: account.to_string(),
                to: DEPOSIT_ACCOUNT.to_string(),
                amount: format!("{hive} HIVE"),
                memo,
            })
            .await
    }

    /// Place a buy order for `amount` of `symbol` at `price` SWAP.HIVE each.
    pub async fn buy(
        &self,
        account: &str,
        amount: &Quantity,
        symbol: &str,
        price: &Quantity,
    ) -> Result<Value> {
        let cost = amount
            .checked_mul(price)
            .ok_or_else(|| EngineError::InvalidQuantity(format!("{amount} * {price}")))?;
        let wallet = Wallet::load(&self.api, account).await?;
        wallet.require_balance(SWAP_HIVE, &cost)?;
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "quantity": quantity.to_string(),
            "price": price.to_string(),
        });
        self.submitter.active(account, "market", "buy", payload).await
    }

    /// Place a sell order for `amount` of `symbol` at `price` SWAP.HIVE each.
    pub async fn sell(
        &self,
        account: &str,
        amount: &Quantity,
        symbol: &str,
        price: &Quantity,
    ) -> Result<Value> {
        let wallet = Wallet::load(&self.api, account).await?;
        wallet.require_balance(symbol, amount)?;
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "quantity": quantity.to_string(),
            "price": price.to_string(),
        });
        self.submitter.active(account, "market", "sell", payload).await
    }

    /// Cancel the open order `order_id` (the transaction id that placed it).
    pub async fn cancel(
        &self,
        account: &str,
        order_type: OrderType,
        order_id: impl Into<Value>,
    ) -> Result<Value> {
        let payload = json!({ "type": order_type.as_str(), "id": order_id.into() });
        self.submitter
            .active(account, "market", "cancel", payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_parsing() {
        assert_eq!("BUY".parse::<OrderType>().unwrap(), OrderType::Buy);
        assert_eq!("sell".parse::<OrderType>().unwrap().as_str(), "sell");
        assert!("hold".parse::<OrderType>().is_err());
    }
}
