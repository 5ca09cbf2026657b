//! Token balances of one account and the actions that move them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::account::validate_account_name;
use crate::api::{Api, FindOptions};
use crate::error::{EngineError, Result};
use crate::ops::Submitter;
use crate::quantity::Quantity;
use crate::tokens::Token;

/// A row of `tokens.balances`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub account: String,
    pub symbol: String,
    pub balance: Quantity,
    #[serde(default)]
    pub stake: Option<Quantity>,
    #[serde(default)]
    pub pending_unstake: Option<Quantity>,
    #[serde(default)]
    pub delegations_in: Option<Quantity>,
    #[serde(default)]
    pub delegations_out: Option<Quantity>,
    #[serde(default)]
    pub pending_undelegations: Option<Quantity>,
}

#[derive(Debug, Clone)]
pub struct Wallet {
    api: Api,
    account: String,
    balances: Vec<Balance>,
    submitter: Submitter,
}

impl Wallet {
    pub async fn load(api: &Api, account: &str) -> Result<Self> {
        validate_account_name(account)?;
        let mut wallet = Self {
            api: api.clone(),
            account: account.to_string(),
            balances: Vec::new(),
            submitter: api.submitter(),
        };
        wallet.refresh().await?;
        Ok(wallet)
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = submitter;
        self
    }

    /// Override the sidechain id (default `ssc-mainnet-hive`).
    pub fn set_id(&mut self, ssc_id: impl Into<String>) {
        self.submitter.set_id(ssc_id);
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.balances = self.get_balances().await?;
        Ok(())
    }

    pub async fn get_balances(&self) -> Result<Vec<Balance>> {
        self.api
            .find_typed(
                "tokens",
                "balances",
                json!({ "account": self.account }),
                &FindOptions::default(),
            )
            .await
    }

    pub async fn change_account(&mut self, account: &str) -> Result<()> {
        validate_account_name(account)?;
        self.account = account.to_string();
        self.refresh().await
    }

    /// Balance of `symbol`, case-insensitive.
    pub fn get_token(&self, symbol: &str) -> Option<&Balance> {
        self.balances
            .iter()
            .find(|b| b.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Balance of `symbol` holding at least `amount`.
    pub(crate) fn require_balance(&self, symbol: &str, amount: &Quantity) -> Result<&Balance> {
        let held = self
            .get_token(symbol)
            .ok_or_else(|| EngineError::TokenNotInWallet {
                symbol: symbol.to_uppercase(),
            })?;
        if held.balance < *amount {
            return Err(EngineError::InsufficientTokenAmount {
                symbol: held.symbol.clone(),
                available: held.balance.to_string(),
            });
        }
        Ok(held)
    }

    pub async fn transfer(
        &self,
        to: &str,
        amount: &Quantity,
        symbol: &str,
        memo: &str,
    ) -> Result<Value> {
        self.require_balance(symbol, amount)?;
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;
        validate_account_name(to)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "to": to,
            "quantity": quantity.to_string(),
            "memo": memo,
        });
        self.submitter
            .active(&self.account, "tokens", "transfer", payload)
            .await
    }

    /// Stake to `receiver`, or to this account when `None`.
    pub async fn stake(
        &self,
        amount: &Quantity,
        symbol: &str,
        receiver: Option<&str>,
    ) -> Result<Value> {
        self.require_balance(symbol, amount)?;
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;
        let to = match receiver {
            Some(receiver) => {
                validate_account_name(receiver)?;
                receiver
            }
            None => self.account.as_str(),
        };
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "to": to,
            "quantity": quantity.to_string(),
        });
        self.submitter
            .active(&self.account, "tokens", "stake", payload)
            .await
    }

    pub async fn unstake(&self, amount: &Quantity, symbol: &str) -> Result<Value> {
        let held = self
            .get_token(symbol)
            .ok_or_else(|| EngineError::TokenNotInWallet {
                symbol: symbol.to_uppercase(),
            })?;
        let staked = held.stake.ok_or_else(|| EngineError::InsufficientTokenAmount {
            symbol: held.symbol.clone(),
            available: "no stake".into(),
        })?;
        if staked < *amount {
            return Err(EngineError::InsufficientTokenAmount {
                symbol: held.symbol.clone(),
                available: format!("{staked} staked"),
            });
        }
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "quantity": quantity.to_string(),
        });
        self.submitter
            .active(&self.account, "tokens", "unstake", payload)
            .await
    }

    /// Cancel the unstake started in transaction `trx_id`.
    pub async fn cancel_unstake(&self, trx_id: &str) -> Result<Value> {
        self.submitter
            .active(&self.account, "tokens", "cancelUnstake", json!({ "txID": trx_id }))
            .await
    }

    /// Issue new tokens; only the token issuer may do this.
    pub async fn issue(&self, to: &str, amount: &Quantity, symbol: &str) -> Result<Value> {
        let token = Token::load(&self.api, symbol).await?;
        let info = token.info();
        if info.issuer != self.account {
            return Err(EngineError::TokenIssueNotPermitted {
                account: self.account.clone(),
                symbol: info.symbol.clone(),
            });
        }
        if info.max_supply == info.supply {
            return Err(EngineError::MaxSupplyReached {
                symbol: info.symbol.clone(),
                max_supply: info.max_supply.to_string(),
            });
        }
        let quantity = token.checked_amount(amount)?;
        validate_account_name(to)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "to": to,
            "quantity": quantity.to_string(),
        });
        self.submitter
            .active(&self.account, "tokens", "issue", payload)
            .await
    }

    /// Delegate staked tokens to `to`.
    pub async fn delegate(&self, to: &str, amount: &Quantity, symbol: &str) -> Result<Value> {
        let held = self
            .get_token(symbol)
            .ok_or_else(|| EngineError::TokenNotInWallet {
                symbol: symbol.to_uppercase(),
            })?;
        let staked = held.stake.unwrap_or(Quantity::ZERO);
        if staked < *amount {
            return Err(EngineError::InsufficientTokenAmount {
                symbol: held.symbol.clone(),
                available: format!("{staked} staked"),
            });
        }
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;
        validate_account_name(to)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "to": to,
            "quantity": quantity.to_string(),
        });
        self.submitter
            .active(&self.account, "tokens", "delegate", payload)
            .await
    }

    /// Take back a delegation previously made to `from`.
    pub async fn undelegate(&self, from: &str, amount: &Quantity, symbol: &str) -> Result<Value> {
        self.get_token(symbol)
            .ok_or_else(|| EngineError::TokenNotInWallet {
                symbol: symbol.to_uppercase(),
            })?;
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;
        validate_account_name(from)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "from": from,
            "quantity": quantity.to_string(),
        });
        self.submitter
            .active(&self.account, "tokens", "undelegate", payload)
            .await
    }

    pub async fn get_history(&self, symbol: &str, limit: u32, offset: u32) -> Result<Vec<Value>> {
        self.api.get_history(&self.account, symbol, limit, offset).await
    }

    /// Open buy orders of this account, optionally for one token.
    pub async fn get_buy_book(
        &self,
        symbol: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.book("buyBook", symbol, limit, offset).await
    }

    /// Open sell orders of this account, optionally for one token.
    pub async fn get_sell_book(
        &self,
        symbol: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        self.book("sellBook", symbol, limit, offset).await
    }

    async fn book(
        &self,
        table: &str,
        symbol: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        let mut query = json!({ "account": self.account });
        if let Some(symbol) = symbol {
            query["symbol"] = json!(symbol.to_uppercase());
        }
        let options = FindOptions::default().with_limit(limit).with_offset(offset);
        self.api.find("market", table, query, &options).await
    }
}
