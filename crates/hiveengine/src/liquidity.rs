//! Liquidity pools of the `marketpools` contract.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::api::{Api, FindOptions};
use crate::error::{EngineError, Result};
use crate::ops::Submitter;
use crate::quantity::Quantity;
use crate::tokens::Token;
use crate::wallet::Wallet;

/// A `BASE:QUOTE` token pair, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenPair {
    pub base: String,
    pub quote: String,
}

impl FromStr for TokenPair {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        match upper.split(':').collect::<Vec<_>>().as_slice() {
            [base, quote] if !base.is_empty() && !quote.is_empty() => Ok(Self {
                base: base.to_string(),
                quote: quote.to_string(),
            }),
            _ => Err(EngineError::InvalidArgument(format!(
                "token pair must be in the format 'TOKEN1:TOKEN2', got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.base, self.quote)
    }
}

/// How `swap_tokens` interprets its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeType {
    /// Spend exactly the amount; `min_amount_out` bounds the proceeds.
    ExactInput,
    /// Receive exactly the amount; `max_amount_in` bounds the cost.
    ExactOutput,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactInput => "exactInput",
            Self::ExactOutput => "exactOutput",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LiquidityPool {
    api: Api,
    pools: Vec<Value>,
    submitter: Submitter,
}

impl LiquidityPool {
    pub async fn load(api: &Api) -> Result<Self> {
        let mut pool = Self {
            api: api.clone(),
            pools: Vec::new(),
            submitter: api.submitter(),
        };
        pool.refresh().await?;
        Ok(pool)
    }

    pub fn with_submitter(mut self, submitter: Submitter) -> Self {
        self.submitter = submitter;
        self
    }

    pub fn set_id(&mut self, ssc_id: impl Into<String>) {
        self.submitter.set_id(ssc_id);
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.pools = self.get_pools().await?;
        Ok(())
    }

    /// Pools as of the last refresh.
    pub fn pools(&self) -> &[Value] {
        &self.pools
    }

    pub async fn get_pools(&self) -> Result<Vec<Value>> {
        self.api
            .find("marketpools", "pools", json!({}), &FindOptions::default())
            .await
    }

    pub async fn get_pool(&self, pair: &TokenPair) -> Result<Option<Value>> {
        self.api
            .find_one("marketpools", "pools", json!({ "tokenPair": pair.to_string() }))
            .await
    }

    pub async fn get_liquidity_positions(
        &self,
        account: Option<&str>,
        pair: Option<&TokenPair>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>> {
        let mut query = json!({});
        if let Some(account) = account {
            query["account"] = json!(account);
        }
        if let Some(pair) = pair {
            query["tokenPair"] = json!(pair.to_string());
        }
        let options = FindOptions::default().with_limit(limit).with_offset(offset);
        self.api
            .find("marketpools", "liquidityPositions", query, &options)
            .await
    }

    pub async fn create_pool(&self, account: &str, pair: &TokenPair) -> Result<Value> {
        self.submitter
            .active(
                account,
                "marketpools",
                "createPool",
                json!({ "tokenPair": pair.to_string() }),
            )
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn swap_tokens(
        &self,
        account: &str,
        pair: &TokenPair,
        symbol: &str,
        amount: &Quantity,
        trade_type: TradeType,
        min_amount_out: Option<&Quantity>,
        max_amount_in: Option<&Quantity>,
    ) -> Result<Value> {
        let wallet = Wallet::load(&self.api, account).await?;
        match trade_type {
            TradeType::ExactInput => {
                wallet.require_balance(symbol, amount)?;
            }
            TradeType::ExactOutput => {
                wallet.get_token(symbol).ok_or_else(|| EngineError::TokenNotInWallet {
                    symbol: symbol.to_uppercase(),
                })?;
            }
        }
        let quantity = Token::load(&self.api, symbol).await?.checked_amount(amount)?;

        let mut payload = json!({
            "tokenPair": pair.to_string(),
            "tokenSymbol": symbol.to_uppercase(),
            "tokenAmount": quantity.to_string(),
            "tradeType": trade_type.as_str(),
        });
        match (trade_type, min_amount_out, max_amount_in) {
            (TradeType::ExactInput, Some(min_out), _) => {
                payload["minAmountOut"] = json!(min_out.to_string());
            }
            (TradeType::ExactOutput, _, Some(max_in)) => {
                payload["maxAmountIn"] = json!(max_in.to_string());
            }
            _ => {}
        }
        self.submitter
            .active(account, "marketpools", "swapTokens", payload)
            .await
    }

    pub async fn add_liquidity(
        &self,
        account: &str,
        pair: &TokenPair,
        base_quantity: &Quantity,
        quote_quantity: &Quantity,
        max_price_impact: Option<&Quantity>,
        max_deviation: Option<&Quantity>,
    ) -> Result<Value> {
        let wallet = Wallet::load(&self.api, account).await?;
        wallet.require_balance(&pair.base, base_quantity)?;
        wallet.require_balance(&pair.quote, quote_quantity)?;

        let mut payload = json!({
            "tokenPair": pair.to_string(),
            "baseQuantity": base_quantity.to_string(),
            "quoteQuantity": quote_quantity.to_string(),
        });
        if let Some(impact) = max_price_impact {
            payload["maxPriceImpact"] = json!(impact.to_string());
        }
        if let Some(deviation) = max_deviation {
            payload["maxDeviation"] = json!(deviation.to_string());
        }
        self.submitter
            .active(account, "marketpools", "addLiquidity", payload)
            .await
    }

    /// Withdraw `shares_out` percent (0 < shares_out <= 100) of a position.
    pub async fn remove_liquidity(
        &self,
        account: &str,
        pair: &TokenPair,
        shares_out: &Quantity,
    ) -> Result<Value> {
        if !shares_out.is_positive() || *shares_out > Quantity::from(100u32) {
            return Err(EngineError::InvalidArgument(
                "shares_out must be a percentage > 0 and <= 100".into(),
            ));
        }
        let payload = json!({
            "tokenPair": pair.to_string(),
            "sharesOut": shares_out.to_string(),
        });
        self.submitter
            .active(account, "marketpools", "removeLiquidity", payload)
            .await
    }

    /// Reward liquidity providers of `pair` with `mined_token` by lottery.
    pub async fn create_reward_pool(
        &self,
        account: &str,
        pair: &TokenPair,
        lottery_winners: u32,
        lottery_interval_hours: u32,
        lottery_amount: &Quantity,
        mined_token: &str,
    ) -> Result<Value> {
        if !(1..=20).contains(&lottery_winners) {
            return Err(EngineError::InvalidArgument(
                "lottery_winners must be between 1 and 20".into(),
            ));
        }
        if !(1..=720).contains(&lottery_interval_hours) {
            return Err(EngineError::InvalidArgument(
                "lottery_interval_hours must be between 1 and 720".into(),
            ));
        }
        let payload = json!({
            "tokenPair": pair.to_string(),
            "lotteryWinners": lottery_winners,
            "lotteryIntervalHours": lottery_interval_hours,
            "lotteryAmount": lottery_amount.to_string(),
            "minedToken": mined_token.to_uppercase(),
        });
        self.submitter
            .active(account, "marketpools", "createRewardPool", payload)
            .await
    }

    pub async fn set_reward_pool_active(
        &self,
        account: &str,
        pair: &TokenPair,
        mined_token: &str,
        active: bool,
    ) -> Result<Value> {
        let payload = json!({
            "tokenPair": pair.to_string(),
            "minedToken": mined_token.to_uppercase(),
            "active": active,
        });
        self.submitter
            .active(account, "marketpools", "setRewardPoolActive", payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_pair_parsing() {
        let pair: TokenPair = "swap.hive:bee".parse().unwrap();
        assert_eq!(pair.base, "SWAP.HIVE");
        assert_eq!(pair.quote, "BEE");
        assert_eq!(pair.to_string(), "SWAP.HIVE:BEE");

        for bad in ["BEE", "A:B:C", ":BEE", "BEE:", ""] {
            assert!(bad.parse::<TokenPair>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn trade_type_names() {
        assert_eq!(TradeType::ExactInput.as_str(), "exactInput");
        assert_eq!(TradeType::ExactOutput.as_str(), "exactOutput");
    }
}
