//! The `nftmarket` contract: listing, buying and repricing NFT instances.

use serde_json::{json, Value};

use crate::account::validate_account_name;
use crate::api::Api;
use crate::error::{EngineError, Result};
use crate::nft::market_rows;
use crate::ops::Submitter;
use crate::quantity::Quantity;

#[derive(Debug, Clone)]
pub struct NftMarket {
    api: Api,
    submitter: Submitter,
}

impl NftMarket {
    pub fn new(api: &Api) -> Self {
        Self {
            api: api.clone(),
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

    /// Trades of `symbol`, optionally filtered by price symbol and a
    /// minimum timestamp (unix seconds).
    pub async fn get_trades_history(
        &self,
        symbol: &str,
        price_symbol: Option<&str>,
        since: Option<u64>,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Value>> {
        let mut query = json!({});
        if let Some(price_symbol) = price_symbol {
            query["priceSymbol"] = json!(price_symbol.to_uppercase());
        }
        if let Some(since) = since {
            query["timestamp"] = json!({ "$gte": since });
        }
        market_rows(&self.api, symbol, "tradesHistory", query, limit, offset).await
    }

    /// Open interest of `symbol` on one side, optionally per price symbol.
    pub async fn get_open_interest(
        &self,
        symbol: &str,
        side: &str,
        price_symbol: Option<&str>,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Value>> {
        let mut query = json!({ "side": side });
        if let Some(price_symbol) = price_symbol {
            query["priceSymbol"] = json!(price_symbol.to_uppercase());
        }
        market_rows(&self.api, symbol, "openInterest", query, limit, offset).await
    }

    /// Listed instances of `symbol`, optionally only those of `account`.
    pub async fn get_sell_book(
        &self,
        symbol: &str,
        account: Option<&str>,
        price_symbol: Option<&str>,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Value>> {
        let mut query = json!({});
        if let Some(account) = account {
            query["account"] = json!(account);
        }
        if let Some(price_symbol) = price_symbol {
            query["priceSymbol"] = json!(price_symbol.to_uppercase());
        }
        market_rows(&self.api, symbol, "sellBook", query, limit, offset).await
    }

    /// Buy listed instances; `market_account` receives the market fee.
    pub async fn buy(
        &self,
        account: &str,
        symbol: &str,
        nfts: &[&str],
        market_account: &str,
    ) -> Result<Value> {
        require_ids(nfts)?;
        validate_account_name(market_account)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "nfts": nfts,
            "marketAccount": market_account,
        });
        self.submitter
            .active(account, "nftmarket", "buy", payload)
            .await
    }

    /// List instances at `price` of `price_symbol`; `fee` is in basis points.
    pub async fn sell(
        &self,
        account: &str,
        symbol: &str,
        nfts: &[&str],
        price: &Quantity,
        price_symbol: &str,
        fee: u32,
    ) -> Result<Value> {
        require_ids(nfts)?;
        if fee > 10_000 {
            return Err(EngineError::InvalidArgument(
                "fee must be between 0 and 10000 basis points".into(),
            ));
        }
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "nfts": nfts,
            "price": price.to_string(),
            "priceSymbol": price_symbol.to_uppercase(),
            "fee": fee,
        });
        self.submitter
            .active(account, "nftmarket", "sell", payload)
            .await
    }

    pub async fn cancel(&self, account: &str, symbol: &str, nfts: &[&str]) -> Result<Value> {
        require_ids(nfts)?;
        let payload = json!({ "symbol": symbol.to_uppercase(), "nfts": nfts });
        self.submitter
            .active(account, "nftmarket", "cancel", payload)
            .await
    }

    pub async fn change_price(
        &self,
        account: &str,
        symbol: &str,
        nfts: &[&str],
        price: &Quantity,
    ) -> Result<Value> {
        require_ids(nfts)?;
        let payload = json!({
            "symbol": symbol.to_uppercase(),
            "nfts": nfts,
            "price": price.to_string(),
        });
        self.submitter
            .active(account, "nftmarket", "changePrice", payload)
            .await
    }
}

fn require_ids(nfts: &[&str]) -> Result<()> {
    if nfts.is_empty() {
        return Err(EngineError::InvalidArgument("nfts cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_list_rejected() {
        assert!(require_ids(&[]).is_err());
        assert!(require_ids(&["1", "2"]).is_ok());
    }
}
