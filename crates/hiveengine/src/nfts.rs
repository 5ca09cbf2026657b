//! Every NFT defined on the sidechain.

use serde_json::json;

use crate::api::Api;
use crate::error::Result;
use crate::nft::{Nft, NftInfo};

#[derive(Debug, Clone)]
pub struct Nfts {
    api: Api,
    nfts: Vec<NftInfo>,
}

impl Nfts {
    pub async fn load(api: &Api) -> Result<Self> {
        let mut nfts = Self {
            api: api.clone(),
            nfts: Vec::new(),
        };
        nfts.refresh().await?;
        Ok(nfts)
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.nfts = self.api.find_all_typed("nft", "nfts", json!({})).await?;
        tracing::debug!(count = self.nfts.len(), "nft list loaded");
        Ok(())
    }

    pub fn get_symbol_list(&self) -> Vec<&str> {
        self.nfts.iter().map(|n| n.symbol.as_str()).collect()
    }

    /// Case-insensitive lookup, bound to this list's Api.
    pub fn get_nft(&self, symbol: &str) -> Option<Nft> {
        self.nfts
            .iter()
            .find(|n| n.symbol.eq_ignore_ascii_case(symbol))
            .map(|info| Nft::from_info(&self.api, info.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NftInfo> {
        self.nfts.iter()
    }

    pub fn len(&self) -> usize {
        self.nfts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nfts.is_empty()
    }
}
