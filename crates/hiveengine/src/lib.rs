//! hiveengine: a client for the Hive Engine sidechain.
//!
//! # Overview
//!
//! [`Api`] talks JSON-RPC to a pool of Hive Engine nodes and exposes the
//! `blockchain` and `contracts` endpoints: block info, `find`, `findOne`
//! and [`Api::find_all`], which pages through a whole table on `_id`.
//! On top of it sit wrappers for the main contracts:
//!
//! - [`Token`] / [`Tokens`]: token definitions
//! - [`Wallet`]: balances and token actions of one account
//! - [`Market`]: order book and the HIVE peg
//! - [`LiquidityPool`]: `marketpools` swaps and liquidity
//! - [`Nft`] / [`Nfts`] / [`Collection`] / [`NftMarket`]: NFTs
//!
//! Actions never sign. They build a `custom_json` operation and hand it to a
//! [`Broadcaster`]; the default [`DryRunBroadcaster`] only records it.
//!
//! # Quick start
//! ```rust,no_run
//! use hiveengine::{Api, Wallet};
//!
//! # async fn run() -> hiveengine::Result<()> {
//! let api = Api::discover().await?;
//! let block = api.get_latest_block_info().await?;
//! let wallet = Wallet::load(&api, "alice").await?;
//! println!("block {} / {} balances", block["blockNumber"], wallet.balances().len());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod api;
pub mod collection;
pub mod config;
pub mod error;
pub mod liquidity;
pub mod market;
pub mod nft;
pub mod nftmarket;
pub mod nfts;
pub mod ops;
pub mod quantity;
pub mod tokens;
pub mod wallet;

pub use account::validate_account_name;
pub use api::{Api, ApiBuilder, FindOptions};
pub use collection::{Collection, NftRef};
pub use config::ApiConfig;
pub use error::{EngineError, Result};
pub use liquidity::{LiquidityPool, TokenPair, TradeType};
pub use market::{Market, OrderType};
pub use nft::{IssueOptions, Nft, NftInfo, PartyType, PropertyOptions};
pub use nftmarket::NftMarket;
pub use nfts::Nfts;
pub use ops::{
    Broadcaster, ContractAction, CustomJson, DryRunBroadcaster, HiveTransfer, Submitter,
    SSC_MAINNET_ID,
};
pub use quantity::Quantity;
pub use tokens::{Token, TokenInfo, Tokens};
pub use wallet::{Balance, Wallet};

pub use hiveengine_core::{Cond, Query};
