//! Errors raised by the Hive Engine API and its domain objects.

use hiveengine_core::TransportError;
use hiveengine_nodes::NodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{symbol} is not in wallet")]
    TokenNotInWallet { symbol: String },

    #[error("only {available} {symbol} available")]
    InsufficientTokenAmount { symbol: String, available: String },

    /// The amount truncates to zero at the token's precision.
    #[error("amount is below token precision of {precision}")]
    InvalidTokenAmount { precision: u32 },

    #[error("{account} is not the issuer of token {symbol}")]
    TokenIssueNotPermitted { account: String, symbol: String },

    #[error("{symbol} has reached its maximum supply of {max_supply}")]
    MaxSupplyReached { symbol: String, max_supply: String },

    #[error("token {0} does not exist")]
    TokenDoesNotExist(String),

    #[error("nft {0} does not exist")]
    NftDoesNotExist(String),

    #[error("invalid account name {name:?}: {reason}")]
    InvalidAccountName { name: String, reason: &'static str },

    #[error("invalid quantity {0:?}")]
    InvalidQuantity(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error("unexpected row shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Nodes(#[from] NodeError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
