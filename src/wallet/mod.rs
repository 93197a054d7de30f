//! Wallet Registry
//!
//! Tracks the wallets a user has connected and derives the per-chain
//! address queries the dashboard fetches.
//!
//! ## Components
//!
//! - **types**: `Wallet`, `Chain` and family tagged unions
//! - **identify**: address family detection (hex / bech32 / base58)
//! - **registry**: the `WalletRegistry` state container
//! - **store**: persistence port (`WalletStore`) and its implementations
//! - **query**: address-by-chain grouping

mod identify;
mod query;
mod registry;
mod store;
mod types;

pub use identify::{identify_address, rebech32};
pub use query::{address_queries, ChainQuery};
pub use registry::{AddOutcome, WalletDraft, WalletRegistry};
pub use store::{JsonFileStore, MemoryStore, WalletStore, WALLETS_KEY};
pub use types::{normalize_address, Chain, ChainFamily, CosmosChain, EvmChain, Wallet};

use thiserror::Error;

/// Errors raised by wallet registration and persistence
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Unrecognized wallet address: {0}")]
    InvalidAddress(String),

    #[error("Unknown network for this wallet type: {0}")]
    UnknownNetwork(String),

    #[error("Wallet store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Store(err.to_string())
    }
}
