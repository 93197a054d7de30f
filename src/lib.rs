//! # Netfolio
//!
//! Multi-chain crypto portfolio tracking: per-chain balance endpoints,
//! USD price enrichment, a wallet registry and a portfolio aggregator.
//!
//! ## Features
//!
//! - **Multi-chain balances**: EVM (Ethereum, BNB Chain, Polygon, Klaytn),
//!   Cosmos-SDK (Cosmos Hub, Osmosis), Solana and OpenSea NFTs
//! - **Price enrichment**: CoinGecko with CoinMarketCap fallback
//! - **Wallet registry**: address identification, network merging,
//!   JSON file persistence
//! - **Aggregation**: per-token net worth across wallets and chains
//!
//! ## Modules
//!
//! - [`balance`]: The balance record shared by every chain
//! - [`aggregate`]: Grouping records into ranked token entries
//! - [`wallet`]: Wallet types, identification and the registry
//! - [`pricing`]: Price oracles
//! - [`chains`]: Per-chain balance sources
//! - [`dashboard`]: Portfolio refresh over the registry
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netfolio::chains::ChainRegistry;
//! use netfolio::config::Config;
//! use netfolio::dashboard::{Dashboard, LocalSource};
//! use netfolio::wallet::{MemoryStore, WalletDraft, WalletRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chains = Arc::new(ChainRegistry::from_config(&Config::default())?);
//!     let wallets = Arc::new(WalletRegistry::empty(Arc::new(MemoryStore::new())));
//!
//!     wallets
//!         .add(WalletDraft::new("0xd8da6bf26964af9d7eed9e03e53415d37aa96045").network("ethereum"))
//!         .await?;
//!
//!     let dashboard = Dashboard::new(wallets, Arc::new(LocalSource::new(chains)));
//!     let portfolio = dashboard.refresh().await;
//!
//!     println!("Net worth: ${:.2}", portfolio.net_worth);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod balance;
pub mod chains;
pub mod config;
pub mod dashboard;
pub mod pricing;
pub mod wallet;
