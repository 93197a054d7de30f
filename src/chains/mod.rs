//! Chain Balance Sources
//!
//! One [`ChainSource`] per supported chain, all behind a [`ChainRegistry`]
//! that answers the per-chain balance endpoint.
//!
//! ## Sources
//!
//! - [`EvmSource`]: JSON-RPC nodes for ethereum, bnb, polygon and klaytn
//! - [`CosmosSource`]: LCD REST endpoints for cosmos-hub and osmosis
//! - [`SolanaSource`]: Solana JSON-RPC
//! - [`OpenSeaSource`]: NFT holdings, exposed as the EVM chain `opensea`
//!
//! ## Failure model
//!
//! Fetches are fail-open: a wallet whose fetch fails contributes no
//! records, and an unsupported chain yields an empty list. Neither is
//! distinguishable from an empty wallet by the caller.

mod cosmos;
mod evm;
mod nft;
pub mod paginate;
mod rpc;
mod solana;
pub mod tokens;

pub use cosmos::CosmosSource;
pub use evm::EvmSource;
pub use nft::OpenSeaSource;
pub use rpc::JsonRpcClient;
pub use solana::{SolanaSource, TOKEN_PROGRAM_ID};

use async_trait::async_trait;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::balance::BalanceRecord;
use crate::config::Config;
use crate::pricing::{CoinGecko, CoinMarketCap, PriceBook, PriceOracle};
use crate::wallet::{normalize_address, Chain, CosmosChain, EvmChain};

/// Balances of one chain
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// The chain this source answers for
    fn chain(&self) -> Chain;

    /// Unpriced balance records held by `wallet`
    async fn balances(&self, wallet: &str) -> Result<Vec<BalanceRecord>, ChainError>;
}

/// Errors from chain sources
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Parse(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Split a comma-separated address list
///
/// Blank entries are dropped and duplicates removed; EVM and Cosmos
/// addresses are lowercased, Solana addresses are kept verbatim.
pub fn parse_addresses(chain: Chain, addresses: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for address in addresses.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        let address = normalize_address(chain.family(), address);
        if !seen.contains(&address) {
            seen.push(address);
        }
    }
    seen
}

/// All configured chain sources plus the price book used to enrich their
/// records
pub struct ChainRegistry {
    sources: HashMap<Chain, Arc<dyn ChainSource>>,
    prices: PriceBook,
}

impl ChainRegistry {
    pub fn new(prices: PriceBook) -> Self {
        Self {
            sources: HashMap::new(),
            prices,
        }
    }

    /// Register a source, replacing any previous source for its chain
    pub fn register(mut self, source: Arc<dyn ChainSource>) -> Self {
        self.sources.insert(source.chain(), source);
        self
    }

    pub fn supports(&self, chain: Chain) -> bool {
        self.sources.contains_key(&chain)
    }

    /// Chains with a registered source, in canonical order
    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.sources.keys().copied().collect();
        chains.sort();
        chains
    }

    /// Priced balance records of every address on `chain`
    ///
    /// Wallets are fetched concurrently. A failing wallet is logged and
    /// contributes nothing; a chain without a source yields `[]`.
    pub async fn fetch(&self, chain: Chain, addresses: &[String]) -> Vec<BalanceRecord> {
        let Some(source) = self.sources.get(&chain) else {
            tracing::debug!(chain = %chain, "No source registered");
            return Vec::new();
        };

        let fetches = addresses.iter().map(|address| {
            let source = source.clone();
            async move {
                match source.balances(address).await {
                    Ok(records) => records,
                    Err(e) => {
                        tracing::warn!(chain = %chain, wallet = %address, error = %e, "Balance fetch failed");
                        Vec::new()
                    }
                }
            }
        });

        let mut records: Vec<BalanceRecord> = join_all(fetches).await.into_iter().flatten().collect();
        self.prices.enrich(&mut records).await;

        tracing::debug!(chain = %chain, wallets = addresses.len(), records = records.len(), "Fetched balances");
        records
    }

    /// Resolve the `/api/{family}/{chain}/{addresses}` path segments
    ///
    /// Unknown families, unknown chains and chains without a source all
    /// answer `[]`.
    pub async fn fetch_path(&self, family: &str, chain: &str, addresses: &str) -> Vec<BalanceRecord> {
        match Chain::from_path(family, chain) {
            Some(chain) => {
                let addresses = parse_addresses(chain, addresses);
                self.fetch(chain, &addresses).await
            }
            None => {
                tracing::debug!(family = %family, chain = %chain, "Unsupported chain requested");
                Vec::new()
            }
        }
    }

    /// Build every source the configuration enables
    ///
    /// Chains whose endpoint is blank are skipped.
    pub fn from_config(config: &Config) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .build()?;

        let coingecko: Arc<dyn PriceOracle> = Arc::new(CoinGecko::new(
            client.clone(),
            &config.pricing.coingecko_url,
            config.pricing.coingecko_api_key.clone(),
        ));
        let coinmarketcap = config.pricing.coinmarketcap_api_key.as_ref().map(|key| {
            Arc::new(CoinMarketCap::new(client.clone(), &config.pricing.coinmarketcap_url, key))
                as Arc<dyn PriceOracle>
        });
        let prices = PriceBook::new(coingecko, coinmarketcap);

        let token_dir = config.chains.token_list_dir.as_deref().map(std::path::Path::new);
        let mut registry = Self::new(prices.clone());

        for &evm in EvmChain::all() {
            if evm == EvmChain::OpenSea {
                continue;
            }
            let Some(url) = config.chains.evm_rpc(evm).filter(|u| !u.is_empty()) else {
                continue;
            };
            let chain = Chain::Evm(evm);
            let Some(currency) = tokens::native_currency(chain) else {
                continue;
            };
            let source = EvmSource::new(
                evm,
                JsonRpcClient::new(client.clone(), url),
                currency,
                tokens::load_tokens(chain, token_dir)?,
            );
            registry = registry.register(Arc::new(source));
        }

        for &cosmos in CosmosChain::all() {
            let Some(url) = config.chains.cosmos_lcd(cosmos).filter(|u| !u.is_empty()) else {
                continue;
            };
            let Some(currency) = tokens::native_currency(Chain::CosmosSdk(cosmos)) else {
                continue;
            };
            registry = registry.register(Arc::new(CosmosSource::new(cosmos, client.clone(), url, currency)));
        }

        if !config.chains.solana_rpc.is_empty() {
            if let Some(currency) = tokens::native_currency(Chain::Solana) {
                let source = SolanaSource::new(
                    JsonRpcClient::new(client.clone(), &config.chains.solana_rpc),
                    currency,
                    tokens::load_tokens(Chain::Solana, token_dir)?,
                );
                registry = registry.register(Arc::new(source));
            }
        }

        if config.opensea.enabled {
            registry = registry.register(Arc::new(OpenSeaSource::new(client, &config.opensea, prices)));
        }

        tracing::info!(chains = ?registry.chains().iter().map(|c| c.to_string()).collect::<Vec<_>>(), "Chain sources ready");
        Ok(registry)
    }
}
