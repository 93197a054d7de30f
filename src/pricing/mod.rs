//! Price Oracles
//!
//! USD price lookup for balance records, batched by token id.
//!
//! - [`CoinGecko`]: primary oracle, keyed by CoinGecko id
//! - [`CoinMarketCap`]: secondary oracle, keyed by numeric CMC id
//!
//! Lookup failures never surface to callers: a failed oracle contributes
//! an empty price map and the affected records are priced at zero.

mod coingecko;
mod coinmarketcap;

pub use coingecko::CoinGecko;
pub use coinmarketcap::CoinMarketCap;

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::balance::BalanceRecord;

/// A source of USD prices
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// USD prices for the given ids; ids the oracle does not know are
    /// simply absent from the result
    async fn prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, PricingError>;
}

/// Errors from price oracles
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Parse(String),
}

/// The oracles used to price balance records
#[derive(Clone)]
pub struct PriceBook {
    coingecko: Arc<dyn PriceOracle>,
    coinmarketcap: Option<Arc<dyn PriceOracle>>,
}

impl PriceBook {
    pub fn new(coingecko: Arc<dyn PriceOracle>, coinmarketcap: Option<Arc<dyn PriceOracle>>) -> Self {
        Self {
            coingecko,
            coinmarketcap,
        }
    }

    /// Query an oracle, turning failure into an empty map
    async fn lookup(oracle: &dyn PriceOracle, ids: &[String]) -> HashMap<String, f64> {
        if ids.is_empty() {
            return HashMap::new();
        }

        match oracle.prices(ids).await {
            Ok(prices) => {
                tracing::debug!(oracle = oracle.name(), requested = ids.len(), found = prices.len(), "Fetched prices");
                prices
            }
            Err(e) => {
                tracing::warn!(oracle = oracle.name(), error = %e, "Price lookup failed, pricing at zero");
                HashMap::new()
            }
        }
    }

    /// USD price of a single CoinGecko id, zero when unavailable
    pub async fn price_of(&self, coin_gecko_id: &str) -> f64 {
        let ids = [coin_gecko_id.to_string()];
        Self::lookup(self.coingecko.as_ref(), &ids)
            .await
            .get(coin_gecko_id)
            .copied()
            .unwrap_or(0.0)
    }

    /// Fill in the price of every record that does not have one yet
    ///
    /// CoinGecko id wins over CoinMarketCap id; records with neither, or
    /// whose lookup failed, get a zero price.
    pub async fn enrich(&self, records: &mut [BalanceRecord]) {
        let pending = || records.iter().filter(|r| r.price.is_none());

        let gecko_ids: Vec<String> = pending()
            .filter_map(|r| r.coin_gecko_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let cmc_ids: Vec<String> = pending()
            .filter(|r| r.coin_gecko_id.is_none())
            .filter_map(|r| r.coin_market_cap_id.map(|id| id.to_string()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let gecko_lookup = Self::lookup(self.coingecko.as_ref(), &gecko_ids);
        let cmc_lookup = async {
            match &self.coinmarketcap {
                Some(oracle) => Self::lookup(oracle.as_ref(), &cmc_ids).await,
                None => HashMap::new(),
            }
        };
        let (gecko_prices, cmc_prices) = tokio::join!(gecko_lookup, cmc_lookup);

        for record in records.iter_mut().filter(|r| r.price.is_none()) {
            let price = if let Some(id) = &record.coin_gecko_id {
                gecko_prices.get(id).copied()
            } else if let Some(id) = record.coin_market_cap_id {
                cmc_prices.get(&id.to_string()).copied()
            } else {
                None
            };
            record.price = Some(price.unwrap_or(0.0));
        }
    }
}
