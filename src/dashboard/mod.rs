//! Dashboard Orchestration
//!
//! Turns the wallet registry into a [`Portfolio`]:
//!
//! 1. Snapshot the registry
//! 2. Group addresses into one [`ChainQuery`] per chain
//! 3. Fetch every query concurrently through a [`BalanceSource`]
//! 4. Aggregate the results
//!
//! A failed query is logged and contributes nothing; the remaining chains
//! still make it into the portfolio.

mod source;

pub use source::{HttpSource, LocalSource};

use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;
use thiserror::Error;

use crate::aggregate::Portfolio;
use crate::balance::BalanceRecord;
use crate::wallet::{address_queries, ChainQuery, WalletRegistry};

/// Where per-chain balances come from
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Priced balance records for every address in `query`
    async fn fetch(&self, query: &ChainQuery) -> Result<Vec<BalanceRecord>, FetchError>;
}

/// Errors from balance sources
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Balance API error {status}: {message}")]
    Api { status: u16, message: String },
}

/// Builds portfolios from the registered wallets
pub struct Dashboard {
    registry: Arc<WalletRegistry>,
    source: Arc<dyn BalanceSource>,
}

impl Dashboard {
    pub fn new(registry: Arc<WalletRegistry>, source: Arc<dyn BalanceSource>) -> Self {
        Self { registry, source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch every chain and aggregate the result
    pub async fn refresh(&self) -> Portfolio {
        let wallets = self.registry.snapshot().await;
        if wallets.is_empty() {
            return Portfolio::empty();
        }

        let queries = address_queries(&wallets);
        let fetches = queries.iter().map(|query| self.fetch_or_empty(query));
        let results = join_all(fetches).await;

        let portfolio = Portfolio::from_sources(results, wallets.len());
        tracing::info!(
            wallets = wallets.len(),
            chains = queries.len(),
            tokens = portfolio.tokens.len(),
            net_worth = portfolio.net_worth,
            "Refreshed portfolio"
        );
        portfolio
    }

    async fn fetch_or_empty(&self, query: &ChainQuery) -> Vec<BalanceRecord> {
        match self.source.fetch(query).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    source = self.source.name(),
                    chain = %query.chain,
                    error = %e,
                    "Chain fetch failed, skipping"
                );
                Vec::new()
            }
        }
    }
}
