//! NFT holdings via the OpenSea API
//!
//! Exposed as the EVM chain `opensea`. Per wallet:
//!
//! 1. Page through the account's NFTs (sequential, cursor-driven, capped
//!    at `max_pages`).
//! 2. Group items by collection.
//! 3. Fetch collection floor prices in fixed-size chunks, at most
//!    `floor_concurrency` chunks in flight.
//! 4. Emit one `type: "nft"` record per collection: balance is the item
//!    count, price is the floor (ETH) times the ETH/USD price.

use async_trait::async_trait;
use futures_util::future::join_all;
use futures_util::TryStreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use super::paginate::{bounded_map, paginate, Page};
use super::{ChainError, ChainSource};
use crate::balance::BalanceRecord;
use crate::config::OpenSeaConfig;
use crate::pricing::PriceBook;
use crate::wallet::{Chain, EvmChain};

/// CoinGecko id of the floor-price currency
const FLOOR_CURRENCY_ID: &str = "ethereum";

/// OpenSea-backed NFT source
pub struct OpenSeaSource {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    page_size: usize,
    max_pages: usize,
    floor_chunk_size: usize,
    floor_concurrency: usize,
    prices: PriceBook,
}

#[derive(Debug, Clone, Deserialize)]
struct Nft {
    collection: String,
    #[serde(default)]
    contract: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NftPage {
    #[serde(default)]
    nfts: Vec<Nft>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionStats {
    total: StatsTotal,
}

#[derive(Debug, Deserialize)]
struct StatsTotal {
    #[serde(default)]
    floor_price: Option<f64>,
}

/// Items of one collection held by a wallet
#[derive(Debug, Clone, PartialEq)]
struct CollectionHolding {
    slug: String,
    count: usize,
    contract: Option<String>,
    image_url: Option<String>,
}

/// Group items by collection slug, in order of first appearance
fn group_by_collection(nfts: Vec<Nft>) -> Vec<CollectionHolding> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut holdings: Vec<CollectionHolding> = Vec::new();

    for nft in nfts {
        match index.get(&nft.collection) {
            Some(&i) => {
                let holding = &mut holdings[i];
                holding.count += 1;
                if holding.image_url.is_none() {
                    holding.image_url = nft.image_url;
                }
            }
            None => {
                index.insert(nft.collection.clone(), holdings.len());
                holdings.push(CollectionHolding {
                    slug: nft.collection,
                    count: 1,
                    contract: nft.contract,
                    image_url: nft.image_url,
                });
            }
        }
    }

    holdings
}

impl CollectionHolding {
    fn record(&self, wallet: &str, floor_eth: f64, eth_usd: f64) -> BalanceRecord {
        let mut record = BalanceRecord::new(wallet, &self.slug, &self.slug, self.count as f64)
            .price(floor_eth * eth_usd)
            .nft();
        record.logo = self.image_url.clone();
        record.address = self.contract.clone();
        record
    }
}

impl OpenSeaSource {
    pub fn new(client: Client, config: &OpenSeaConfig, prices: PriceBook) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
            max_pages: config.max_pages,
            floor_chunk_size: config.floor_chunk_size,
            floor_concurrency: config.floor_concurrency,
            prices,
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ChainError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("X-API-KEY", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChainError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(response.json().await?)
    }

    fn nfts_url(&self, wallet: &str, cursor: Option<&str>) -> String {
        let mut url = format!(
            "{}/api/v2/chain/ethereum/account/{}/nfts?limit={}",
            self.api_url, wallet, self.page_size
        );
        if let Some(cursor) = cursor {
            url.push_str("&next=");
            url.push_str(&urlencoding::encode(cursor));
        }
        url
    }

    async fn fetch_page(&self, wallet: &str, cursor: Option<String>) -> Result<Page<Nft>, ChainError> {
        let page: NftPage = self.get(&self.nfts_url(wallet, cursor.as_deref())).await?;
        Ok(Page {
            items: page.nfts,
            next: page.next,
        })
    }

    async fn list_nfts(&self, wallet: &str) -> Result<Vec<Nft>, ChainError> {
        let pages: Vec<Vec<Nft>> = paginate(self.max_pages, |cursor| self.fetch_page(wallet, cursor))
            .try_collect()
            .await?;
        Ok(pages.into_iter().flatten().collect())
    }

    /// Floor price in ETH; lookup failure counts as no floor
    async fn floor_price(&self, slug: &str) -> f64 {
        let url = format!("{}/api/v2/collections/{}/stats", self.api_url, urlencoding::encode(slug));
        match self.get::<CollectionStats>(&url).await {
            Ok(stats) => stats.total.floor_price.unwrap_or(0.0),
            Err(e) => {
                tracing::warn!(collection = %slug, error = %e, "Floor price lookup failed");
                0.0
            }
        }
    }

    async fn floor_prices(&self, slugs: Vec<String>) -> HashMap<String, f64> {
        let chunks: Vec<Vec<String>> = slugs
            .chunks(self.floor_chunk_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();

        let results = bounded_map(chunks, self.floor_concurrency, |chunk| async move {
            let floors = join_all(chunk.iter().map(|slug| self.floor_price(slug))).await;
            chunk.into_iter().zip(floors).collect::<Vec<_>>()
        })
        .await;

        results.into_iter().flatten().collect()
    }
}

#[async_trait]
impl ChainSource for OpenSeaSource {
    fn chain(&self) -> Chain {
        Chain::Evm(EvmChain::OpenSea)
    }

    async fn balances(&self, wallet: &str) -> Result<Vec<BalanceRecord>, ChainError> {
        let wallet = wallet.to_lowercase();
        let holdings = group_by_collection(self.list_nfts(&wallet).await?);
        if holdings.is_empty() {
            return Ok(Vec::new());
        }

        let slugs = holdings.iter().map(|h| h.slug.clone()).collect();
        let (floors, eth_usd) = tokio::join!(self.floor_prices(slugs), self.prices.price_of(FLOOR_CURRENCY_ID));

        tracing::debug!(wallet = %wallet, collections = holdings.len(), "Fetched NFT holdings");

        Ok(holdings
            .iter()
            .map(|h| {
                let floor = floors.get(&h.slug).copied().unwrap_or(0.0);
                h.record(&wallet, floor, eth_usd)
            })
            .collect())
    }
}
