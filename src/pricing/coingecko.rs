//! CoinGecko simple-price client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::{PriceOracle, PricingError};

/// Maximum ids per `/simple/price` request
const MAX_IDS_PER_REQUEST: usize = 250;

/// CoinGecko REST client
pub struct CoinGecko {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
}

impl CoinGecko {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn price_url(&self, ids: &[String]) -> String {
        let joined = ids.join(",");
        format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            urlencoding::encode(&joined)
        )
    }

    async fn fetch_chunk(&self, ids: &[String]) -> Result<HashMap<String, f64>, PricingError> {
        let mut request = self.client.get(self.price_url(ids));
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-pro-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PricingError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let body: HashMap<String, SimplePrice> = response.json().await?;
        Ok(body
            .into_iter()
            .filter_map(|(id, price)| price.usd.map(|usd| (id, usd)))
            .collect())
    }
}

#[async_trait]
impl PriceOracle for CoinGecko {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, PricingError> {
        let mut prices = HashMap::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            prices.extend(self.fetch_chunk(chunk).await?);
        }
        Ok(prices)
    }
}
