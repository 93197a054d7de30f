//! CoinMarketCap quotes client
//!
//! Only used for tokens without a CoinGecko listing (Klaytn ecosystem
//! mostly). Requires an API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use super::{PriceOracle, PricingError};

/// CoinMarketCap REST client
pub struct CoinMarketCap {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    data: HashMap<String, QuoteEntry>,
}

#[derive(Debug, Deserialize)]
struct QuoteEntry {
    quote: HashMap<String, Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    price: Option<f64>,
}

impl CoinMarketCap {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn parse(body: QuotesResponse) -> HashMap<String, f64> {
        body.data
            .into_iter()
            .filter_map(|(id, entry)| {
                entry
                    .quote
                    .get("USD")
                    .and_then(|q| q.price)
                    .map(|price| (id, price))
            })
            .collect()
    }
}

#[async_trait]
impl PriceOracle for CoinMarketCap {
    fn name(&self) -> &str {
        "coinmarketcap"
    }

    async fn prices(&self, ids: &[String]) -> Result<HashMap<String, f64>, PricingError> {
        let url = format!(
            "{}/v2/cryptocurrency/quotes/latest?id={}",
            self.base_url,
            urlencoding::encode(&ids.join(","))
        );

        let response = self
            .client
            .get(&url)
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(PricingError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let body: QuotesResponse = response
            .json()
            .await
            .map_err(|e| PricingError::Parse(e.to_string()))?;

        Ok(Self::parse(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quotes() {
        let body: QuotesResponse = serde_json::from_str(
            r#"{"data":{"4256":{"id":4256,"quote":{"USD":{"price":0.21}}},"1":{"quote":{"EUR":{"price":1.0}}}}}"#,
        )
        .unwrap();

        let prices = CoinMarketCap::parse(body);
        assert_eq!(prices.get("4256"), Some(&0.21));
        assert!(!prices.contains_key("1"));
    }
}
