//! Balance source implementations

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::{BalanceSource, FetchError};
use crate::balance::BalanceRecord;
use crate::chains::ChainRegistry;
use crate::wallet::ChainQuery;

/// Answers queries with the in-process chain registry
pub struct LocalSource {
    chains: Arc<ChainRegistry>,
}

impl LocalSource {
    pub fn new(chains: Arc<ChainRegistry>) -> Self {
        Self { chains }
    }
}

#[async_trait]
impl BalanceSource for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn fetch(&self, query: &ChainQuery) -> Result<Vec<BalanceRecord>, FetchError> {
        Ok(self.chains.fetch(query.chain, &query.addresses).await)
    }
}

/// Answers queries by calling a remote balance API
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, query: &ChainQuery) -> String {
        format!("{}{}", self.base_url, query.path())
    }
}

#[async_trait]
impl BalanceSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, query: &ChainQuery) -> Result<Vec<BalanceRecord>, FetchError> {
        let response = self.client.get(self.url(query)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(response.json().await?)
    }
}
