//! Cosmos-SDK balance source (Cosmos Hub, Osmosis)
//!
//! Queries the chain's LCD REST endpoint for the liquid staking-denom
//! balance and the sum of all delegations. The wallet address is
//! re-encoded with the chain's bech32 prefix first, so one cosmos-hub key
//! also resolves on osmosis.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::tokens::{staking_denom, Currency};
use super::{ChainError, ChainSource};
use crate::balance::{decimal_to_f64, BalanceRecord};
use crate::wallet::{rebech32, Chain, CosmosChain};

/// Cosmos-SDK chain reached through an LCD endpoint
pub struct CosmosSource {
    chain: CosmosChain,
    client: Client,
    lcd_url: String,
    currency: Currency,
}

#[derive(Debug, Deserialize)]
struct Coin {
    denom: String,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct BankBalances {
    #[serde(default)]
    balances: Vec<Coin>,
}

#[derive(Debug, Deserialize)]
struct DelegationResponse {
    balance: Coin,
}

#[derive(Debug, Deserialize)]
struct Delegations {
    #[serde(default)]
    delegation_responses: Vec<DelegationResponse>,
}

impl CosmosSource {
    pub fn new(chain: CosmosChain, client: Client, lcd_url: impl Into<String>, currency: Currency) -> Self {
        Self {
            chain,
            client,
            lcd_url: lcd_url.into().trim_end_matches('/').to_string(),
            currency,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainError> {
        let url = format!("{}{}", self.lcd_url, path);
        let response = self.client.get(&url).send().await?;

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

    fn sum_denom<'a>(&self, coins: impl Iterator<Item = &'a Coin>) -> f64 {
        let denom = staking_denom(self.chain);
        coins
            .filter(|coin| coin.denom == denom)
            .filter_map(|coin| decimal_to_f64(&coin.amount, self.currency.decimals))
            .sum()
    }

    async fn liquid(&self, address: &str) -> Result<f64, ChainError> {
        let body: BankBalances = self
            .get(&format!("/cosmos/bank/v1beta1/balances/{}", address))
            .await?;
        Ok(self.sum_denom(body.balances.iter()))
    }

    async fn delegated(&self, address: &str) -> Result<f64, ChainError> {
        let body: Delegations = self
            .get(&format!("/cosmos/staking/v1beta1/delegations/{}", address))
            .await?;
        Ok(self.sum_denom(body.delegation_responses.iter().map(|d| &d.balance)))
    }
}

#[async_trait]
impl ChainSource for CosmosSource {
    fn chain(&self) -> Chain {
        Chain::CosmosSdk(self.chain)
    }

    async fn balances(&self, wallet: &str) -> Result<Vec<BalanceRecord>, ChainError> {
        let address = rebech32(wallet, self.chain.bech32_prefix())
            .ok_or_else(|| ChainError::InvalidAddress(wallet.to_string()))?;

        let (liquid, delegated) = tokio::join!(self.liquid(&address), self.delegated(&address));
        let liquid = liquid?;
        let delegated = delegated.unwrap_or_else(|e| {
            tracing::warn!(chain = %self.chain(), wallet = %address, error = %e, "Delegations lookup failed");
            0.0
        });

        Ok(vec![self.currency.record(&address, liquid).delegations(delegated)])
    }
}
