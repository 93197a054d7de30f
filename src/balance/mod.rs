//! Balance records
//!
//! The unit of exchange between the per-chain fetchers, the price
//! enrichment pass and the aggregator. One record describes one asset held
//! by one wallet on one chain.

mod units;

pub use units::{decimal_to_f64, hex_to_f64};

use serde::{Deserialize, Serialize};

/// A single asset balance for one wallet on one chain
///
/// Serialized in camelCase so the JSON matches what the balance endpoints
/// have always returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    /// Wallet that holds the asset
    #[serde(default)]
    pub wallet_address: String,
    /// Ticker symbol (ETH, ATOM, USDC...)
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Logo URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Token contract address or mint; absent for native currencies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// CoinGecko id used for price lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_gecko_id: Option<String>,
    /// CoinMarketCap id used for price lookup when there is no CoinGecko id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_market_cap_id: Option<u64>,
    /// Liquid quantity, already scaled by the token decimals
    pub balance: f64,
    /// Staked or delegated quantity (Cosmos-SDK chains)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegations: Option<f64>,
    /// Unit price in USD; `None` until the price pass has run
    #[serde(default)]
    pub price: Option<f64>,
    /// Set for non-fungible holdings
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
}

/// Discriminates special record kinds on the wire (`"type": "nft"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Nft,
}

impl BalanceRecord {
    /// Create a record with no price and no optional metadata
    pub fn new(
        wallet_address: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
    ) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            symbol: symbol.into(),
            name: name.into(),
            logo: None,
            address: None,
            coin_gecko_id: None,
            coin_market_cap_id: None,
            balance,
            delegations: None,
            price: None,
            kind: None,
        }
    }

    /// Builder method: set the logo URI
    pub fn logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    /// Builder method: set the token contract address
    pub fn token_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Builder method: set the CoinGecko id
    pub fn coin_gecko_id(mut self, id: impl Into<String>) -> Self {
        self.coin_gecko_id = Some(id.into());
        self
    }

    /// Builder method: set the CoinMarketCap id
    pub fn coin_market_cap_id(mut self, id: u64) -> Self {
        self.coin_market_cap_id = Some(id);
        self
    }

    /// Builder method: set the delegated amount
    pub fn delegations(mut self, amount: f64) -> Self {
        self.delegations = Some(amount);
        self
    }

    /// Builder method: set the unit price
    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Builder method: mark the record as an NFT holding
    pub fn nft(mut self) -> Self {
        self.kind = Some(RecordKind::Nft);
        self
    }

    /// Whether this record describes an NFT holding
    pub fn is_nft(&self) -> bool {
        matches!(self.kind, Some(RecordKind::Nft))
    }

    /// Liquid plus delegated quantity
    pub fn total_amount(&self) -> f64 {
        self.balance + self.delegations.unwrap_or(0.0)
    }

    /// Unit price, zero when unknown
    pub fn unit_price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// USD value of the liquid plus delegated quantity
    pub fn net_worth(&self) -> f64 {
        self.total_amount() * self.unit_price()
    }
}
