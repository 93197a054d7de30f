//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::aggregate::{Allocation, Portfolio};
use crate::wallet::{AddOutcome, Wallet};

// ============================================
// WALLET DTOs
// ============================================

/// Wallet list response
#[derive(Debug, Serialize, Deserialize)]
pub struct WalletsResponse {
    pub wallets: Vec<Wallet>,
    pub count: usize,
}

/// Add wallet response
#[derive(Debug, Serialize, Deserialize)]
pub struct AddWalletResponse {
    /// added, merged or unchanged
    pub outcome: AddOutcome,
    /// The wallet as stored after the call
    pub wallet: Wallet,
}

// ============================================
// PORTFOLIO DTOs
// ============================================

/// Portfolio response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    /// Per-token share of the net worth, same order as `tokens`
    pub allocation: Vec<Allocation>,
    /// Part of the net worth held in NFTs
    pub nft_net_worth: f64,
}

impl From<Portfolio> for PortfolioResponse {
    fn from(portfolio: Portfolio) -> Self {
        Self {
            allocation: portfolio.allocation(),
            nft_net_worth: portfolio.nft_net_worth(),
            portfolio,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Chains with a balance source
    pub chains: Vec<String>,
    /// Registered wallet count
    pub wallets: usize,
    /// Where the dashboard fetches balances ("local" or "http")
    pub balance_source: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
