//! Portfolio snapshot built from aggregated token entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{aggregate, share, total_net_worth, TokenEntry};
use crate::balance::BalanceRecord;

/// Aggregated view of every registered wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// Total USD value across all tokens
    pub net_worth: f64,
    /// Number of wallets that fed this snapshot
    pub wallet_count: usize,
    /// Tokens ranked by net worth
    pub tokens: Vec<TokenEntry>,
    /// When the snapshot was computed
    pub updated_at: DateTime<Utc>,
}

/// Share of one token in the total, for ratio charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub symbol: String,
    pub name: String,
    /// Percentage of the total net worth (0-100)
    pub share: f64,
}

impl Portfolio {
    /// Aggregate the given sources into a snapshot
    pub fn from_sources<I>(sources: I, wallet_count: usize) -> Self
    where
        I: IntoIterator<Item = Vec<BalanceRecord>>,
    {
        let tokens = aggregate(sources);
        Self {
            net_worth: total_net_worth(&tokens),
            wallet_count,
            tokens,
            updated_at: Utc::now(),
        }
    }

    /// Empty snapshot (no wallets registered)
    pub fn empty() -> Self {
        Self::from_sources(Vec::new(), 0)
    }

    /// Per-token share of the total net worth
    pub fn allocation(&self) -> Vec<Allocation> {
        self.tokens
            .iter()
            .map(|t| Allocation {
                symbol: t.symbol.clone(),
                name: t.name.clone(),
                share: share(t.net_worth, self.net_worth),
            })
            .collect()
    }

    /// NFT holdings only
    pub fn nft_net_worth(&self) -> f64 {
        self.tokens
            .iter()
            .flat_map(|t| t.balances.iter())
            .filter(|b| b.is_nft())
            .map(BalanceRecord::net_worth)
            .filter(|v| v.is_finite())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_sums_to_hundred() {
        let portfolio = Portfolio::from_sources(
            vec![vec![
                BalanceRecord::new("0xa", "ETH", "Ethereum", 1.0).price(300.0),
                BalanceRecord::new("0xa", "USDC", "USD Coin", 100.0).price(1.0),
            ]],
            1,
        );

        assert_eq!(portfolio.net_worth, 400.0);
        let allocation = portfolio.allocation();
        assert_eq!(allocation[0].symbol, "ETH");
        assert_eq!(allocation[0].share, 75.0);
        assert_eq!(allocation[1].share, 25.0);
    }

    #[test]
    fn test_empty_portfolio_has_no_nan() {
        let portfolio = Portfolio::empty();
        assert_eq!(portfolio.net_worth, 0.0);
        assert!(portfolio.allocation().is_empty());
        assert_eq!(portfolio.nft_net_worth(), 0.0);
    }

    #[test]
    fn test_nft_net_worth() {
        let portfolio = Portfolio::from_sources(
            vec![
                vec![BalanceRecord::new("0xa", "ETH", "Ethereum", 1.0).price(1000.0)],
                vec![BalanceRecord::new("0xa", "PUNK", "CryptoPunks", 2.0)
                    .price(150.0)
                    .nft()],
            ],
            1,
        );
        assert_eq!(portfolio.nft_net_worth(), 300.0);
        assert_eq!(portfolio.net_worth, 1300.0);
    }
}
