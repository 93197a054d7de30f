//! Balance aggregation
//!
//! Merges the balance lists returned by every chain source into one
//! ranked token list:
//!
//! 1. Flatten all sources
//! 2. Group by `symbol + name` (cross-chain token identity)
//! 3. Sum `(balance + delegations) * price` per group
//! 4. Sort descending by net worth, drop entries worth nothing
//!
//! The grouping key is knowingly imprecise: two distinct tokens that share
//! both symbol and name end up in the same entry.

mod portfolio;

pub use portfolio::{Allocation, Portfolio};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::balance::BalanceRecord;

/// One token aggregated across wallets and chains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEntry {
    pub symbol: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    /// Σ (balance + delegations) × price over the constituent records
    pub net_worth: f64,
    /// Σ (balance + delegations) over the constituent records
    pub amount: f64,
    /// Unit price of the first constituent record
    pub price: f64,
    /// Constituent records, for drill-down display
    pub balances: Vec<BalanceRecord>,
}

impl TokenEntry {
    fn from_group(balances: Vec<BalanceRecord>) -> Option<Self> {
        let first = balances.first()?;

        let net_worth = balances.iter().map(BalanceRecord::net_worth).sum();
        let amount = balances.iter().map(BalanceRecord::total_amount).sum();

        Some(Self {
            symbol: first.symbol.clone(),
            name: first.name.clone(),
            logo: first.logo.clone(),
            token_address: first.address.clone(),
            net_worth,
            amount,
            price: first.unit_price(),
            balances,
        })
    }
}

/// Grouping key for cross-chain token identity
pub fn group_key(record: &BalanceRecord) -> String {
    format!("{}{}", record.symbol, record.name)
}

/// Aggregate any number of balance lists into a ranked token list
///
/// Groups keep first-seen order before the sort, so ties on net worth
/// stay in the order their first record appeared.
pub fn aggregate<I>(sources: I) -> Vec<TokenEntry>
where
    I: IntoIterator<Item = Vec<BalanceRecord>>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<BalanceRecord>> = Vec::new();

    for record in sources.into_iter().flatten() {
        let key = group_key(&record);
        match index.get(&key) {
            Some(&i) => groups[i].push(record),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![record]);
            }
        }
    }

    let mut tokens: Vec<TokenEntry> = groups
        .into_iter()
        .filter_map(TokenEntry::from_group)
        .collect();

    tokens.sort_by(|a, b| {
        b.net_worth
            .partial_cmp(&a.net_worth)
            .unwrap_or(Ordering::Equal)
    });

    // NaN fails the comparison as well
    tokens.retain(|t| t.net_worth > 0.0);

    tracing::debug!(tokens = tokens.len(), "Aggregated balances");
    tokens
}

/// Sum of net worth across entries
pub fn total_net_worth(tokens: &[TokenEntry]) -> f64 {
    tokens.iter().map(|t| t.net_worth).sum()
}

/// Percentage of `total` that `value` represents, 0 when undefined
pub fn share(value: f64, total: f64) -> f64 {
    if total == 0.0 || !total.is_finite() {
        return 0.0;
    }
    let pct = value / total * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, name: &str, balance: f64, price: f64) -> BalanceRecord {
        BalanceRecord::new("0xwallet", symbol, name, balance).price(price)
    }

    #[test]
    fn test_same_symbol_and_name_merge() {
        let tokens = aggregate(vec![vec![
            record("ETH", "Ethereum", 1.0, 2000.0),
            record("ETH", "Ethereum", 0.5, 2000.0),
        ]]);

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].amount, 1.5);
        assert_eq!(tokens[0].net_worth, 3000.0);
        assert_eq!(tokens[0].balances.len(), 2);
    }

    #[test]
    fn test_delegations_count_towards_amount_and_net_worth() {
        let atom = BalanceRecord::new("cosmos1abc", "ATOM", "Cosmos", 10.0)
            .delegations(5.0)
            .price(1.0);
        let tokens = aggregate(vec![vec![atom]]);

        assert_eq!(tokens[0].amount, 15.0);
        assert_eq!(tokens[0].net_worth, 15.0);
    }

    #[test]
    fn test_differing_symbol_or_name_never_merge() {
        let tokens = aggregate(vec![
            vec![record("USDC", "USD Coin", 10.0, 1.0)],
            vec![record("USDC", "USD Coin (PoS)", 5.0, 1.0)],
            vec![record("USDC.e", "USD Coin", 2.0, 1.0)],
        ]);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_merges_across_sources() {
        let tokens = aggregate(vec![
            vec![record("USDC", "USD Coin", 10.0, 1.0)],
            vec![],
            vec![record("USDC", "USD Coin", 5.0, 1.0)],
        ]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].net_worth, 15.0);
    }

    #[test]
    fn test_sorted_descending_and_worthless_dropped() {
        let tokens = aggregate(vec![vec![
            record("DUST", "Dust", 100.0, 0.0),
            record("ATOM", "Cosmos", 10.0, 10.0),
            record("ETH", "Ethereum", 1.0, 2000.0),
            record("NEG", "Negative", 1.0, -5.0),
            record("OSMO", "Osmosis", 50.0, 1.0),
        ]]);

        let symbols: Vec<&str> = tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ETH", "ATOM", "OSMO"]);
        assert!(tokens.windows(2).all(|w| w[0].net_worth >= w[1].net_worth));
        assert!(tokens.iter().all(|t| t.net_worth > 0.0));
    }

    #[test]
    fn test_nan_net_worth_dropped() {
        let tokens = aggregate(vec![vec![record("BAD", "Bad", 1.0, f64::NAN)]]);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_net_worth_independent_of_order() {
        let records = vec![
            record("ETH", "Ethereum", 1.0, 2000.0),
            record("ATOM", "Cosmos", 4.0, 10.0),
            record("ETH", "Ethereum", 0.25, 2000.0),
            BalanceRecord::new("osmo1", "OSMO", "Osmosis", 3.0)
                .delegations(7.0)
                .price(0.5),
        ];
        let expected: f64 = records.iter().map(BalanceRecord::net_worth).sum();

        let forward = aggregate(vec![records.clone()]);
        let mut reversed_records = records;
        reversed_records.reverse();
        let reversed = aggregate(vec![reversed_records]);

        assert_eq!(total_net_worth(&forward), expected);
        assert_eq!(total_net_worth(&reversed), expected);
        assert_eq!(forward.len(), reversed.len());
    }

    #[test]
    fn test_first_record_is_representative() {
        let first = record("ETH", "Ethereum", 1.0, 2000.0).logo("eth.png");
        let second = record("ETH", "Ethereum", 1.0, 1990.0).logo("other.png");
        let tokens = aggregate(vec![vec![first, second]]);

        assert_eq!(tokens[0].logo.as_deref(), Some("eth.png"));
        assert_eq!(tokens[0].price, 2000.0);
        assert_eq!(tokens[0].net_worth, 3990.0);
    }

    #[test]
    fn test_share_guards_zero_total() {
        assert_eq!(share(10.0, 0.0), 0.0);
        assert_eq!(share(0.0, 0.0), 0.0);
        assert_eq!(share(10.0, f64::NAN), 0.0);
        assert_eq!(share(25.0, 100.0), 25.0);
    }

    #[test]
    fn test_empty_input() {
        let tokens = aggregate(Vec::<Vec<BalanceRecord>>::new());
        assert!(tokens.is_empty());
        assert_eq!(total_net_worth(&tokens), 0.0);
    }
}
