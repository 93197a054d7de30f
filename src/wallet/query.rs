//! Address-by-chain grouping
//!
//! Turns the wallet list into one query per chain, the shape the balance
//! endpoints take: `/api/{family}/{chain}/{addr1,addr2,...}`.

use std::collections::BTreeMap;

use super::types::{Chain, Wallet};

/// All addresses to fetch from one chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainQuery {
    pub chain: Chain,
    pub addresses: Vec<String>,
}

impl ChainQuery {
    /// Comma-separated address list
    pub fn address_list(&self) -> String {
        self.addresses.join(",")
    }

    /// Endpoint path for this query
    pub fn path(&self) -> String {
        format!(
            "/api/{}/{}/{}",
            self.chain.family(),
            self.chain.name(),
            self.address_list()
        )
    }
}

/// Group wallet addresses by the chains they participate in
///
/// Chains without any address produce no query. Each address appears at
/// most once per chain, in registry order.
pub fn address_queries(wallets: &[Wallet]) -> Vec<ChainQuery> {
    let mut by_chain: BTreeMap<Chain, Vec<String>> = BTreeMap::new();

    for wallet in wallets {
        for chain in wallet.chains() {
            let addresses = by_chain.entry(chain).or_default();
            if !addresses.iter().any(|a| wallet.matches(a)) {
                addresses.push(wallet.address().to_string());
            }
        }
    }

    by_chain
        .into_iter()
        .filter(|(_, addresses)| !addresses.is_empty())
        .map(|(chain, addresses)| ChainQuery { chain, addresses })
        .collect()
}
