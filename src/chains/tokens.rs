//! Native currencies and token lists
//!
//! Each chain ships a small built-in list of well-known tokens. A directory
//! of `{chain}.json` files (same shape as [`TokenInfo`]) replaces the
//! built-in list for the chains it covers.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ChainError;
use crate::balance::BalanceRecord;
use crate::wallet::{Chain, CosmosChain, EvmChain};

/// Native currency of a chain
#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u32,
    pub logo: &'static str,
    pub coin_gecko_id: Option<&'static str>,
    pub coin_market_cap_id: Option<u64>,
}

impl Currency {
    /// Unpriced record for `amount` of this currency held by `wallet`
    pub fn record(&self, wallet: &str, amount: f64) -> BalanceRecord {
        let mut record = BalanceRecord::new(wallet, self.symbol, self.name, amount).logo(self.logo);
        if let Some(id) = self.coin_gecko_id {
            record = record.coin_gecko_id(id);
        }
        if let Some(id) = self.coin_market_cap_id {
            record = record.coin_market_cap_id(id);
        }
        record
    }
}

/// A fungible token contract (ERC-20) or mint (SPL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
    pub address: String,
    #[serde(default)]
    pub coin_gecko_id: Option<String>,
    #[serde(default)]
    pub coin_market_cap_id: Option<u64>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl TokenInfo {
    fn new(symbol: &str, name: &str, decimals: u32, address: &str, coin_gecko_id: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            address: address.to_string(),
            coin_gecko_id: Some(coin_gecko_id.to_string()),
            coin_market_cap_id: None,
            logo: None,
        }
    }

    /// Unpriced record for `amount` of this token held by `wallet`
    pub fn record(&self, wallet: &str, amount: f64) -> BalanceRecord {
        let mut record = BalanceRecord::new(wallet, &self.symbol, &self.name, amount)
            .token_address(&self.address);
        record.logo = self.logo.clone();
        record.coin_gecko_id = self.coin_gecko_id.clone();
        record.coin_market_cap_id = self.coin_market_cap_id;
        record
    }
}

/// Native currency of a chain (NFT indexers have none)
pub fn native_currency(chain: Chain) -> Option<Currency> {
    let currency = match chain {
        Chain::Evm(EvmChain::Ethereum) => Currency {
            symbol: "ETH",
            name: "Ethereum",
            decimals: 18,
            logo: "https://assets-cdn.trustwallet.com/blockchains/ethereum/info/logo.png",
            coin_gecko_id: Some("ethereum"),
            coin_market_cap_id: None,
        },
        Chain::Evm(EvmChain::Bnb) => Currency {
            symbol: "BNB",
            name: "BNB",
            decimals: 18,
            logo: "https://assets-cdn.trustwallet.com/blockchains/binance/info/logo.png",
            coin_gecko_id: Some("binancecoin"),
            coin_market_cap_id: None,
        },
        Chain::Evm(EvmChain::Polygon) => Currency {
            symbol: "MATIC",
            name: "Polygon",
            decimals: 18,
            logo: "https://assets-cdn.trustwallet.com/blockchains/polygon/info/logo.png",
            coin_gecko_id: Some("matic-network"),
            coin_market_cap_id: None,
        },
        Chain::Evm(EvmChain::Klaytn) => Currency {
            symbol: "KLAY",
            name: "Klaytn",
            decimals: 18,
            logo: "https://assets-cdn.trustwallet.com/blockchains/klaytn/info/logo.png",
            coin_gecko_id: None,
            coin_market_cap_id: Some(4256),
        },
        Chain::Evm(EvmChain::OpenSea) => return None,
        Chain::CosmosSdk(CosmosChain::CosmosHub) => Currency {
            symbol: "ATOM",
            name: "Cosmos",
            decimals: 6,
            logo: "https://assets-cdn.trustwallet.com/blockchains/cosmos/info/logo.png",
            coin_gecko_id: Some("cosmos"),
            coin_market_cap_id: None,
        },
        Chain::CosmosSdk(CosmosChain::Osmosis) => Currency {
            symbol: "OSMO",
            name: "Osmosis",
            decimals: 6,
            logo: "https://assets-cdn.trustwallet.com/blockchains/osmosis/info/logo.png",
            coin_gecko_id: Some("osmosis"),
            coin_market_cap_id: None,
        },
        Chain::Solana => Currency {
            symbol: "SOL",
            name: "Solana",
            decimals: 9,
            logo: "https://assets-cdn.trustwallet.com/blockchains/solana/info/logo.png",
            coin_gecko_id: Some("solana"),
            coin_market_cap_id: None,
        },
    };
    Some(currency)
}

/// Staking denom of a Cosmos-SDK chain
pub fn staking_denom(chain: CosmosChain) -> &'static str {
    match chain {
        CosmosChain::CosmosHub => "uatom",
        CosmosChain::Osmosis => "uosmo",
    }
}

/// Built-in token list of a chain
pub fn builtin_tokens(chain: Chain) -> Vec<TokenInfo> {
    match chain {
        Chain::Evm(EvmChain::Ethereum) => vec![
            TokenInfo::new("USDC", "USD Coin", 6, "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "usd-coin"),
            TokenInfo::new("USDT", "Tether", 6, "0xdac17f958d2ee523a2206206994597c13d831ec7", "tether"),
            TokenInfo::new("WETH", "Wrapped Ether", 18, "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", "weth"),
            TokenInfo::new("DAI", "Dai", 18, "0x6b175474e89094c44da98b954eedeac495271d0f", "dai"),
        ],
        Chain::Evm(EvmChain::Bnb) => vec![
            TokenInfo::new("BUSD", "Binance USD", 18, "0xe9e7cea3dedca5984780bafc599bd69add087d56", "binance-usd"),
            TokenInfo::new("USDT", "Tether", 18, "0x55d398326f99059ff775485246999027b3197955", "tether"),
        ],
        Chain::Evm(EvmChain::Polygon) => vec![
            TokenInfo::new("USDC", "USD Coin", 6, "0x2791bca1f2de4661ed88a30c99a7a9449aa84174", "usd-coin"),
            TokenInfo::new("WETH", "Wrapped Ether", 18, "0x7ceb23fd6bc0add59e62ac25578270cff1b9f619", "weth"),
        ],
        Chain::Evm(EvmChain::Klaytn) => vec![TokenInfo::new(
            "KSP",
            "KlaySwap Protocol",
            18,
            "0xc6a2ad8cc6e4a7e08fc37cc5954be07d499e7654",
            "klayswap-protocol",
        )],
        Chain::Solana => vec![
            TokenInfo::new("USDC", "USD Coin", 6, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "usd-coin"),
            TokenInfo::new("USDT", "Tether", 6, "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", "tether"),
            TokenInfo::new("BONK", "Bonk", 5, "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "bonk"),
        ],
        Chain::Evm(EvmChain::OpenSea) | Chain::CosmosSdk(_) => Vec::new(),
    }
}

/// Token list of a chain, from `dir/{chain}.json` when present
pub fn load_tokens(chain: Chain, dir: Option<&Path>) -> Result<Vec<TokenInfo>, ChainError> {
    let Some(dir) = dir else {
        return Ok(builtin_tokens(chain));
    };

    let path = dir.join(format!("{}.json", chain.name()));
    if !path.exists() {
        return Ok(builtin_tokens(chain));
    }

    let content = std::fs::read_to_string(&path)?;
    let tokens: Vec<TokenInfo> = serde_json::from_str(&content)
        .map_err(|e| ChainError::Config(format!("{:?}: {}", path, e)))?;

    tracing::info!(chain = %chain, tokens = tokens.len(), path = ?path, "Loaded token list");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_every_fungible_chain_has_a_currency() {
        for chain in Chain::all() {
            let expected = chain != Chain::Evm(EvmChain::OpenSea);
            assert_eq!(native_currency(chain).is_some(), expected, "{}", chain);
        }
    }

    #[test]
    fn test_currency_record() {
        let klay = native_currency(Chain::Evm(EvmChain::Klaytn)).unwrap();
        let record = klay.record("0xabc", 3.0);
        assert_eq!(record.symbol, "KLAY");
        assert_eq!(record.coin_market_cap_id, Some(4256));
        assert!(record.coin_gecko_id.is_none());
        assert!(record.price.is_none());
    }

    #[test]
    fn test_load_tokens_falls_back_to_builtin() {
        let dir = tempdir().unwrap();
        let tokens = load_tokens(Chain::Evm(EvmChain::Ethereum), Some(dir.path())).unwrap();
        assert_eq!(tokens, builtin_tokens(Chain::Evm(EvmChain::Ethereum)));
    }

    #[test]
    fn test_load_tokens_from_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("polygon.json"),
            r#"[{"symbol":"AAVE","name":"Aave","decimals":18,"address":"0xd6df932a45c0f255f85145f286ea0b292b21c90b","coinGeckoId":"aave"}]"#,
        )
        .unwrap();

        let tokens = load_tokens(Chain::Evm(EvmChain::Polygon), Some(dir.path())).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].coin_gecko_id.as_deref(), Some("aave"));
    }

    #[test]
    fn test_load_tokens_bad_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("mainnet.json"), "{not json").unwrap();
        assert!(matches!(
            load_tokens(Chain::Solana, Some(dir.path())),
            Err(ChainError::Config(_))
        ));
    }
}
