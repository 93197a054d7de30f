//! Wallet and chain identity types
//!
//! - `ChainFamily`: address scheme a wallet belongs to
//! - `EvmChain`, `CosmosChain`: networks within a family
//! - `Chain`: a single balance endpoint target
//! - `Wallet`: a registered address with its network membership

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Address scheme of a wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainFamily {
    Evm,
    CosmosSdk,
    Solana,
}

impl ChainFamily {
    /// Parse a family path segment, accepting legacy names
    ///
    /// `erc` is the retired name of the EVM endpoints and `tendermint` the
    /// retired name of the Cosmos-SDK ones.
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment.to_lowercase().as_str() {
            "evm" | "erc" => Some(ChainFamily::Evm),
            "cosmos-sdk" | "tendermint" => Some(ChainFamily::CosmosSdk),
            "solana" => Some(ChainFamily::Solana),
            _ => None,
        }
    }

    /// Canonical path segment
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::CosmosSdk => "cosmos-sdk",
            ChainFamily::Solana => "solana",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// EVM-compatible networks (OpenSea stands for the NFT indexer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvmChain {
    Ethereum,
    Bnb,
    Polygon,
    Klaytn,
    #[serde(rename = "opensea")]
    OpenSea,
}

impl EvmChain {
    pub fn all() -> &'static [EvmChain] {
        &[
            EvmChain::Ethereum,
            EvmChain::Bnb,
            EvmChain::Polygon,
            EvmChain::Klaytn,
            EvmChain::OpenSea,
        ]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ethereum" => Some(EvmChain::Ethereum),
            "bnb" => Some(EvmChain::Bnb),
            "polygon" => Some(EvmChain::Polygon),
            "klaytn" => Some(EvmChain::Klaytn),
            "opensea" => Some(EvmChain::OpenSea),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvmChain::Ethereum => "ethereum",
            EvmChain::Bnb => "bnb",
            EvmChain::Polygon => "polygon",
            EvmChain::Klaytn => "klaytn",
            EvmChain::OpenSea => "opensea",
        }
    }
}

/// Cosmos-SDK networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CosmosChain {
    #[serde(alias = "cosmos")]
    CosmosHub,
    Osmosis,
}

impl CosmosChain {
    pub fn all() -> &'static [CosmosChain] {
        &[CosmosChain::CosmosHub, CosmosChain::Osmosis]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cosmos-hub" | "cosmos" => Some(CosmosChain::CosmosHub),
            "osmosis" => Some(CosmosChain::Osmosis),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CosmosChain::CosmosHub => "cosmos-hub",
            CosmosChain::Osmosis => "osmosis",
        }
    }

    /// Bech32 human-readable prefix of account addresses
    pub fn bech32_prefix(&self) -> &'static str {
        match self {
            CosmosChain::CosmosHub => "cosmos",
            CosmosChain::Osmosis => "osmo",
        }
    }
}

/// A balance endpoint target: one network of one family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chain {
    Evm(EvmChain),
    CosmosSdk(CosmosChain),
    /// Solana mainnet
    Solana,
}

impl Chain {
    /// Every chain with a balance endpoint
    pub fn all() -> Vec<Chain> {
        EvmChain::all()
            .iter()
            .map(|c| Chain::Evm(*c))
            .chain(CosmosChain::all().iter().map(|c| Chain::CosmosSdk(*c)))
            .chain(std::iter::once(Chain::Solana))
            .collect()
    }

    /// Resolve `/api/{family}/{chain}` path segments
    ///
    /// The legacy `erc` family only ever served ethereum, polygon and
    /// klaytn; anything else under it is unsupported.
    pub fn from_path(family: &str, chain: &str) -> Option<Chain> {
        let legacy_erc = family.eq_ignore_ascii_case("erc");

        match ChainFamily::from_path(family)? {
            ChainFamily::Evm => {
                let evm = EvmChain::parse(chain)?;
                if legacy_erc
                    && !matches!(evm, EvmChain::Ethereum | EvmChain::Polygon | EvmChain::Klaytn)
                {
                    return None;
                }
                Some(Chain::Evm(evm))
            }
            ChainFamily::CosmosSdk => CosmosChain::parse(chain).map(Chain::CosmosSdk),
            ChainFamily::Solana => chain.eq_ignore_ascii_case("mainnet").then_some(Chain::Solana),
        }
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            Chain::Evm(_) => ChainFamily::Evm,
            Chain::CosmosSdk(_) => ChainFamily::CosmosSdk,
            Chain::Solana => ChainFamily::Solana,
        }
    }

    /// Chain path segment
    pub fn name(&self) -> &'static str {
        match self {
            Chain::Evm(c) => c.as_str(),
            Chain::CosmosSdk(c) => c.as_str(),
            Chain::Solana => "mainnet",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family(), self.name())
    }
}

/// A registered wallet
///
/// Serialized with a `type` tag so the stored list reads
/// `{"type":"evm","address":"0x..","networks":["ethereum"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Wallet {
    Evm {
        address: String,
        #[serde(default)]
        networks: BTreeSet<EvmChain>,
    },
    CosmosSdk {
        address: String,
        #[serde(default)]
        networks: BTreeSet<CosmosChain>,
    },
    Solana {
        address: String,
    },
}

impl Wallet {
    pub fn address(&self) -> &str {
        match self {
            Wallet::Evm { address, .. }
            | Wallet::CosmosSdk { address, .. }
            | Wallet::Solana { address } => address,
        }
    }

    pub fn family(&self) -> ChainFamily {
        match self {
            Wallet::Evm { .. } => ChainFamily::Evm,
            Wallet::CosmosSdk { .. } => ChainFamily::CosmosSdk,
            Wallet::Solana { .. } => ChainFamily::Solana,
        }
    }

    /// Chains this wallet's balances are fetched from
    pub fn chains(&self) -> Vec<Chain> {
        match self {
            Wallet::Evm { networks, .. } => networks.iter().map(|c| Chain::Evm(*c)).collect(),
            Wallet::CosmosSdk { networks, .. } => {
                networks.iter().map(|c| Chain::CosmosSdk(*c)).collect()
            }
            Wallet::Solana { .. } => vec![Chain::Solana],
        }
    }

    /// Identity used for de-duplication within a family
    ///
    /// Hex and bech32 are case-insensitive; base58 is not.
    pub fn normalized_address(&self) -> String {
        normalize_address(self.family(), self.address())
    }

    /// Whether `address` designates this wallet
    pub fn matches(&self, address: &str) -> bool {
        match self.family() {
            ChainFamily::Solana => self.address() == address,
            _ => self.address().eq_ignore_ascii_case(address),
        }
    }
}

/// Normalize an address for comparison within its family
pub fn normalize_address(family: ChainFamily, address: &str) -> String {
    match family {
        ChainFamily::Evm | ChainFamily::CosmosSdk => address.to_lowercase(),
        ChainFamily::Solana => address.to_string(),
    }
}
