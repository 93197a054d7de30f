//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::wallet::{CosmosChain, EvmChain};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub chains: ChainsConfig,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub opensea: OpenSeaConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; an explicit empty list allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Timeout of outbound requests (RPC nodes, price APIs)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    15
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Wallet storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("netfolio").to_string_lossy().to_string())
        .unwrap_or_else(|| "./netfolio_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~/` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }
}

/// Chain endpoints; a blank endpoint disables the chain
#[derive(Debug, Clone, Deserialize)]
pub struct ChainsConfig {
    #[serde(default = "default_ethereum_rpc")]
    pub ethereum_rpc: String,

    #[serde(default = "default_bnb_rpc")]
    pub bnb_rpc: String,

    #[serde(default = "default_polygon_rpc")]
    pub polygon_rpc: String,

    #[serde(default = "default_klaytn_rpc")]
    pub klaytn_rpc: String,

    #[serde(default = "default_cosmos_hub_lcd")]
    pub cosmos_hub_lcd: String,

    #[serde(default = "default_osmosis_lcd")]
    pub osmosis_lcd: String,

    #[serde(default = "default_solana_rpc")]
    pub solana_rpc: String,

    /// Directory of `{chain}.json` token lists replacing the built-in ones
    pub token_list_dir: Option<String>,
}

fn default_ethereum_rpc() -> String {
    "https://cloudflare-eth.com".to_string()
}

fn default_bnb_rpc() -> String {
    "https://bsc-dataseed.binance.org".to_string()
}

fn default_polygon_rpc() -> String {
    "https://polygon-rpc.com".to_string()
}

fn default_klaytn_rpc() -> String {
    "https://public-en-cypress.klaytn.net".to_string()
}

fn default_cosmos_hub_lcd() -> String {
    "https://lcd-cosmoshub.keplr.app".to_string()
}

fn default_osmosis_lcd() -> String {
    "https://lcd-osmosis.keplr.app".to_string()
}

fn default_solana_rpc() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

impl Default for ChainsConfig {
    fn default() -> Self {
        Self {
            ethereum_rpc: default_ethereum_rpc(),
            bnb_rpc: default_bnb_rpc(),
            polygon_rpc: default_polygon_rpc(),
            klaytn_rpc: default_klaytn_rpc(),
            cosmos_hub_lcd: default_cosmos_hub_lcd(),
            osmosis_lcd: default_osmosis_lcd(),
            solana_rpc: default_solana_rpc(),
            token_list_dir: None,
        }
    }
}

impl ChainsConfig {
    /// JSON-RPC endpoint of an EVM chain (`None` for the NFT indexer)
    pub fn evm_rpc(&self, chain: EvmChain) -> Option<&str> {
        match chain {
            EvmChain::Ethereum => Some(&self.ethereum_rpc),
            EvmChain::Bnb => Some(&self.bnb_rpc),
            EvmChain::Polygon => Some(&self.polygon_rpc),
            EvmChain::Klaytn => Some(&self.klaytn_rpc),
            EvmChain::OpenSea => None,
        }
    }

    /// LCD endpoint of a Cosmos-SDK chain
    pub fn cosmos_lcd(&self, chain: CosmosChain) -> Option<&str> {
        match chain {
            CosmosChain::CosmosHub => Some(&self.cosmos_hub_lcd),
            CosmosChain::Osmosis => Some(&self.osmosis_lcd),
        }
    }
}

/// Price oracle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_coingecko_url")]
    pub coingecko_url: String,

    pub coingecko_api_key: Option<String>,

    #[serde(default = "default_coinmarketcap_url")]
    pub coinmarketcap_url: String,

    /// CoinMarketCap is only queried when a key is set
    pub coinmarketcap_api_key: Option<String>,
}

fn default_coingecko_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_coinmarketcap_url() -> String {
    "https://pro-api.coinmarketcap.com".to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            coingecko_url: default_coingecko_url(),
            coingecko_api_key: None,
            coinmarketcap_url: default_coinmarketcap_url(),
            coinmarketcap_api_key: None,
        }
    }
}

/// OpenSea NFT source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OpenSeaConfig {
    #[serde(default = "default_opensea_enabled")]
    pub enabled: bool,

    #[serde(default = "default_opensea_url")]
    pub api_url: String,

    pub api_key: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_floor_chunk_size")]
    pub floor_chunk_size: usize,

    #[serde(default = "default_floor_concurrency")]
    pub floor_concurrency: usize,
}

fn default_opensea_enabled() -> bool {
    true
}

fn default_opensea_url() -> String {
    "https://api.opensea.io".to_string()
}

fn default_page_size() -> usize {
    200
}

fn default_max_pages() -> usize {
    20
}

fn default_floor_chunk_size() -> usize {
    10
}

fn default_floor_concurrency() -> usize {
    2
}

impl Default for OpenSeaConfig {
    fn default() -> Self {
        Self {
            enabled: default_opensea_enabled(),
            api_url: default_opensea_url(),
            api_key: None,
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            floor_chunk_size: default_floor_chunk_size(),
            floor_concurrency: default_floor_concurrency(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    /// Remote netfolio service answering `/api/{family}/{chain}/{addrs}`;
    /// balances are fetched in-process when unset
    pub balance_api_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("netfolio").join("config.toml")),
            Some(PathBuf::from("/etc/netfolio/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage
        if let Some(data_dir) = var("NETFOLIO_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // API
        if let Some(host) = var("NETFOLIO_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("NETFOLIO_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Chains
        if let Some(url) = var("NETFOLIO_ETHEREUM_RPC") {
            self.chains.ethereum_rpc = url;
        }
        if let Some(url) = var("NETFOLIO_SOLANA_RPC") {
            self.chains.solana_rpc = url;
        }

        // Keys
        if let Some(key) = var("NETFOLIO_COINGECKO_API_KEY") {
            self.pricing.coingecko_api_key = Some(key);
        }
        if let Some(key) = var("NETFOLIO_COINMARKETCAP_API_KEY") {
            self.pricing.coinmarketcap_api_key = Some(key);
        }
        if let Some(key) = var("NETFOLIO_OPENSEA_API_KEY") {
            self.opensea.api_key = Some(key);
        }

        // Dashboard
        if let Some(url) = var("NETFOLIO_BALANCE_API_URL") {
            self.dashboard.balance_api_url = Some(url);
        }

        // Logging
        if let Some(level) = var("NETFOLIO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("NETFOLIO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Netfolio Configuration
#
# Environment variables override these settings:
# - NETFOLIO_DATA_DIR
# - NETFOLIO_API_HOST
# - NETFOLIO_API_PORT
# - NETFOLIO_ETHEREUM_RPC
# - NETFOLIO_SOLANA_RPC
# - NETFOLIO_COINGECKO_API_KEY
# - NETFOLIO_COINMARKETCAP_API_KEY
# - NETFOLIO_OPENSEA_API_KEY
# - NETFOLIO_BALANCE_API_URL
# - NETFOLIO_LOG_LEVEL
# - NETFOLIO_LOG_FORMAT

[api]
host = "0.0.0.0"
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Timeout of outbound requests to nodes and price APIs
request_timeout_secs = 15

[storage]
# Directory holding storage.json (the wallet list)
data_dir = "~/.local/share/netfolio"

[chains]
# Leave an endpoint empty to disable that chain
ethereum_rpc = "https://cloudflare-eth.com"
bnb_rpc = "https://bsc-dataseed.binance.org"
polygon_rpc = "https://polygon-rpc.com"
klaytn_rpc = "https://public-en-cypress.klaytn.net"
cosmos_hub_lcd = "https://lcd-cosmoshub.keplr.app"
osmosis_lcd = "https://lcd-osmosis.keplr.app"
solana_rpc = "https://api.mainnet-beta.solana.com"

# Directory of {chain}.json token lists replacing the built-in ones
# token_list_dir = "/etc/netfolio/tokens"

[pricing]
coingecko_url = "https://api.coingecko.com/api/v3"
# coingecko_api_key = ""
coinmarketcap_url = "https://pro-api.coinmarketcap.com"
# CoinMarketCap is only used when a key is set
# coinmarketcap_api_key = ""

[opensea]
enabled = true
api_url = "https://api.opensea.io"
# api_key = ""
page_size = 200
max_pages = 20
floor_chunk_size = 10
floor_concurrency = 2

[dashboard]
# Fetch balances from a remote netfolio service instead of in-process
# balance_api_url = "https://balances.example.com"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty, json
format = "pretty"
"#
    .to_string()
}
