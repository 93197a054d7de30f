//! Netfolio API Server
//!
//! Run with: cargo run --bin netfolio -- [--config path/to/config.toml]
//!
//! Without `--config`, configuration is read from the default locations
//! (see [`netfolio::config::Config::load_default`]) with `NETFOLIO_*`
//! environment overrides. `RUST_LOG` takes precedence over the configured
//! log level.

use clap::Parser;
use netfolio::api::{serve, AppState};
use netfolio::chains::ChainRegistry;
use netfolio::config::{Config, LoggingConfig};
use netfolio::dashboard::{BalanceSource, Dashboard, HttpSource, LocalSource};
use netfolio::wallet::{JsonFileStore, WalletRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "netfolio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-chain portfolio API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting Netfolio API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.storage.data_path());

    // Wallet registry, hydrated from the local store
    let store = Arc::new(JsonFileStore::new(config.storage.data_path()));
    let wallets = Arc::new(WalletRegistry::load(store).await?);

    // Chain sources and price oracles
    let chains = Arc::new(ChainRegistry::from_config(&config)?);

    // Dashboard: in-process balances unless a remote balance API is configured
    let source: Arc<dyn BalanceSource> = match &config.dashboard.balance_api_url {
        Some(url) => {
            tracing::info!("Dashboard balances from {}", url);
            Arc::new(HttpSource::new(
                url.as_str(),
                Duration::from_secs(config.api.request_timeout_secs),
            )?)
        }
        None => Arc::new(LocalSource::new(Arc::clone(&chains))),
    };
    let dashboard = Arc::new(Dashboard::new(Arc::clone(&wallets), source));

    let state = AppState::with_dashboard(chains, wallets, dashboard, config.api.clone());
    serve(state, &config.api).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("netfolio={},tower_http=info", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
