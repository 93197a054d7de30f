//! Netfolio CLI
//!
//! Command-line interface for a running Netfolio server:
//! - Manage wallets
//! - Show the aggregated portfolio
//! - Query raw per-chain balances
//! - Check status

use clap::{Parser, Subcommand};
use netfolio::api::dto::{AddWalletResponse, HealthResponse, PortfolioResponse, WalletsResponse};
use netfolio::balance::BalanceRecord;
use netfolio::wallet::{identify_address, Wallet};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "netfolio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-chain crypto portfolio tracker")]
#[command(long_about = "Netfolio tracks wallets across EVM, Cosmos-SDK and Solana chains.\nRegister your addresses and see one aggregated portfolio.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered wallets
    Wallets,

    /// Register a wallet
    Add {
        /// Wallet address (0x..., cosmos1..., or a Solana public key)
        address: String,
        /// Networks to track (ethereum, bnb, polygon, klaytn, opensea, cosmos, osmosis)
        #[arg(short, long)]
        network: Vec<String>,
    },

    /// Remove a wallet
    Remove {
        /// Wallet address
        address: String,
    },

    /// Show the aggregated portfolio
    Portfolio,

    /// Query raw balances of one chain
    Balances {
        /// Chain family (evm, cosmos-sdk, solana)
        family: String,
        /// Chain name (ethereum, cosmos-hub, mainnet, ...)
        chain: String,
        /// Comma-separated addresses
        addresses: String,
    },

    /// Identify the chain family of an address (offline)
    Identify {
        /// Address to inspect
        address: String,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Wallets => {
            let response = client.get(format!("{}/api/wallets", cli.api_url)).send().await?;
            let list: WalletsResponse = read_json(response, "List wallets").await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&list)?),
                "csv" => print_wallets_csv(&list.wallets)?,
                _ => print_wallets_table(&list.wallets),
            }
        }

        Commands::Add { address, network } => {
            let body = serde_json::json!({
                "address": address,
                "networks": network,
            });

            let response = client
                .post(format!("{}/api/wallets", cli.api_url))
                .json(&body)
                .send()
                .await?;
            let added: AddWalletResponse = read_json(response, "Add wallet").await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&added)?);
            } else {
                println!(
                    "{:?}: {} [{}]",
                    added.outcome,
                    added.wallet.address(),
                    network_list(&added.wallet)
                );
            }
        }

        Commands::Remove { address } => {
            let response = client
                .delete(format!(
                    "{}/api/wallets/{}",
                    cli.api_url,
                    urlencoding::encode(&address)
                ))
                .send()
                .await?;

            match response.status() {
                status if status.is_success() => println!("Removed {}", address),
                reqwest::StatusCode::NOT_FOUND => {
                    eprintln!("No wallet registered with address {}", address);
                    std::process::exit(1);
                }
                status => {
                    let text = response.text().await.unwrap_or_default();
                    eprintln!("Remove failed ({}): {}", status, text);
                    std::process::exit(1);
                }
            }
        }

        Commands::Portfolio => {
            let response = client.get(format!("{}/api/portfolio", cli.api_url)).send().await?;
            let portfolio: PortfolioResponse = read_json(response, "Portfolio").await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&portfolio)?),
                "csv" => print_portfolio_csv(&portfolio)?,
                _ => print_portfolio_table(&portfolio),
            }
        }

        Commands::Balances {
            family,
            chain,
            addresses,
        } => {
            let response = client
                .get(format!(
                    "{}/api/{}/{}/{}",
                    cli.api_url, family, chain, addresses
                ))
                .send()
                .await?;
            let records: Vec<BalanceRecord> = read_json(response, "Balances").await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&records)?),
                "csv" => print_balances_csv(&records)?,
                _ => print_balances_table(&records),
            }
        }

        Commands::Identify { address } => match identify_address(&address) {
            Some(family) => println!("{}", family),
            None => {
                eprintln!("Unrecognized address: {}", address);
                std::process::exit(1);
            }
        },

        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: HealthResponse = resp.json().await?;

                    println!("Netfolio v{}", health.version);
                    println!();
                    println!("API Status: {}", health.status);
                    println!("Wallets: {}", health.wallets);
                    println!("Balance source: {}", health.balance_source);
                    println!();
                    println!("Chains:");
                    for chain in &health.chains {
                        println!("  {}", chain);
                    }
                    println!();
                    println!("Uptime: {}", format_duration(health.uptime_seconds));
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Netfolio API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Netfolio server is running:");
                    eprintln!("  cargo run --bin netfolio");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = netfolio::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Decode a successful JSON response, exiting on an error status
async fn read_json<T: DeserializeOwned>(response: reqwest::Response, action: &str) -> CliResult<T> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        eprintln!("{} failed ({}): {}", action, status, text);
        std::process::exit(1);
    }
    Ok(response.json().await?)
}

fn network_list(wallet: &Wallet) -> String {
    wallet
        .chains()
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(",")
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

fn print_wallets_table(wallets: &[Wallet]) {
    if wallets.is_empty() {
        println!("No wallets registered yet.");
        println!();
        println!("Add your first wallet with:");
        println!("  netfolio-cli add 0x... -n ethereum");
        return;
    }

    println!("{:<46} {:<12} {}", "Address", "Type", "Networks");
    println!("{}", "-".repeat(80));
    for wallet in wallets {
        println!(
            "{:<46} {:<12} {}",
            wallet.address(),
            wallet.family(),
            network_list(wallet)
        );
    }
}

fn print_wallets_csv(wallets: &[Wallet]) -> CliResult<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["address", "type", "networks"])?;
    for wallet in wallets {
        writer.write_record([
            wallet.address().to_string(),
            wallet.family().to_string(),
            network_list(wallet),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_portfolio_table(portfolio: &PortfolioResponse) {
    let tokens = &portfolio.portfolio.tokens;
    println!("Net worth: {}", format_usd(portfolio.portfolio.net_worth));
    if portfolio.nft_net_worth > 0.0 {
        println!("  of which NFTs: {}", format_usd(portfolio.nft_net_worth));
    }
    println!();

    if tokens.is_empty() {
        println!("No holdings");
        return;
    }

    println!(
        "{:<10} {:<24} {:>16} {:>12} {:>14} {:>7}",
        "Symbol", "Name", "Amount", "Price", "Value", "Share"
    );
    println!("{}", "-".repeat(88));
    for (token, allocation) in tokens.iter().zip(&portfolio.allocation) {
        println!(
            "{:<10} {:<24} {:>16.4} {:>12} {:>14} {:>6.1}%",
            token.symbol,
            token.name,
            token.amount,
            format_usd(token.price),
            format_usd(token.net_worth),
            allocation.share
        );
    }
}

fn print_portfolio_csv(portfolio: &PortfolioResponse) -> CliResult<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["symbol", "name", "amount", "price", "net_worth", "share"])?;
    for (token, allocation) in portfolio.portfolio.tokens.iter().zip(&portfolio.allocation) {
        writer.write_record([
            token.symbol.clone(),
            token.name.clone(),
            token.amount.to_string(),
            token.price.to_string(),
            token.net_worth.to_string(),
            format!("{:.2}", allocation.share),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_balances_table(records: &[BalanceRecord]) {
    if records.is_empty() {
        println!("No balances");
        return;
    }

    println!(
        "{:<14} {:<10} {:>16} {:>12} {:>12} {:>14}",
        "Wallet", "Symbol", "Balance", "Staked", "Price", "Value"
    );
    println!("{}", "-".repeat(82));
    for record in records {
        let wallet: String = record.wallet_address.chars().take(12).collect();
        println!(
            "{:<14} {:<10} {:>16.4} {:>12.4} {:>12} {:>14}",
            wallet,
            record.symbol,
            record.balance,
            record.delegations.unwrap_or(0.0),
            format_usd(record.unit_price()),
            format_usd(record.net_worth())
        );
    }
}

fn print_balances_csv(records: &[BalanceRecord]) -> CliResult<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["wallet", "symbol", "name", "balance", "delegations", "price", "net_worth"])?;
    for record in records {
        writer.write_record([
            record.wallet_address.clone(),
            record.symbol.clone(),
            record.name.clone(),
            record.balance.to_string(),
            record.delegations.unwrap_or(0.0).to_string(),
            record.unit_price().to_string(),
            record.net_worth().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
