//! EVM balance source (Ethereum, BNB Chain, Polygon, Klaytn)
//!
//! Native balance via `eth_getBalance`, token balances via one batched
//! JSON-RPC request of `balanceOf` calls over the chain's token list.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::rpc::JsonRpcClient;
use super::tokens::{Currency, TokenInfo};
use super::{ChainError, ChainSource};
use crate::balance::{hex_to_f64, BalanceRecord};
use crate::wallet::{Chain, EvmChain};

/// `balanceOf(address)` selector
const BALANCE_OF_SELECTOR: &str = "0x70a08231";

/// EVM chain reached through a JSON-RPC node
pub struct EvmSource {
    chain: EvmChain,
    rpc: JsonRpcClient,
    currency: Currency,
    tokens: Vec<TokenInfo>,
}

impl EvmSource {
    pub fn new(chain: EvmChain, rpc: JsonRpcClient, currency: Currency, tokens: Vec<TokenInfo>) -> Self {
        Self {
            chain,
            rpc,
            currency,
            tokens,
        }
    }

    async fn native_balance(&self, wallet: &str) -> Result<f64, ChainError> {
        let hex: String = self.rpc.call("eth_getBalance", json!([wallet, "latest"])).await?;
        hex_to_f64(&hex, self.currency.decimals)
            .ok_or_else(|| ChainError::Parse(format!("eth_getBalance returned {:?}", hex)))
    }

    async fn token_balances(&self, wallet: &str) -> Result<Vec<BalanceRecord>, ChainError> {
        let data = balance_of_calldata(wallet)?;
        let calls = self
            .tokens
            .iter()
            .map(|token| {
                (
                    "eth_call",
                    json!([{ "to": token.address, "data": data }, "latest"]),
                )
            })
            .collect();

        let results = self.rpc.batch(calls).await?;

        let mut records = Vec::new();
        for (token, result) in self.tokens.iter().zip(results) {
            let amount = match result {
                Ok(Value::String(hex)) => hex_to_f64(&hex, token.decimals),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(chain = %self.chain(), token = %token.symbol, error = %e, "balanceOf failed");
                    None
                }
            };

            match amount {
                Some(amount) if amount > 0.0 => records.push(token.record(wallet, amount)),
                _ => {}
            }
        }

        Ok(records)
    }
}

/// ABI-encoded `balanceOf(wallet)` call data
fn balance_of_calldata(wallet: &str) -> Result<String, ChainError> {
    let hex = wallet.strip_prefix("0x").unwrap_or(wallet);
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ChainError::InvalidAddress(wallet.to_string()));
    }
    Ok(format!("{}{:0>64}", BALANCE_OF_SELECTOR, hex.to_lowercase()))
}

#[async_trait]
impl ChainSource for EvmSource {
    fn chain(&self) -> Chain {
        Chain::Evm(self.chain)
    }

    async fn balances(&self, wallet: &str) -> Result<Vec<BalanceRecord>, ChainError> {
        let wallet = wallet.to_lowercase();
        let (native, tokens) = tokio::join!(self.native_balance(&wallet), self.token_balances(&wallet));

        let native = native.unwrap_or_else(|e| {
            tracing::warn!(chain = %self.chain(), wallet = %wallet, error = %e, "Native balance failed, using 0");
            0.0
        });
        let tokens = tokens.unwrap_or_else(|e| {
            tracing::warn!(chain = %self.chain(), wallet = %wallet, error = %e, "Token balances failed");
            Vec::new()
        });

        let mut records = Vec::with_capacity(tokens.len() + 1);
        records.push(self.currency.record(&wallet, native));
        records.extend(tokens);
        Ok(records)
    }
}
