//! Solana balance source
//!
//! SOL from `getBalance`, SPL tokens from `getTokenAccountsByOwner`
//! (jsonParsed). Only mints present in the token list are reported; token
//! accounts of the same mint are summed.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use super::rpc::JsonRpcClient;
use super::tokens::{Currency, TokenInfo};
use super::{ChainError, ChainSource};
use crate::balance::{decimal_to_f64, BalanceRecord};
use crate::wallet::Chain;

/// SPL token program id
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Solana mainnet reached through a JSON-RPC node
pub struct SolanaSource {
    rpc: JsonRpcClient,
    currency: Currency,
    tokens: HashMap<String, TokenInfo>,
}

#[derive(Debug, Deserialize)]
struct RpcValue<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    account: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedToken,
}

#[derive(Debug, Deserialize)]
struct ParsedToken {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    mint: String,
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount: String,
    decimals: u32,
}

impl SolanaSource {
    pub fn new(rpc: JsonRpcClient, currency: Currency, tokens: Vec<TokenInfo>) -> Self {
        Self {
            rpc,
            currency,
            tokens: tokens.into_iter().map(|t| (t.address.clone(), t)).collect(),
        }
    }

    async fn native_balance(&self, wallet: &str) -> Result<f64, ChainError> {
        let lamports: RpcValue<u64> = self.rpc.call("getBalance", json!([wallet])).await?;
        Ok(lamports.value as f64 / LAMPORTS_PER_SOL)
    }

    async fn token_balances(&self, wallet: &str) -> Result<Vec<BalanceRecord>, ChainError> {
        let accounts: RpcValue<Vec<KeyedAccount>> = self
            .rpc
            .call(
                "getTokenAccountsByOwner",
                json!([wallet, { "programId": TOKEN_PROGRAM_ID }, { "encoding": "jsonParsed" }]),
            )
            .await?;

        Ok(self.collect_tokens(wallet, accounts.value))
    }

    fn collect_tokens(&self, wallet: &str, accounts: Vec<KeyedAccount>) -> Vec<BalanceRecord> {
        // mint order of first appearance
        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, f64> = HashMap::new();

        for account in accounts {
            let info = account.account.data.parsed.info;
            if !self.tokens.contains_key(&info.mint) {
                continue;
            }
            let Some(amount) = decimal_to_f64(&info.token_amount.amount, info.token_amount.decimals) else {
                continue;
            };
            if !totals.contains_key(&info.mint) {
                order.push(info.mint.clone());
            }
            *totals.entry(info.mint).or_insert(0.0) += amount;
        }

        order
            .into_iter()
            .filter_map(|mint| {
                let amount = totals.get(&mint).copied().unwrap_or(0.0);
                let token = self.tokens.get(&mint)?;
                (amount > 0.0).then(|| token.record(wallet, amount))
            })
            .collect()
    }
}

#[async_trait]
impl ChainSource for SolanaSource {
    fn chain(&self) -> Chain {
        Chain::Solana
    }

    async fn balances(&self, wallet: &str) -> Result<Vec<BalanceRecord>, ChainError> {
        let (native, tokens) = tokio::join!(self.native_balance(wallet), self.token_balances(wallet));

        let native = native.unwrap_or_else(|e| {
            tracing::warn!(chain = %self.chain(), wallet = %wallet, error = %e, "Native balance failed, using 0");
            0.0
        });
        let tokens = tokens.unwrap_or_else(|e| {
            tracing::warn!(chain = %self.chain(), wallet = %wallet, error = %e, "Token accounts failed");
            Vec::new()
        });

        let mut records = Vec::with_capacity(tokens.len() + 1);
        records.push(self.currency.record(wallet, native));
        records.extend(tokens);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::tokens::{builtin_tokens, native_currency};

    const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn source() -> SolanaSource {
        SolanaSource::new(
            JsonRpcClient::new(reqwest::Client::new(), "http://127.0.0.1:9"),
            native_currency(Chain::Solana).unwrap(),
            builtin_tokens(Chain::Solana),
        )
    }

    fn account(mint: &str, amount: &str, decimals: u32) -> String {
        format!(
            r#"{{"pubkey":"x","account":{{"lamports":2039280,"owner":"{}","data":{{"program":"spl-token","parsed":{{"type":"account","info":{{"mint":"{}","owner":"w","tokenAmount":{{"amount":"{}","decimals":{},"uiAmount":null}}}}}}}}}}}}"#,
            TOKEN_PROGRAM_ID, mint, amount, decimals
        )
    }

    #[test]
    fn test_collect_tokens_sums_by_mint() {
        let body = format!(
            "[{},{},{}]",
            account(USDC_MINT, "1500000", 6),
            account("UnknownMint1111111111111111111111111111111", "999", 0),
            account(USDC_MINT, "500000", 6),
        );
        let accounts: Vec<KeyedAccount> = serde_json::from_str(&body).unwrap();

        let records = source().collect_tokens("wallet", accounts);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "USDC");
        assert_eq!(records[0].balance, 2.0);
        assert_eq!(records[0].address.as_deref(), Some(USDC_MINT));
    }

    #[test]
    fn test_collect_tokens_skips_empty_accounts() {
        let body = format!("[{}]", account(USDC_MINT, "0", 6));
        let accounts: Vec<KeyedAccount> = serde_json::from_str(&body).unwrap();
        assert!(source().collect_tokens("wallet", accounts).is_empty());
    }

    #[test]
    fn test_lamports_response() {
        let value: RpcValue<u64> =
            serde_json::from_str(r#"{"context":{"slot":1},"value":2500000000}"#).unwrap();
        assert_eq!(value.value as f64 / LAMPORTS_PER_SOL, 2.5);
    }
}
