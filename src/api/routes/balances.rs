//! Balance Routes
//!
//! - GET /api/:family/:chain/:addresses - Priced balances of a comma-separated address list
//!
//! Families: `evm`, `erc` (legacy, ethereum/polygon/klaytn only),
//! `cosmos-sdk`, `tendermint` (legacy alias), `solana`. Anything
//! unsupported answers `200 []`, the same as a fetch that failed.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::balance::BalanceRecord;

/// GET /api/:family/:chain/:addresses
pub async fn get_balances(
    State(state): State<Arc<AppState>>,
    Path((family, chain, addresses)): Path<(String, String, String)>,
) -> Json<Vec<BalanceRecord>> {
    Json(state.chains.fetch_path(&family, &chain, &addresses).await)
}
