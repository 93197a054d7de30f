//! Wallet Routes
//!
//! - GET /api/wallets - List registered wallets
//! - POST /api/wallets - Register a wallet (or merge its networks)
//! - GET /api/wallets/:address - Get one wallet
//! - DELETE /api/wallets/:address - Remove a wallet

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AddWalletResponse, WalletsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::wallet::{AddOutcome, Wallet, WalletDraft};

/// GET /api/wallets
pub async fn list_wallets(State(state): State<Arc<AppState>>) -> Json<WalletsResponse> {
    let wallets = state.wallets.snapshot().await;
    Json(WalletsResponse {
        count: wallets.len(),
        wallets,
    })
}

/// POST /api/wallets
///
/// Request body: `{"address": "...", "networks": ["ethereum", "polygon"]}`.
/// Returns 201 for a new wallet, 200 when an existing one was merged or
/// left unchanged.
pub async fn add_wallet(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<WalletDraft>,
) -> ApiResult<(StatusCode, Json<AddWalletResponse>)> {
    if draft.address.trim().is_empty() {
        return Err(ApiError::Validation("address is required".to_string()));
    }

    let (outcome, wallet) = state.wallets.add(draft).await?;
    let status = match outcome {
        AddOutcome::Added => StatusCode::CREATED,
        AddOutcome::Merged | AddOutcome::Unchanged => StatusCode::OK,
    };

    Ok((status, Json(AddWalletResponse { outcome, wallet })))
}

/// GET /api/wallets/:address
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<Wallet>> {
    state
        .wallets
        .get(&address)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("wallet {}", address)))
}

/// DELETE /api/wallets/:address
pub async fn remove_wallet(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<StatusCode> {
    if state.wallets.remove(&address).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("wallet {}", address)))
    }
}
