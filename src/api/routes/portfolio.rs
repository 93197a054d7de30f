//! Portfolio Routes
//!
//! - GET /api/portfolio - Aggregated holdings of every registered wallet

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::PortfolioResponse;
use crate::api::state::AppState;

/// GET /api/portfolio
///
/// Fetches every chain of every wallet on each call; failed chains are
/// left out of the totals.
pub async fn get_portfolio(State(state): State<Arc<AppState>>) -> Json<PortfolioResponse> {
    let portfolio = state.dashboard.refresh().await;
    Json(portfolio.into())
}
