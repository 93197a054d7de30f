//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::chains::ChainRegistry;
use crate::config::ApiConfig;
use crate::dashboard::{Dashboard, LocalSource};
use crate::wallet::WalletRegistry;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Balance sources answering the per-chain endpoints
    pub chains: Arc<ChainRegistry>,
    /// Registered wallets
    pub wallets: Arc<WalletRegistry>,
    /// Portfolio builder over the registered wallets
    pub dashboard: Arc<Dashboard>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create an AppState whose dashboard fetches balances in-process
    pub fn new(chains: Arc<ChainRegistry>, wallets: Arc<WalletRegistry>, config: ApiConfig) -> Self {
        let source = Arc::new(LocalSource::new(Arc::clone(&chains)));
        let dashboard = Arc::new(Dashboard::new(Arc::clone(&wallets), source));
        Self::with_dashboard(chains, wallets, dashboard, config)
    }

    /// Create an AppState with a custom dashboard
    pub fn with_dashboard(
        chains: Arc<ChainRegistry>,
        wallets: Arc<WalletRegistry>,
        dashboard: Arc<Dashboard>,
        config: ApiConfig,
    ) -> Self {
        Self {
            chains,
            wallets,
            dashboard,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
