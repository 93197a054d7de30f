//! Netfolio REST API
//!
//! HTTP API layer for Netfolio, built with Axum.
//!
//! # Endpoints
//!
//! ## Balances
//! - `GET /api/:family/:chain/:addresses` - Priced balances for a comma-separated address list
//!
//! ## Wallets
//! - `GET /api/wallets` - List registered wallets
//! - `POST /api/wallets` - Register a wallet
//! - `GET /api/wallets/:address` - Get a wallet
//! - `DELETE /api/wallets/:address` - Remove a wallet
//!
//! ## Portfolio
//! - `GET /api/portfolio` - Aggregated holdings across all wallets
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use netfolio::api::{serve, AppState};
//! use netfolio::chains::ChainRegistry;
//! use netfolio::config::Config;
//! use netfolio::wallet::{JsonFileStore, WalletRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = Arc::new(JsonFileStore::new(config.storage.data_path()));
//!     let wallets = Arc::new(WalletRegistry::load(store).await?);
//!     let chains = Arc::new(ChainRegistry::from_config(&config)?);
//!
//!     let state = AppState::new(chains, wallets, config.api.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api_routes = Router::new()
        // Wallet routes
        .route(
            "/wallets",
            get(routes::wallets::list_wallets).post(routes::wallets::add_wallet),
        )
        .route(
            "/wallets/:address",
            get(routes::wallets::get_wallet).delete(routes::wallets::remove_wallet),
        )
        // Portfolio routes
        .route("/portfolio", get(routes::portfolio::get_portfolio))
        // Balance routes
        .route("/:family/:chain/:addresses", get(routes::balances::get_balances));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS restricted to the configured origins; permissive when none are set
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Netfolio API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Netfolio API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::BalanceRecord;
    use crate::chains::testing::StaticSource;
    use crate::chains::ChainRegistry;
    use crate::pricing::testing::FixedOracle;
    use crate::pricing::PriceBook;
    use crate::wallet::{Chain, EvmChain, MemoryStore, WalletRegistry};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    const ALICE: &str = "0xabcdef0123456789abcdef0123456789abcdef01";

    /// Same address with upper-case hex digits
    fn shouted(address: &str) -> String {
        format!("0x{}", address[2..].to_uppercase())
    }

    fn create_test_app() -> Router {
        let source = StaticSource::new(Chain::Evm(EvmChain::Ethereum)).with(
            ALICE,
            vec![BalanceRecord::new(ALICE, "ETH", "Ethereum", 1.5).coin_gecko_id("ethereum")],
        );
        let prices = PriceBook::new(Arc::new(FixedOracle::new(&[("ethereum", 2000.0)])), None);
        let chains = Arc::new(ChainRegistry::new(prices).register(Arc::new(source)));
        let wallets = Arc::new(WalletRegistry::empty(Arc::new(MemoryStore::new())));

        build_router(AppState::new(chains, wallets, ApiConfig::default()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_wallet(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/wallets")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();
        let (status, _) = send(&app, get("/health/live")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app();
        let (status, _) = send(&app, get("/health/ready")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app();
        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["chains"], serde_json::json!(["evm/ethereum"]));
        assert_eq!(body["balance_source"], "local");
    }

    #[tokio::test]
    async fn test_balances_endpoint() {
        let app = create_test_app();
        let (status, body) = send(&app, get(&format!("/api/evm/ethereum/{}", shouted(ALICE)))).await;

        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["symbol"], "ETH");
        assert_eq!(records[0]["price"], 2000.0);
        assert_eq!(records[0]["walletAddress"], ALICE);
    }

    #[tokio::test]
    async fn test_unsupported_chain_returns_empty_list() {
        let app = create_test_app();

        for uri in [
            format!("/api/evm/fantom/{}", ALICE),
            format!("/api/bitcoin/mainnet/{}", ALICE),
            format!("/api/erc/bnb/{}", ALICE),
        ] {
            let (status, body) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body, serde_json::json!([]), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_add_wallet_then_merge() {
        let app = create_test_app();

        let (status, body) = send(
            &app,
            post_wallet(&format!(r#"{{"address":"{}","networks":["ethereum"]}}"#, ALICE)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["outcome"], "added");
        assert_eq!(body["wallet"]["type"], "evm");

        let (status, body) = send(
            &app,
            post_wallet(&format!(r#"{{"address":"{}","networks":["polygon"]}}"#, ALICE)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "merged");

        let (_, body) = send(&app, get("/api/wallets")).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["wallets"][0]["networks"], serde_json::json!(["ethereum", "polygon"]));
    }

    #[tokio::test]
    async fn test_add_invalid_wallet() {
        let app = create_test_app();

        let (status, body) = send(&app, post_wallet(r#"{"address":"0x1234","networks":[]}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ADDRESS");
        assert!(body["request_id"].is_string());

        let (status, _) = send(&app, post_wallet(r#"{"address":"  "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            post_wallet(&format!(r#"{{"address":"{}","networks":["fantom"]}}"#, ALICE)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNKNOWN_NETWORK");
    }

    #[tokio::test]
    async fn test_add_wallet_invalid_json() {
        let app = create_test_app();
        let (status, _) = send(&app, post_wallet("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_and_remove_wallet() {
        let app = create_test_app();
        send(
            &app,
            post_wallet(&format!(r#"{{"address":"{}","networks":["ethereum"]}}"#, ALICE)),
        )
        .await;

        let (status, body) = send(&app, get(&format!("/api/wallets/{}", shouted(ALICE)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], ALICE);

        let (status, _) = send(&app, delete(&format!("/api/wallets/{}", ALICE))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, delete(&format!("/api/wallets/{}", ALICE))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(&app, get(&format!("/api/wallets/{}", ALICE))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_portfolio() {
        let app = create_test_app();

        let (_, body) = send(&app, get("/api/portfolio")).await;
        assert_eq!(body["netWorth"], 0.0);
        assert_eq!(body["tokens"], serde_json::json!([]));

        send(
            &app,
            post_wallet(&format!(r#"{{"address":"{}","networks":["ethereum","bnb"]}}"#, ALICE)),
        )
        .await;

        let (status, body) = send(&app, get("/api/portfolio")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["netWorth"], 3000.0);
        assert_eq!(body["walletCount"], 1);
        assert_eq!(body["tokens"][0]["symbol"], "ETH");
        assert_eq!(body["allocation"][0]["share"], 100.0);
        assert_eq!(body["nftNetWorth"], 0.0);
    }

    #[test]
    fn test_cors_layer_accepts_origins() {
        // invalid header values are skipped rather than failing startup
        let _ = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&[]);
    }
}
