//! Wallet persistence port
//!
//! The registry never touches storage directly; it is handed a
//! `WalletStore` and calls `save` after every mutation.
//!
//! `JsonFileStore` mimics browser local storage: a flat JSON document of
//! string keys, with the wallet list under [`WALLETS_KEY`].

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::types::Wallet;
use super::WalletError;

/// Fixed key the wallet list is stored under
pub const WALLETS_KEY: &str = "@wallets";

/// Storage backend for the wallet list
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Load the persisted wallet list (empty when nothing was stored)
    async fn load(&self) -> Result<Vec<Wallet>, WalletError>;

    /// Replace the persisted wallet list
    async fn save(&self, wallets: &[Wallet]) -> Result<(), WalletError>;
}

/// In-memory store, for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore {
    wallets: RwLock<Vec<Wallet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given wallets
    pub fn with_wallets(wallets: Vec<Wallet>) -> Self {
        Self {
            wallets: RwLock::new(wallets),
        }
    }
}

#[async_trait]
impl WalletStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Wallet>, WalletError> {
        Ok(self.wallets.read().await.clone())
    }

    async fn save(&self, wallets: &[Wallet]) -> Result<(), WalletError> {
        *self.wallets.write().await = wallets.to_vec();
        Ok(())
    }
}

/// Key/value JSON document on disk
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `{data_dir}/storage.json`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("storage.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>, WalletError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => Ok(map),
                _ => Err(WalletError::Store(format!(
                    "{:?} does not hold a JSON object",
                    self.path
                ))),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl WalletStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Wallet>, WalletError> {
        let document = self.read_document().await?;
        match document.get(WALLETS_KEY) {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, wallets: &[Wallet]) -> Result<(), WalletError> {
        let mut document = self.read_document().await?;
        document.insert(WALLETS_KEY.to_string(), serde_json::to_value(wallets)?);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Readers never observe a partially written document
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(&Value::Object(document))?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = ?self.path, wallets = wallets.len(), "Persisted wallets");
        Ok(())
    }
}
