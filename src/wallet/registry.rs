//! Wallet registry
//!
//! Explicit state container for the connected wallets. Owned by the API
//! state and the dashboard through an `Arc`; persistence goes through the
//! injected [`WalletStore`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::identify::identify_address;
use super::store::WalletStore;
use super::types::{ChainFamily, CosmosChain, EvmChain, Wallet};
use super::WalletError;

/// A wallet the user wants to add, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletDraft {
    pub address: String,
    /// Network ids (`ethereum`, `polygon`, `cosmos`, `osmosis`...)
    #[serde(default)]
    pub networks: Vec<String>,
}

impl WalletDraft {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            networks: Vec::new(),
        }
    }

    /// Builder method: add a network id
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.networks.push(network.into());
        self
    }

    /// Validate the draft into a wallet
    pub fn into_wallet(self) -> Result<Wallet, WalletError> {
        let address = self.address.trim().to_string();
        let family = identify_address(&address)
            .ok_or_else(|| WalletError::InvalidAddress(address.clone()))?;

        let wallet = match family {
            ChainFamily::Evm => Wallet::Evm {
                networks: parse_networks(&self.networks, EvmChain::parse)?,
                address,
            },
            ChainFamily::CosmosSdk => Wallet::CosmosSdk {
                networks: parse_networks(&self.networks, CosmosChain::parse)?,
                address,
            },
            // Solana wallets are single-chain; requested networks are ignored
            ChainFamily::Solana => Wallet::Solana { address },
        };

        Ok(wallet)
    }
}

fn parse_networks<T: Ord>(
    ids: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> Result<BTreeSet<T>, WalletError> {
    ids.iter()
        .map(|id| parse(id).ok_or_else(|| WalletError::UnknownNetwork(id.clone())))
        .collect()
}

/// What `WalletRegistry::add` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddOutcome {
    /// New wallet appended
    Added,
    /// Known wallet; its network set was extended
    Merged,
    /// Known wallet; nothing changed
    Unchanged,
}

/// Registry of connected wallets
pub struct WalletRegistry {
    wallets: RwLock<Vec<Wallet>>,
    store: Arc<dyn WalletStore>,
}

impl WalletRegistry {
    /// Create a registry hydrated from the store
    pub async fn load(store: Arc<dyn WalletStore>) -> Result<Self, WalletError> {
        let wallets = store.load().await?;
        tracing::info!(wallets = wallets.len(), "Loaded wallet registry");

        Ok(Self {
            wallets: RwLock::new(wallets),
            store,
        })
    }

    /// Create an empty registry (the store is only written to)
    pub fn empty(store: Arc<dyn WalletStore>) -> Self {
        Self {
            wallets: RwLock::new(Vec::new()),
            store,
        }
    }

    /// Immutable copy of the current wallet list
    pub async fn snapshot(&self) -> Vec<Wallet> {
        self.wallets.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.wallets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.wallets.read().await.is_empty()
    }

    /// Find a wallet by address
    pub async fn get(&self, address: &str) -> Option<Wallet> {
        self.wallets
            .read()
            .await
            .iter()
            .find(|w| w.matches(address))
            .cloned()
    }

    /// Validate and add a wallet
    ///
    /// An already-known address has its network set unioned with the
    /// draft's; Solana wallets are never modified once added.
    pub async fn add(&self, draft: WalletDraft) -> Result<(AddOutcome, Wallet), WalletError> {
        let incoming = draft.into_wallet()?;
        let key = incoming.normalized_address();

        let mut wallets = self.wallets.write().await;
        let mut next = wallets.clone();

        let existing = next
            .iter_mut()
            .find(|w| w.family() == incoming.family() && w.normalized_address() == key);

        let (outcome, wallet) = match existing {
            None => {
                next.push(incoming.clone());
                (AddOutcome::Added, incoming)
            }
            Some(current) => {
                let changed = merge_networks(current, &incoming);
                let outcome = if changed {
                    AddOutcome::Merged
                } else {
                    AddOutcome::Unchanged
                };
                (outcome, current.clone())
            }
        };

        // Memory only moves once the store has the new list
        if outcome != AddOutcome::Unchanged {
            self.store.save(&next).await?;
            *wallets = next;
        }

        tracing::info!(
            address = %wallet.address(),
            family = %wallet.family(),
            outcome = ?outcome,
            "Wallet registered"
        );

        Ok((outcome, wallet))
    }

    /// Remove a wallet by address; returns whether one was removed
    ///
    /// Matches the same way as [`WalletRegistry::get`].
    pub async fn remove(&self, address: &str) -> Result<bool, WalletError> {
        let mut wallets = self.wallets.write().await;
        let next: Vec<Wallet> = wallets
            .iter()
            .filter(|w| !w.matches(address))
            .cloned()
            .collect();

        if next.len() == wallets.len() {
            return Ok(false);
        }

        self.store.save(&next).await?;
        *wallets = next;
        tracing::info!(address = %address, "Wallet removed");

        Ok(true)
    }
}

/// Union `incoming`'s networks into `current`; returns whether anything changed
fn merge_networks(current: &mut Wallet, incoming: &Wallet) -> bool {
    match (current, incoming) {
        (Wallet::Evm { networks, .. }, Wallet::Evm { networks: new, .. }) => {
            let before = networks.len();
            networks.extend(new.iter().copied());
            networks.len() != before
        }
        (Wallet::CosmosSdk { networks, .. }, Wallet::CosmosSdk { networks: new, .. }) => {
            let before = networks.len();
            networks.extend(new.iter().copied());
            networks.len() != before
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::store::MemoryStore;
    use async_trait::async_trait;
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
    use curve25519_dalek::scalar::Scalar;
    use std::sync::atomic::{AtomicBool, Ordering};

    const EVM: &str = "0x52908400098527886E0F7030069857D2E4169EE7";

    fn solana_address() -> String {
        let point = ED25519_BASEPOINT_POINT * Scalar::from(3u64);
        bs58::encode(point.compress().to_bytes()).into_string()
    }

    fn cosmos_address() -> String {
        subtle_encoding::bech32::encode("cosmos", [5u8; 20])
    }

    fn registry() -> (WalletRegistry, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (WalletRegistry::empty(store.clone()), store)
    }

    #[tokio::test]
    async fn test_add_new_wallet() {
        let (registry, store) = registry();
        let (outcome, wallet) = registry
            .add(WalletDraft::new(EVM).network("ethereum"))
            .await
            .unwrap();

        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(wallet.family(), ChainFamily::Evm);
        assert_eq!(registry.len().await, 1);
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_known_address_unions_networks() {
        let (registry, _store) = registry();
        registry
            .add(WalletDraft::new(EVM).network("ethereum"))
            .await
            .unwrap();

        let (outcome, wallet) = registry
            .add(WalletDraft::new(EVM.to_lowercase()).network("polygon").network("ethereum"))
            .await
            .unwrap();

        assert_eq!(outcome, AddOutcome::Merged);
        assert_eq!(registry.len().await, 1);
        match wallet {
            Wallet::Evm { networks, address } => {
                assert_eq!(address, EVM);
                assert!(networks.contains(&EvmChain::Ethereum));
                assert!(networks.contains(&EvmChain::Polygon));
            }
            other => panic!("unexpected wallet {:?}", other),
        }

        let (outcome, _) = registry
            .add(WalletDraft::new(EVM).network("polygon"))
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_solana_wallet_is_immutable() {
        let (registry, _store) = registry();
        let address = solana_address();

        let (outcome, wallet) = registry
            .add(WalletDraft::new(&address).network("ethereum"))
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(wallet, Wallet::Solana { address: address.clone() });

        let (outcome, _) = registry
            .add(WalletDraft::new(&address).network("polygon"))
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome::Unchanged);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_address_and_network() {
        let (registry, _store) = registry();

        let err = registry.add(WalletDraft::new("0x1234")).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidAddress(_)));

        let err = registry
            .add(WalletDraft::new(EVM).network("osmosis"))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnknownNetwork(_)));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_cosmos_networks_parse() {
        let (registry, _store) = registry();
        let (_, wallet) = registry
            .add(WalletDraft::new(cosmos_address()).network("cosmos").network("osmosis"))
            .await
            .unwrap();
        assert_eq!(wallet.chains().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_is_case_insensitive() {
        let (registry, store) = registry();
        registry
            .add(WalletDraft::new(EVM).network("ethereum"))
            .await
            .unwrap();

        assert!(registry.remove(&EVM.to_lowercase()).await.unwrap());
        assert!(!registry.remove(EVM).await.unwrap());
        assert!(registry.is_empty().await);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_hydrates_from_store() {
        let store = Arc::new(MemoryStore::with_wallets(vec![Wallet::Solana {
            address: solana_address(),
        }]));
        let registry = WalletRegistry::load(store).await.unwrap();
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(&solana_address()).await.is_some());
    }

    /// Delegates to a memory store unless told to fail
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl WalletStore for FlakyStore {
        async fn load(&self) -> Result<Vec<Wallet>, WalletError> {
            self.inner.load().await
        }

        async fn save(&self, wallets: &[Wallet]) -> Result<(), WalletError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(WalletError::Store("disk full".to_string()));
            }
            self.inner.save(wallets).await
        }
    }

    #[tokio::test]
    async fn test_failed_save_leaves_registry_unchanged() {
        let store = Arc::new(FlakyStore::default());
        let registry = WalletRegistry::empty(store.clone());

        store.set_failing(true);
        assert!(registry
            .add(WalletDraft::new(EVM).network("ethereum"))
            .await
            .is_err());
        assert!(registry.is_empty().await);

        // the retry must still write, not report Unchanged
        store.set_failing(false);
        let (outcome, _) = registry
            .add(WalletDraft::new(EVM).network("ethereum"))
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(store.load().await.unwrap().len(), 1);

        store.set_failing(true);
        assert!(registry
            .add(WalletDraft::new(EVM).network("polygon"))
            .await
            .is_err());
        assert_eq!(registry.get(EVM).await.unwrap().chains().len(), 1);

        assert!(registry.remove(EVM).await.is_err());
        assert!(registry.get(EVM).await.is_some());

        store.set_failing(false);
        assert!(registry.remove(EVM).await.unwrap());
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_matches_like_get() {
        let (registry, _store) = registry();
        let address = solana_address();
        registry.add(WalletDraft::new(&address)).await.unwrap();

        // base58 is case-sensitive
        let shouted = address.to_uppercase();
        assert!(registry.get(&shouted).await.is_none());
        assert!(!registry.remove(&shouted).await.unwrap());

        assert!(registry.get(&address).await.is_some());
        assert!(registry.remove(&address).await.unwrap());
        assert!(registry.is_empty().await);
    }
}
