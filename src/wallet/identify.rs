//! Address family detection

use curve25519_dalek::edwards::CompressedEdwardsY;
use regex::Regex;
use std::sync::OnceLock;

use super::types::ChainFamily;

/// Shortest valid address of any supported family (Solana)
const MIN_ADDRESS_LEN: usize = 32;

fn evm_address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid regex"))
}

/// Detect which chain family an address belongs to
///
/// Checks in order: `0x` hex (EVM), bech32 (Cosmos-SDK), 32-byte base58
/// ed25519 public key (Solana). Returns `None` when nothing matches.
pub fn identify_address(value: &str) -> Option<ChainFamily> {
    let value = value.trim();
    if value.len() < MIN_ADDRESS_LEN {
        return None;
    }

    if value.starts_with("0x") || value.starts_with("0X") {
        let normalized = format!("0x{}", &value[2..]);
        return evm_address_regex()
            .is_match(&normalized)
            .then_some(ChainFamily::Evm);
    }

    if subtle_encoding::bech32::decode(value).is_ok() {
        return Some(ChainFamily::CosmosSdk);
    }

    let bytes = bs58::decode(value).into_vec().ok()?;
    is_on_curve(&bytes).then_some(ChainFamily::Solana)
}

/// Whether `bytes` is a compressed ed25519 point
///
/// Program-derived addresses are off the curve and cannot sign, so they
/// are not wallets.
fn is_on_curve(bytes: &[u8]) -> bool {
    match <[u8; 32]>::try_from(bytes) {
        Ok(point) => CompressedEdwardsY(point).decompress().is_some(),
        Err(_) => false,
    }
}

/// Re-encode a bech32 account address under another human-readable prefix
///
/// Cosmos-SDK chains share the account key, so one wallet maps onto every
/// chain by swapping the prefix (`cosmos1..` -> `osmo1..`).
pub fn rebech32(address: &str, prefix: &str) -> Option<String> {
    let (_, data) = subtle_encoding::bech32::decode(address).ok()?;
    Some(subtle_encoding::bech32::encode(prefix, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
    use curve25519_dalek::scalar::Scalar;

    fn cosmos_address() -> String {
        subtle_encoding::bech32::encode("cosmos", [7u8; 20])
    }

    fn solana_address() -> String {
        let point = ED25519_BASEPOINT_POINT * Scalar::from(9u64);
        bs58::encode(point.compress().to_bytes()).into_string()
    }

    #[test]
    fn test_identify_evm() {
        assert_eq!(
            identify_address("0x52908400098527886E0F7030069857D2E4169EE7"),
            Some(ChainFamily::Evm)
        );
        assert_eq!(
            identify_address("0x52908400098527886e0f7030069857d2e4169ee7"),
            Some(ChainFamily::Evm)
        );
        // 39 hex digits
        assert_eq!(
            identify_address("0x52908400098527886e0f7030069857d2e4169ee"),
            None
        );
        assert_eq!(
            identify_address("0xZZ908400098527886e0f7030069857d2e4169ee7"),
            None
        );
    }

    #[test]
    fn test_identify_cosmos() {
        assert_eq!(
            identify_address(&cosmos_address()),
            Some(ChainFamily::CosmosSdk)
        );
    }

    #[test]
    fn test_identify_solana() {
        assert_eq!(
            identify_address(&solana_address()),
            Some(ChainFamily::Solana)
        );
    }

    #[test]
    fn test_identify_rejects_off_curve_keys() {
        let off_curve = (0u8..=255)
            .map(|i| [i; 32])
            .find(|bytes| CompressedEdwardsY(*bytes).decompress().is_none())
            .unwrap();

        assert_eq!(identify_address(&bs58::encode(off_curve).into_string()), None);
        // right alphabet, wrong length
        assert_eq!(identify_address(&bs58::encode([1u8; 33]).into_string()), None);
    }

    #[test]
    fn test_identify_rejects_short_and_garbage() {
        assert_eq!(identify_address("0x1234"), None);
        assert_eq!(identify_address(""), None);
        // '0', 'O', 'I' and 'l' are outside the base58 alphabet
        assert_eq!(
            identify_address("O0Il0O0Il0O0Il0O0Il0O0Il0O0Il0O0Il"),
            None
        );
    }

    #[test]
    fn test_rebech32() {
        let cosmos = cosmos_address();
        let osmo = rebech32(&cosmos, "osmo").unwrap();

        assert!(osmo.starts_with("osmo1"));
        assert_eq!(rebech32(&osmo, "cosmos").unwrap(), cosmos);
        assert!(rebech32("not-bech32", "osmo").is_none());
    }
}
