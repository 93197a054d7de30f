//! Conversion of raw on-chain integer amounts into decimal quantities

/// Convert a `0x`-prefixed hex quantity into a decimal amount
///
/// Accumulates in f64 so 256-bit values never overflow; precision loss
/// beyond 2^53 is acceptable for display purposes.
pub fn hex_to_f64(hex: &str, decimals: u32) -> Option<f64> {
    let digits = hex.trim().trim_start_matches("0x").trim_start_matches("0X");
    if digits.is_empty() {
        return Some(0.0);
    }

    let mut value = 0.0f64;
    for c in digits.chars() {
        let digit = c.to_digit(16)?;
        value = value * 16.0 + digit as f64;
    }

    Some(value / 10f64.powi(decimals as i32))
}

/// Convert a base-10 integer string (Cosmos `amount`, SPL `amount`) into a
/// decimal amount
pub fn decimal_to_f64(amount: &str, decimals: u32) -> Option<f64> {
    let amount = amount.trim();
    if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let raw: f64 = amount.parse().ok()?;
    Some(raw / 10f64.powi(decimals as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_f64() {
        // 1 ETH in wei
        assert_eq!(hex_to_f64("0xde0b6b3a7640000", 18), Some(1.0));
        assert_eq!(hex_to_f64("0x0", 18), Some(0.0));
        assert_eq!(hex_to_f64("0x", 18), Some(0.0));
        assert_eq!(hex_to_f64("0xzz", 18), None);
    }

    #[test]
    fn test_hex_to_f64_wide_word() {
        // 32-byte eth_call result holding 2_500_000 (2.5 USDC)
        let word = format!("0x{:064x}", 2_500_000u64);
        assert_eq!(hex_to_f64(&word, 6), Some(2.5));
    }

    #[test]
    fn test_decimal_to_f64() {
        assert_eq!(decimal_to_f64("1500000", 6), Some(1.5));
        assert_eq!(decimal_to_f64("0", 6), Some(0.0));
        assert_eq!(decimal_to_f64("-5", 6), None);
        assert_eq!(decimal_to_f64("", 6), None);
    }
}
