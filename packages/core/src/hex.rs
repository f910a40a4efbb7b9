//! Decoding of the node's `0x`-prefixed hexadecimal quantities.

use crate::estimator::error::EstimatorError;

const HEX_PREFIX: &str = "0x";

/// Decode a `0x`-prefixed hex quantity into an integer.
///
/// The remainder after the prefix must be a non-empty run of hex digits
/// that fits in a `u128`.
pub fn decode(value: &str) -> Result<u128, EstimatorError> {
    let digits = value
        .strip_prefix(HEX_PREFIX)
        .ok_or_else(|| EstimatorError::malformed_hex(value))?;

    // from_str_radix accepts a leading '+', which is not a valid quantity
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EstimatorError::malformed_hex(value));
    }

    u128::from_str_radix(digits, 16).map_err(|_| EstimatorError::malformed_hex(value))
}

/// Decode a hex quantity that must fit in a `u64`, such as a block number.
pub fn decode_u64(value: &str) -> Result<u64, EstimatorError> {
    let decoded = decode(value)?;
    u64::try_from(decoded).map_err(|_| EstimatorError::malformed_hex(value))
}

/// Encode an integer as a lowercase `0x`-prefixed hex quantity.
pub fn encode(value: u128) -> String {
    format!("{HEX_PREFIX}{value:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_reward_values() {
        assert_eq!(decode("0x59682f00").unwrap(), 1_500_000_000);
        assert_eq!(decode("0x77359400").unwrap(), 2_000_000_000);
        assert_eq!(decode("0x4d2cda487").unwrap(), 20_716_561_543);
    }

    #[test]
    fn decodes_zero() {
        assert_eq!(decode("0x0").unwrap(), 0);
    }

    #[test]
    fn accepts_uppercase_digits() {
        assert_eq!(decode("0xFF").unwrap(), 255);
    }

    #[test]
    fn rejects_missing_prefix() {
        assert!(matches!(
            decode("59682f00"),
            Err(EstimatorError::MalformedHex { .. })
        ));
    }

    #[test]
    fn rejects_empty_digits() {
        assert!(decode("0x").is_err());
    }

    #[test]
    fn rejects_non_hex_digits() {
        assert!(decode("0x12zz").is_err());
        assert!(decode("0x+5").is_err());
        assert!(decode("0x-5").is_err());
    }

    #[test]
    fn rejects_values_wider_than_u128() {
        let too_wide = format!("0x1{}", "0".repeat(32));
        assert!(decode(&too_wide).is_err());
    }

    #[test]
    fn decode_u64_rejects_values_wider_than_u64() {
        assert_eq!(decode_u64("0xdb7a7d").unwrap(), 14_383_741);
        assert!(decode_u64("0x10000000000000000").is_err());
    }

    #[test]
    fn encode_is_lowercase_and_prefixed() {
        assert_eq!(encode(0), "0x0");
        assert_eq!(encode(255), "0xff");
    }

    proptest! {
        #[test]
        fn decode_inverts_encode_for_u64(value in any::<u64>()) {
            prop_assert_eq!(decode(&encode(value as u128)).unwrap(), value as u128);
        }

        #[test]
        fn decode_inverts_lowercase_format(value in any::<u128>()) {
            let encoded = format!("0x{:x}", value);
            prop_assert_eq!(decode(&encoded).unwrap(), value);
        }
    }
}
