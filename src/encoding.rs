//! Uppercase hexadecimal encoding for digests and signatures.
//!
//! Encoded output is always two uppercase characters per byte with no
//! separators. Decoding accepts either case but rejects odd-length input and
//! any character outside `[0-9A-Fa-f]`.

use crate::error::{Result, SignError};

/// Encode bytes as an uppercase hex string.
pub fn encode_hex<T: AsRef<[u8]>>(bytes: T) -> String {
    hex::encode_upper(bytes)
}

/// Decode a hex string into bytes.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|err| match err {
        hex::FromHexError::OddLength => SignError::InvalidFormat(format!(
            "hex string has odd length {}",
            s.len()
        )),
        hex::FromHexError::InvalidHexCharacter { c, index } => SignError::InvalidFormat(
            format!("invalid hex character {c:?} at position {index}"),
        ),
        other => SignError::InvalidFormat(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_uppercase() {
        assert_eq!(encode_hex([0x00u8, 0xab, 0x1f, 0xff]), "00AB1FFF");
        assert_eq!(encode_hex(b""), "");
    }

    #[test]
    fn test_decode_accepts_both_cases() {
        assert_eq!(decode_hex("00ab1F").unwrap(), vec![0x00, 0xab, 0x1f]);
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        let err = decode_hex("ABC").unwrap_err();
        assert!(matches!(err, SignError::InvalidFormat(_)));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        let err = decode_hex("1Z").unwrap_err();
        match err {
            SignError::InvalidFormat(msg) => assert!(msg.contains("'Z'")),
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[test]
    fn test_decode_rejects_separators() {
        assert!(decode_hex("AB-CD").is_err());
        assert!(decode_hex("AB CD").is_err());
    }

    proptest! {
        #[test]
        fn prop_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let encoded = encode_hex(&bytes);
            prop_assert_eq!(encoded.len(), bytes.len() * 2);
            prop_assert!(encoded.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
            prop_assert_eq!(decode_hex(&encoded).unwrap(), bytes);
        }

        #[test]
        fn prop_odd_length_rejected(s in "[0-9A-Fa-f]{0,63}") {
            let odd = if s.len() % 2 == 0 { format!("{s}0") } else { s };
            prop_assert!(matches!(decode_hex(&odd), Err(SignError::InvalidFormat(_))));
        }

        #[test]
        fn prop_non_hex_rejected(prefix in "([0-9A-F]{2}){0,8}", bad in "[g-zG-Z]") {
            let input = format!("{prefix}{bad}0");
            prop_assert!(matches!(decode_hex(&input), Err(SignError::InvalidFormat(_))));
        }
    }
}
