//! Hashing and hex helpers.

use rustc_hex::{FromHex, FromHexError, ToHex};
use tiny_keccak::{Hasher, Keccak};

pub fn keccak<S: AsRef<[u8]>>(bytes: S) -> [u8; 32] {
    //! Compute Keccak-256 hash (the Ethereum flavour, not SHA3-256).
    let mut hasher = Keccak::v256();
    hasher.update(bytes.as_ref());
    let mut hash = [0; 32];
    hasher.finalize(&mut hash);
    hash
}

pub fn encode_hex<S: AsRef<[u8]>>(bytes: S) -> String {
    //! Encode bytes as a lowercase hex string with `0x` prefix.
    format!("0x{}", bytes.as_ref().to_hex::<String>())
}

pub fn decode_hex(hex: &str) -> Result<Vec<u8>, FromHexError> {
    //! Decode a hex string, with or without `0x` prefix.
    //!
    //! Odd-length input is treated as if it had a leading zero nibble.
    let body = hex.trim();
    let body = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
        .unwrap_or(body);
    if body.len() % 2 == 1 {
        format!("0{body}").from_hex()
    } else {
        body.from_hex()
    }
}

/// `serde_with` adapters for hex-encoded JSON values.
pub mod unhex {
    use super::{decode_hex, encode_hex};
    use crate::U256;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use serde_with::{DeserializeAs, SerializeAs};

    /// Byte string as `0x`-prefixed hex.
    pub struct Hex;

    impl<T: AsRef<[u8]>> SerializeAs<T> for Hex {
        fn serialize_as<S: Serializer>(source: &T, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&encode_hex(source))
        }
    }

    impl<'de, T: From<Vec<u8>>> DeserializeAs<'de, T> for Hex {
        fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
            let text = String::deserialize(deserializer)?;
            decode_hex(&text).map(T::from).map_err(D::Error::custom)
        }
    }

    /// Integer quantity as `0x`-prefixed hex without leading zeros.
    ///
    /// Decimal JSON numbers and decimal strings are accepted on input.
    pub struct Quantity;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    impl SerializeAs<u64> for Quantity {
        fn serialize_as<S: Serializer>(source: &u64, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&format!("0x{source:x}"))
        }
    }

    impl<'de> DeserializeAs<'de, u64> for Quantity {
        fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
            match NumberOrString::deserialize(deserializer)? {
                NumberOrString::Number(n) => Ok(n),
                NumberOrString::Text(text) => {
                    let text = text.trim();
                    match text.strip_prefix("0x") {
                        Some(hex) if hex.is_empty() => Ok(0),
                        Some(hex) => u64::from_str_radix(hex, 16).map_err(D::Error::custom),
                        None => text.parse().map_err(D::Error::custom),
                    }
                }
            }
        }
    }

    impl SerializeAs<U256> for Quantity {
        fn serialize_as<S: Serializer>(source: &U256, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&format!("{source:#x}"))
        }
    }

    impl<'de> DeserializeAs<'de, U256> for Quantity {
        fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
            match NumberOrString::deserialize(deserializer)? {
                NumberOrString::Number(n) => Ok(U256::from(n)),
                NumberOrString::Text(text) => {
                    let text = text.trim();
                    match text.strip_prefix("0x") {
                        Some(hex) if hex.is_empty() => Ok(U256::zero()),
                        Some(hex) => U256::from_str_radix(hex, 16).map_err(D::Error::custom),
                        None => U256::from_dec_str(text).map_err(D::Error::custom),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            encode_hex(keccak(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[serde_with::serde_as]
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Quantities {
        #[serde_as(as = "unhex::Quantity")]
        small: u64,
        #[serde_as(as = "unhex::Quantity")]
        big: crate::U256,
        #[serde_as(as = "unhex::Hex")]
        data: Vec<u8>,
    }

    #[test]
    fn test_quantity_adapters() {
        let parsed: Quantities =
            serde_json::from_str(r#"{"small": "0x1a", "big": "1000", "data": "0xdead"}"#)
                .expect("Must parse");
        assert_eq!(
            parsed,
            Quantities {
                small: 26,
                big: crate::U256::from(1000),
                data: vec![0xde, 0xad],
            }
        );
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"{"small":"0x1a","big":"0x3e8","data":"0xdead"}"#
        );

        let parsed: Quantities =
            serde_json::from_str(r#"{"small": 7, "big": "0x", "data": ""}"#).expect("Must parse");
        assert_eq!(parsed.small, 7);
        assert!(parsed.big.is_zero());
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_decode_hex_variants() {
        assert_eq!(decode_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0x102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
        assert!(decode_hex("0xzz").is_err());
    }
}
