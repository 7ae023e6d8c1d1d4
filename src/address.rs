//! EVM address operations and verifications.

use crate::rlp::{Decodable, Encodable, RLPError};
use crate::utils::{decode_hex, keccak};
use ethereum_types::Address as WrappedAddress;
pub use secp256k1::{PublicKey, SecretKey as PrivateKey};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Deref, DerefMut},
    result::Result,
    str::FromStr,
};

/// EVM account or contract address.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(WrappedAddress);

impl DerefMut for Address {
    fn deref_mut(&mut self) -> &mut WrappedAddress {
        &mut self.0
    }
}
impl Deref for Address {
    type Target = WrappedAddress;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl Encodable for Address {
    fn encode(&self, out: &mut dyn crate::rlp::BufMut) {
        bytes::Bytes::copy_from_slice(self.0.as_bytes()).encode(out)
    }
}
impl Decodable for Address {
    fn decode(buf: &mut &[u8]) -> Result<Self, RLPError> {
        let bytes = bytes::Bytes::decode(buf)?;
        if bytes.len() != Self::WIDTH {
            return Err(RLPError::UnexpectedLength);
        }
        Ok(Self(WrappedAddress::from_slice(&bytes)))
    }
}
impl FromStr for Address {
    type Err = AddressValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim();
        let body = body.strip_prefix("0x").unwrap_or(body);
        if body.len() != Self::WIDTH * 2 {
            return Err(AddressValidationError::InvalidLength(body.len()));
        }
        let bytes = decode_hex(body).map_err(|_| AddressValidationError::InvalidHex)?;
        Ok(Self(WrappedAddress::from_slice(&bytes)))
    }
}
impl<T: Into<WrappedAddress>> From<T> for Address {
    fn from(s: T) -> Self {
        Self(s.into())
    }
}
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum_address())
    }
}

impl Address {
    /// Size of underlying array in bytes.
    pub const WIDTH: usize = 20;

    pub fn to_hex(&self) -> String {
        //! Encode as a lowercase hex string with `0x` prefix.
        format!("{:#x}", self.0)
    }

    pub fn to_checksum_address(&self) -> String {
        //! Create a checksum address (EIP-55)

        let body = self.to_hex();
        let hash = keccak(&body[2..42]);

        "0x".chars()
            .chain(
                body.chars()
                    .skip(2)
                    .zip(itertools::interleave(
                        hash.iter().map(|x| x >> 4),
                        hash.iter().map(|x| x & 15),
                    ))
                    .map(|(ch, h)| if h >= 8 { ch.to_ascii_uppercase() } else { ch }),
            )
            .collect()
    }

    pub const fn inner(&self) -> WrappedAddress {
        //! Underlying `ethereum-types` address, as used by the ABI codec.
        self.0
    }
}

/// Address parsing errors
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum AddressValidationError {
    /// Address body must be exactly 40 hex characters.
    #[error("Address must have 40 hex characters, got {0}")]
    InvalidLength(usize),
    /// Non-hex characters found.
    #[error("Address contains non-hex characters")]
    InvalidHex,
}

/// A trait for objects that can generate an on-chain address.
pub trait AddressConvertible {
    /// Create an address
    fn address(&self) -> Address;
}

impl AddressConvertible for PublicKey {
    fn address(&self) -> Address {
        //! Generate address from public key.
        // Get rid of the 0x04 (first byte) at the beginning.
        let hash = keccak(&self.serialize_uncompressed()[1..]);
        // last 20 bytes from the 32 bytes hash.
        Address(WrappedAddress::from_slice(&hash[12..32]))
    }
}

impl AddressConvertible for PrivateKey {
    fn address(&self) -> Address {
        //! Generate address of the account controlled by this key.
        let secp = secp256k1::Secp256k1::signing_only();
        PublicKey::from_secret_key(&secp, self).address()
    }
}

pub fn parse_private_key(hex: &str) -> Result<PrivateKey, secp256k1::Error> {
    //! Parse a 32-byte private key from hex, with or without `0x` prefix.
    let bytes = decode_hex(hex).map_err(|_| secp256k1::Error::InvalidSecretKey)?;
    PrivateKey::from_slice(&bytes)
}
