//! RLP encoding of high-level objects.
//!
//! RLP (recursive length prefix) is the serialization used for EVM
//! transactions: both the payload hashed for signing and the raw bytes
//! sent to `eth_sendRawTransaction` are RLP lists.
//!
//! Primary RLP only knows two kinds of items: byte strings and lists of
//! items. Everything else (integers, addresses, optional recipients) must be
//! mapped onto those two. This module wraps [`open-fastrlp`](https://docs.rs/open-fastrlp)
//! and adds a declarative way to describe such mappings:
//!
//! ```rust
//! use multichain_devkit::rlp::{AsBytes, Bytes, Quantity};
//! use multichain_devkit::{rlp_encodable, Address, U256};
//!
//! rlp_encodable! {
//!     /// A legacy EVM transaction body.
//!     #[derive(Clone, Debug, Eq, PartialEq)]
//!     pub struct Body {
//!         pub nonce: u64,
//!         pub gas_price: U256 => Quantity,
//!         pub gas: u64,
//!         pub to: Option<Address> => AsBytes<Address>,
//!         pub value: U256 => Quantity,
//!         pub data: Bytes,
//!     }
//! }
//! ```
//!
//! A field annotated with `=> T` is converted into `T` (via [`From`]) before
//! encoding and converted back after decoding. [`Quantity`] encodes a `U256`
//! as a big-endian byte string without leading zeros. [`AsBytes`] encodes
//! `None` as an empty byte string, which is how a contract-creation
//! transaction spells its missing recipient.

pub use bytes::{Buf, BufMut, Bytes, BytesMut};
pub use open_fastrlp::{Decodable, DecodeError as RLPError, Encodable, Header};

use crate::U256;

/// Convenience alias for a result of fallible RLP decoding.
pub type RLPResult<T> = Result<T, RLPError>;

/// Encoding of the empty byte string.
pub const EMPTY_STRING_CODE: u8 = 0x80;
/// Encoding of the empty list.
pub const EMPTY_LIST_CODE: u8 = 0xC0;

#[doc(hidden)]
#[macro_export]
macro_rules! __encode_as {
    ($out:expr, $field:expr) => {
        $field.encode($out);
    };
    ($out:expr, $field:expr => $cast:ty) => {
        <$cast>::from($field.clone()).encode($out);
    };

    ($out:expr, $field:expr $(=> $cast:ty)?, $($fields:expr $(=> $casts:ty)?),+) => {
        $crate::__encode_as! { $out, $field $(=> $cast)? }
        $crate::__encode_as! { $out, $($fields $(=> $casts)?),+ }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __decode_as {
    ($buf:expr, $field:ty) => {
        <$field>::decode($buf)?
    };
    ($buf:expr, $field:ty => $cast:ty) => {
        <$field>::from(<$cast>::decode($buf)?)
    };
}

/// Create an RLP-encodable struct by specifying types to cast to.
#[macro_export]
macro_rules! rlp_encodable {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field_name:ident: $field_type:ty $(=> $cast:ty)?,
            )*
        }
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $(
                $(#[$field_attr])*
                $field_vis $field_name: $field_type,
            )*
        }

        impl $name {
            fn encode_internal(&self, out: &mut dyn $crate::rlp::BufMut) {
                use $crate::rlp::Encodable;
                $crate::__encode_as!(out, $(self.$field_name $(=> $cast)?),+);
            }
        }

        impl $crate::rlp::Encodable for $name {
            fn encode(&self, out: &mut dyn $crate::rlp::BufMut) {
                let mut buf = $crate::rlp::BytesMut::new();
                self.encode_internal(&mut buf);
                $crate::rlp::Header {
                    list: true,
                    payload_length: buf.len()
                }.encode(out);
                out.put_slice(&buf)
            }
        }

        impl $crate::rlp::Decodable for $name {
            fn decode(buf: &mut &[u8]) -> $crate::rlp::RLPResult<Self> {
                #[allow(unused_imports)]
                use $crate::rlp::Decodable;
                let header = $crate::rlp::Header::decode(buf)?;
                if !header.list {
                    return Err($crate::rlp::RLPError::UnexpectedString);
                }
                Ok(Self {
                    $($field_name: $crate::__decode_as!(buf, $field_type $(=> $cast)? )),*
                })
            }
        }
    }
}

/// Serialization wrapper for `Option` to serialize `None` as empty `Bytes`.
///
/// <div class="warning">
///  Do not use it directly: it is only intended for use with `rlp_encodable!` macro.
/// </div>
#[allow(clippy::manual_non_exhaustive)]
pub enum AsBytes<T: Encodable + Decodable> {
    #[doc(hidden)]
    Just(T),
    #[doc(hidden)]
    Nothing,
}

impl<T: Encodable + Decodable, S: Into<T>> From<Option<S>> for AsBytes<T> {
    fn from(value: Option<S>) -> Self {
        match value {
            Some(v) => Self::Just(v.into()),
            None => Self::Nothing,
        }
    }
}
impl<T: Encodable + Decodable> From<AsBytes<T>> for Option<T> {
    fn from(value: AsBytes<T>) -> Self {
        match value {
            AsBytes::Just(v) => Some(v),
            AsBytes::Nothing => None,
        }
    }
}

impl<T: Encodable + Decodable> Encodable for AsBytes<T> {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Self::Just(value) => value.encode(out),
            Self::Nothing => Bytes::new().encode(out),
        }
    }
}
impl<T: Encodable + Decodable> Decodable for AsBytes<T> {
    fn decode(buf: &mut &[u8]) -> RLPResult<Self> {
        match buf.first() {
            None => Err(RLPError::InputTooShort),
            Some(&EMPTY_STRING_CODE) => {
                Bytes::decode(buf)?;
                Ok(Self::Nothing)
            }
            Some(_) => Ok(Self::Just(T::decode(buf)?)),
        }
    }
}

/// Serialization wrapper for 256-bit integers: big-endian, no leading zeros.
///
/// Zero is the empty byte string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quantity(pub U256);

impl From<U256> for Quantity {
    fn from(value: U256) -> Self {
        Self(value)
    }
}
impl From<Quantity> for U256 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

impl Encodable for Quantity {
    fn encode(&self, out: &mut dyn BufMut) {
        let mut be = [0u8; 32];
        self.0.to_big_endian(&mut be);
        Bytes::from(lstrip(be)).encode(out)
    }
}
impl Decodable for Quantity {
    fn decode(buf: &mut &[u8]) -> RLPResult<Self> {
        let bytes = Bytes::decode(buf)?;
        if bytes.len() > 32 {
            return Err(RLPError::Overflow);
        }
        if bytes.first() == Some(&0) {
            return Err(RLPError::LeadingZero);
        }
        Ok(Self(U256::from_big_endian(&bytes)))
    }
}

#[inline]
pub(crate) fn lstrip<S: AsRef<[u8]>>(bytes: S) -> Vec<u8> {
    bytes
        .as_ref()
        .iter()
        .skip_while(|&&x| x == 0)
        .copied()
        .collect()
}
