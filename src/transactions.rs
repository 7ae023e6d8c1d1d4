//! EVM transactions: the unsigned envelope and legacy (EIP-155) encoding.

use crate::address::{Address, AddressConvertible, PrivateKey, PublicKey};
use crate::rlp::{AsBytes, Bytes, Decodable, Encodable, Quantity, RLPResult};
use crate::utils::{keccak, unhex};
use crate::{rlp_encodable, U256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1, ThirtyTwoByteHash};
use serde::{Deserialize, Serialize};

/// Transaction that is not signed yet.
///
/// Serializes to the `TransactionConfig` shape understood by web3 signers:
/// hex quantities, camelCase names, absent values omitted.
#[serde_with::serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    /// Sender, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Recipient; `None` creates a contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Native coin to transfer, in wei
    #[serde_as(as = "unhex::Quantity")]
    #[serde(default)]
    pub value: U256,
    /// Call data or creation code
    #[serde_as(as = "unhex::Hex")]
    #[serde(default)]
    pub data: Bytes,
    /// Sender nonce; left for the signer when the sender is unknown
    #[serde_as(as = "Option<unhex::Quantity>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Gas limit
    #[serde_as(as = "Option<unhex::Quantity>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    /// Gas price in wei
    #[serde_as(as = "Option<unhex::Quantity>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// EIP-155 chain id
    #[serde(default)]
    pub chain_id: u64,
}

impl UnsignedTransaction {
    pub const fn is_complete(&self) -> bool {
        //! Whether nonce, gas and gas price are all known.
        self.nonce.is_some() && self.gas.is_some() && self.gas_price.is_some()
    }

    pub fn to_legacy(&self) -> Option<LegacyTransaction> {
        //! Legacy transaction body, if every parameter is resolved.
        Some(LegacyTransaction {
            nonce: self.nonce?,
            gas_price: self.gas_price?,
            gas: self.gas?,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            v: self.chain_id,
            r: U256::zero(),
            s: U256::zero(),
        })
    }
}

rlp_encodable! {
    /// Legacy transaction, signed or not.
    ///
    /// Before signing `v` holds the chain id and `r`, `s` are zero, which is
    /// exactly the EIP-155 signing payload.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct LegacyTransaction {
        /// Sender nonce
        pub nonce: u64,
        /// Gas price in wei
        pub gas_price: U256 => Quantity,
        /// Gas limit
        pub gas: u64,
        /// Recipient; `None` creates a contract
        pub to: Option<Address> => AsBytes<Address>,
        /// Native coin to transfer, in wei
        pub value: U256 => Quantity,
        /// Call data or creation code
        pub data: Bytes,
        /// Recovery id with chain id folded in
        pub v: u64,
        /// Signature `r`
        pub r: U256 => Quantity,
        /// Signature `s`
        pub s: U256 => Quantity,
    }
}

struct Digest([u8; 32]);

impl ThirtyTwoByteHash for Digest {
    fn into_32(self) -> [u8; 32] {
        self.0
    }
}

impl LegacyTransaction {
    /// Offset added to the recovery id by EIP-155 (on top of `2 * chain_id`).
    pub const EIP155_OFFSET: u64 = 35;

    pub fn is_signed(&self) -> bool {
        //! Whether signature fields are populated.
        !self.r.is_zero() && !self.s.is_zero()
    }

    pub fn chain_id(&self) -> u64 {
        //! Chain id this transaction is bound to.
        //!
        //! An unsigned body keeps the chain id in `v` as is; a signed one has
        //! the recovery id and [`Self::EIP155_OFFSET`] folded in.
        if self.is_signed() && self.v >= Self::EIP155_OFFSET {
            (self.v - Self::EIP155_OFFSET) / 2
        } else {
            self.v
        }
    }

    fn signing_payload(&self) -> Self {
        Self {
            v: self.chain_id(),
            r: U256::zero(),
            s: U256::zero(),
            ..self.clone()
        }
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        //! Hash that is signed by the sender (EIP-155).
        let mut buf = vec![];
        self.signing_payload().encode(&mut buf);
        keccak(buf)
    }

    #[must_use]
    pub fn sign(self, private_key: &PrivateKey) -> Self {
        //! Sign with the given key. An existing signature is replaced.
        let chain_id = self.chain_id();
        let message = Message::from(Digest(self.signing_hash()));
        let secp = Secp256k1::signing_only();
        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&message, private_key)
            .serialize_compact();
        Self {
            v: recovery_id.to_i32() as u64 + chain_id * 2 + Self::EIP155_OFFSET,
            r: U256::from_big_endian(&compact[..32]),
            s: U256::from_big_endian(&compact[32..]),
            ..self
        }
    }

    pub fn to_broadcastable_bytes(&self) -> Bytes {
        //! RLP bytes accepted by `eth_sendRawTransaction`.
        let mut buf = vec![];
        self.encode(&mut buf);
        buf.into()
    }

    pub fn decode_raw(raw: &[u8]) -> RLPResult<Self> {
        //! Decode a raw transaction produced by [`LegacyTransaction::to_broadcastable_bytes`].
        Self::decode(&mut &raw[..])
    }

    pub fn hash(&self) -> [u8; 32] {
        //! Transaction hash, as reported by the chain.
        keccak(self.to_broadcastable_bytes())
    }

    pub fn public_key(&self) -> Result<PublicKey, secp256k1::Error> {
        //! Recover the public key of the signer.
        let recovery = self
            .v
            .checked_sub(self.chain_id() * 2 + Self::EIP155_OFFSET)
            .ok_or(secp256k1::Error::InvalidRecoveryId)?;
        let recovery_id = RecoveryId::from_i32(recovery as i32)?;
        let mut compact = [0u8; 64];
        self.r.to_big_endian(&mut compact[..32]);
        self.s.to_big_endian(&mut compact[32..]);
        let signature = RecoverableSignature::from_compact(&compact, recovery_id)?;
        let message = Message::from(Digest(self.signing_hash()));
        Secp256k1::verification_only().recover_ecdsa(&message, &signature)
    }

    pub fn recover_sender(&self) -> Result<Address, secp256k1::Error> {
        //! Recover the address of the signer.
        self.public_key().map(|key| key.address())
    }
}
