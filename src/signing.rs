//! Signing credentials and the local/remote signing decision.

use crate::address::{parse_private_key, Address, AddressConvertible, PrivateKey};
use crate::error::{Error, Result};
use crate::rlp::Bytes;
use crate::transactions::UnsignedTransaction;
use crate::utils::encode_hex;
use std::fmt;

/// Who signs the transaction.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Sign in process with this key.
    LocalKey(PrivateKey),
    /// Leave the transaction unsigned for an external signer that knows
    /// this signature request id.
    RemoteSignature(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalKey(_) => f.write_str("LocalKey(<redacted>)"),
            Self::RemoteSignature(id) => f.debug_tuple("RemoteSignature").field(id).finish(),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Credential {
    pub fn from_parts(private_key: Option<&str>, signature_id: Option<&str>) -> Result<Self> {
        //! Build a credential from the two optional wire fields.
        //!
        //! Exactly one of them must be present; empty strings count as
        //! absent.
        match (present(private_key), present(signature_id)) {
            (Some(key), None) => parse_private_key(key).map(Self::LocalKey).map_err(|_| {
                Error::InvalidCredential("fromPrivateKey is not a valid secp256k1 key".into())
            }),
            (None, Some(id)) => Ok(Self::RemoteSignature(id.to_string())),
            (Some(_), Some(_)) => Err(Error::InvalidCredential("both are present".into())),
            (None, None) => Err(Error::InvalidCredential("none is present".into())),
        }
    }

    pub fn sender(&self) -> Option<Address> {
        //! Address of the signer, when it can be derived locally.
        match self {
            Self::LocalKey(key) => Some(key.address()),
            Self::RemoteSignature(_) => None,
        }
    }

    pub fn signature_id(&self) -> Option<&str> {
        //! Signature request id of a remote credential.
        match self {
            Self::LocalKey(_) => None,
            Self::RemoteSignature(id) => Some(id),
        }
    }
}

/// Outcome of the signing step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignedPayload {
    /// Signed legacy transaction, ready for `eth_sendRawTransaction`.
    Raw(Bytes),
    /// Unsigned envelope awaiting an external signer.
    Pending {
        /// Signature request id
        signature_id: String,
        /// The envelope to sign
        transaction: UnsignedTransaction,
    },
}

impl SignedPayload {
    pub const fn is_pending(&self) -> bool {
        //! Whether the payload still needs an external signature.
        matches!(self, Self::Pending { .. })
    }

    pub fn serialize(&self) -> Result<String> {
        //! Wire form: `0x`-prefixed hex for raw transactions, envelope JSON
        //! for pending ones.
        match self {
            Self::Raw(raw) => Ok(encode_hex(raw)),
            Self::Pending { transaction, .. } => serde_json::to_string(transaction)
                .map_err(|e| Error::validation("transaction", e.to_string())),
        }
    }
}

pub fn sign_local(key: &PrivateKey, transaction: &UnsignedTransaction) -> Result<Bytes> {
    //! Sign a resolved envelope with a local key.
    //!
    //! Pure: no I/O, and the key never leaves this function. Nonce, gas and
    //! gas price must be set.
    let legacy = transaction.to_legacy().ok_or_else(|| {
        Error::validation("transaction", "nonce, gas and gas price must be resolved")
    })?;
    let signed = legacy.sign(key);
    tracing::debug!(
        chain_id = signed.chain_id(),
        nonce = signed.nonce,
        "Signed transaction locally"
    );
    Ok(signed.to_broadcastable_bytes())
}

pub fn sign(credential: &Credential, transaction: UnsignedTransaction) -> Result<SignedPayload> {
    //! Sign locally or hand the envelope over for remote signing.
    match credential {
        Credential::LocalKey(key) => sign_local(key, &transaction).map(SignedPayload::Raw),
        Credential::RemoteSignature(id) => {
            tracing::debug!(signature_id = %id, "Deferring to remote signer");
            Ok(SignedPayload::Pending {
                signature_id: id.clone(),
                transaction,
            })
        }
    }
}
