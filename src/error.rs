//! Error taxonomy of the transaction pipeline.
//!
//! Every failure reaches the caller of the dispatcher unchanged. Nothing is
//! retried internally; [`Error::is_retryable`] tells the caller which kinds
//! are worth retrying as-is.

use crate::units::UnitsError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a network round-trip (chain RPC or signer relay).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RpcError {
    /// Connection, TLS or HTTP status failure.
    #[error("Transport failure: {0}")]
    Transport(String),
    /// The remote end answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message as returned by the node
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Pipeline failure, distinguishable by kind.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or incomplete request, detected before any I/O.
    #[error("Invalid field `{field}`: {reason}")]
    Validation {
        /// Path of the offending field, e.g. `to[2]`
        field: String,
        /// Human-readable reason
        reason: String,
    },
    /// Zero or two signing credentials present.
    #[error("Exactly one of fromPrivateKey or signatureId must be present: {0}")]
    InvalidCredential(String),
    /// Non-numeric or malformed decimal amount.
    #[error("Invalid amount in `{field}`: {source}")]
    InvalidAmount {
        /// Path of the offending field
        field: String,
        /// Parsing failure
        #[source]
        source: UnitsError,
    },
    /// Batch arrays of different length.
    #[error("Length of `{field}` is {got}, expected {expected}")]
    ArityMismatch {
        /// Path of the offending array
        field: String,
        /// Length of the reference array
        expected: usize,
        /// Actual length
        got: usize,
    },
    /// Operation or method missing from the catalog or the contract interface.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// Contract read call (e.g. `decimals()`) failed.
    #[error("Contract query failed: {0}")]
    ContractQuery(#[source] RpcError),
    /// Nonce, gas price or gas limit query failed.
    #[error("Failed to estimate transaction parameters: {0}")]
    Estimation(#[source] RpcError),
    /// Final submission failed.
    #[error("Failed to broadcast: {0}")]
    Broadcast(#[source] RpcError),
    /// Contract ABI or bytecode could not be loaded, or a deployment has no
    /// bytecode.
    #[error("Invalid contract artifact `{name}`: {reason}")]
    Artifact {
        /// Artifact name, e.g. `erc20`
        name: String,
        /// Human-readable reason
        reason: String,
    },
}

/// Fieldless discriminant of [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::InvalidCredential`]
    InvalidCredential,
    /// See [`Error::InvalidAmount`]
    InvalidAmount,
    /// See [`Error::ArityMismatch`]
    ArityMismatch,
    /// See [`Error::UnsupportedOperation`]
    UnsupportedOperation,
    /// See [`Error::ContractQuery`]
    ContractQuery,
    /// See [`Error::Estimation`]
    Estimation,
    /// See [`Error::Broadcast`]
    Broadcast,
    /// See [`Error::Artifact`]
    Artifact,
}

impl Error {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn amount(field: impl Into<String>, source: UnitsError) -> Self {
        Self::InvalidAmount {
            field: field.into(),
            source,
        }
    }

    pub(crate) fn artifact(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Artifact {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        //! Kind of this error, for matching without destructuring.
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::InvalidCredential(_) => ErrorKind::InvalidCredential,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::ContractQuery(_) => ErrorKind::ContractQuery,
            Self::Estimation(_) => ErrorKind::Estimation,
            Self::Broadcast(_) => ErrorKind::Broadcast,
            Self::Artifact { .. } => ErrorKind::Artifact,
        }
    }

    pub const fn is_retryable(&self) -> bool {
        //! Whether resending the same request may succeed.
        //!
        //! Only failures of external calls qualify; input errors never do.
        matches!(
            self.kind(),
            ErrorKind::ContractQuery | ErrorKind::Estimation | ErrorKind::Broadcast
        )
    }
}
