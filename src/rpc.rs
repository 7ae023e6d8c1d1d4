//! Network seams of the pipeline.
//!
//! The dispatcher only talks to the outside world through these two traits.
//! [`crate::network`] provides HTTP implementations; tests and embedders can
//! supply their own.

use crate::error::RpcError;
use crate::rlp::Bytes;
use crate::utils::unhex;
use crate::{Address, U256};
use serde::Serialize;
use std::future::Future;

/// Parameters of `eth_call` and `eth_estimateGas`.
#[serde_with::serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// Callee; `None` simulates a contract creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Native coin sent along
    #[serde_as(as = "unhex::Quantity")]
    pub value: U256,
    /// Call data
    #[serde_as(as = "unhex::Hex")]
    pub data: Bytes,
}

/// JSON-RPC node of an EVM chain.
pub trait ChainRpc: Send + Sync {
    /// Next nonce of `account`, counting pending transactions.
    fn next_nonce(&self, account: Address) -> impl Future<Output = Result<u64, RpcError>> + Send;

    /// Current gas price in wei.
    fn gas_price(&self) -> impl Future<Output = Result<U256, RpcError>> + Send;

    /// Gas needed to execute `call`.
    fn estimate_gas(
        &self,
        call: &CallRequest,
    ) -> impl Future<Output = Result<u64, RpcError>> + Send;

    /// Execute `call` against the latest block without a transaction.
    fn call(&self, call: &CallRequest) -> impl Future<Output = Result<Bytes, RpcError>> + Send;

    /// Submit a signed transaction; returns its hash.
    fn send_raw_transaction(
        &self,
        raw: &Bytes,
    ) -> impl Future<Output = Result<String, RpcError>> + Send;
}

/// Key-management relay that signs pending transactions later.
pub trait SignerRelay: Send + Sync {
    /// Register a serialized envelope under `signature_id`; returns the
    /// relay acknowledgement id.
    fn register(
        &self,
        transaction: &str,
        signature_id: &str,
    ) -> impl Future<Output = Result<String, RpcError>> + Send;
}
