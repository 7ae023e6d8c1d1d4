//! The single entry point of the crate.
//!
//! A [`Dispatcher`] runs every request through the same pipeline:
//!
//! 1. schema validation ([`OperationRequest::validate`]), no I/O;
//! 2. call encoding, which parses every address and amount;
//! 3. `decimals()` lookup, only for ERC-20 amounts without `digits`;
//! 4. assembly: nonce, gas price, gas limit;
//! 5. local signing, or handing the envelope to a remote signer;
//! 6. on [`Dispatcher::send`], submission to the chain or the relay.
//!
//! Requests are independent; the dispatcher holds no mutable state and can
//! be cloned freely between tasks.

use crate::address::{parse_private_key, Address, AddressConvertible, AddressValidationError};
use crate::broadcast::Broadcaster;
use crate::catalog::{OperationRequest, ReadMethodInvocation};
use crate::config::ChainProfile;
use crate::contracts::{ContractKind, ContractRegistry};
use crate::encoder::{CallEncoder, Encoding, MethodCall};
use crate::error::{Error, Result, RpcError};
use crate::rlp::Bytes;
use crate::rpc::{CallRequest, ChainRpc, SignerRelay};
use crate::signing::{self, SignedPayload};
use crate::transaction_builder::TransactionBuilder;
use crate::transactions::UnsignedTransaction;
use crate::units::MAX_SCALE;
use crate::U256;
use ethabi::Token;
use std::sync::Arc;

#[cfg(feature = "http")]
use crate::config::ClientConfig;
#[cfg(feature = "http")]
use crate::network::{RelayClient, Web3Node};

/// Transaction pipeline bound to one chain.
#[derive(Debug)]
pub struct Dispatcher<R, K> {
    profile: Arc<ChainProfile>,
    rpc: Arc<R>,
    relay: Arc<K>,
    encoder: CallEncoder,
}

impl<R, K> Clone for Dispatcher<R, K> {
    fn clone(&self) -> Self {
        Self {
            profile: Arc::clone(&self.profile),
            rpc: Arc::clone(&self.rpc),
            relay: Arc::clone(&self.relay),
            encoder: self.encoder.clone(),
        }
    }
}

impl<R: ChainRpc, K: SignerRelay> Dispatcher<R, K> {
    pub fn new(
        profile: ChainProfile,
        registry: Arc<ContractRegistry>,
        rpc: Arc<R>,
        relay: Arc<K>,
    ) -> Self {
        //! Wire a pipeline from its collaborators.
        let encoder = CallEncoder::new(registry, profile.native_decimals);
        Self {
            profile: Arc::new(profile),
            rpc,
            relay,
            encoder,
        }
    }

    pub fn profile(&self) -> &ChainProfile {
        //! Chain this dispatcher targets.
        &self.profile
    }

    pub fn encoder(&self) -> &CallEncoder {
        //! Operation encoder in use.
        &self.encoder
    }

    pub async fn prepare(&self, request: &OperationRequest) -> Result<SignedPayload> {
        //! Validate, encode, assemble and sign a request without submitting
        //! it.
        //!
        //! Any validation failure is reported before the first network call.
        let operation = request.kind();
        request.validate()?;
        let fee = request.fee.clone().unwrap_or_default();
        let gas_price = fee.gas_price_wei()?;
        let sender = request.credential.sender();

        let call = match self.encoder.encode_operation(&request.operation, sender)? {
            Encoding::Ready(call) => call,
            Encoding::AwaitingDecimals(pending) => {
                let decimals = self.erc20_decimals(pending.token()).await?;
                tracing::debug!(%operation, decimals, "Resolved token scale");
                pending.finish(decimals)?
            }
        };
        tracing::debug!(
            %operation,
            chain = self.profile.name,
            contract_creation = call.to.is_none(),
            "Encoded operation"
        );

        let transaction = TransactionBuilder::new(self.rpc.as_ref(), &self.profile)
            .sender(sender)
            .to(call.to)
            .value(call.value)
            .data(call.data)
            .nonce(request.nonce)
            .gas(fee.gas_limit)
            .gas_price(gas_price)
            .build()
            .await?;
        signing::sign(&request.credential, transaction)
    }

    pub async fn submit(&self, payload: &SignedPayload) -> Result<String> {
        //! Broadcast a signed payload, or register a pending one with the
        //! signer relay.
        Broadcaster::new(self.rpc.as_ref(), self.relay.as_ref())
            .submit(payload)
            .await
    }

    pub async fn send(&self, request: &OperationRequest) -> Result<String> {
        //! Run the whole pipeline.
        //!
        //! Returns the transaction hash for locally signed requests and the
        //! relay acknowledgement id for remote ones.
        let payload = self.prepare(request).await?;
        self.submit(&payload).await
    }

    pub async fn send_json(&self, request: &str) -> Result<String> {
        //! [`Dispatcher::send`] for a request in wire format.
        self.send(&OperationRequest::from_json(request)?).await
    }

    pub async fn erc20_decimals(&self, token: Address) -> Result<u32> {
        //! Query `decimals()` of an ERC-20 contract.
        let descriptor = self.encoder.registry().descriptor(ContractKind::Erc20)?;
        let function = descriptor.function("decimals")?;
        let request = CallRequest {
            to: Some(token),
            data: descriptor.encode_call("decimals", &[])?,
            ..CallRequest::default()
        };
        let output = self.rpc.call(&request).await.map_err(|e| {
            tracing::warn!(error = %e, token = %token.to_hex(), "decimals() query failed");
            Error::ContractQuery(e)
        })?;
        let decoded = function
            .decode_output(&output)
            .map_err(|e| Error::ContractQuery(RpcError::Decode(e.to_string())))?;
        match decoded.first() {
            Some(Token::Uint(decimals)) if *decimals <= U256::from(MAX_SCALE) => {
                Ok(decimals.as_u32())
            }
            _ => Err(Error::ContractQuery(RpcError::Decode(format!(
                "decimals() of {} returned {decoded:?}",
                token.to_hex()
            )))),
        }
    }

    pub async fn invoke_read(&self, invocation: &ReadMethodInvocation) -> Result<Vec<Token>> {
        //! Call a contract method through `eth_call` and decode its output.
        //!
        //! No credential is involved and nothing is signed.
        let contract: Address = invocation
            .contract_address
            .trim()
            .parse()
            .map_err(|e: AddressValidationError| {
                Error::validation("contractAddress", e.to_string())
            })?;
        let call = MethodCall::resolve(
            &invocation.method_abi,
            &invocation.method_name,
            &invocation.params,
        )?;
        if !call.is_read_only() {
            tracing::debug!(
                method = %invocation.method_name,
                "Simulating a state-changing method"
            );
        }
        let request = CallRequest {
            to: Some(contract),
            data: call.encode()?,
            ..CallRequest::default()
        };
        let output = self.rpc.call(&request).await.map_err(|e| {
            tracing::warn!(error = %e, method = %invocation.method_name, "eth_call failed");
            Error::ContractQuery(e)
        })?;
        call.decode_output(&output)
    }

    pub async fn sign_pending(&self, envelope: &str, private_key: &str) -> Result<Bytes> {
        //! Complete and sign an envelope produced for a remote signer.
        //!
        //! A missing nonce and a missing or zero gas limit or gas price are
        //! resolved the same way [`Dispatcher::prepare`] resolves them, using the key's
        //! address as sender. The result is ready for
        //! [`SignedPayload::Raw`].
        let key = parse_private_key(private_key.trim()).map_err(|_| {
            Error::InvalidCredential("private key is not a valid secp256k1 key".into())
        })?;
        let pending: UnsignedTransaction = serde_json::from_str(envelope)
            .map_err(|e| Error::validation("transaction", e.to_string()))?;
        if pending.chain_id != self.profile.chain_id {
            return Err(Error::validation(
                "chainId",
                format!(
                    "envelope targets chain {}, dispatcher is bound to {}",
                    pending.chain_id, self.profile.chain_id
                ),
            ));
        }
        let transaction = TransactionBuilder::new(self.rpc.as_ref(), &self.profile)
            .sender(Some(key.address()))
            .to(pending.to)
            .value(pending.value)
            .data(pending.data)
            .nonce(pending.nonce)
            .gas(pending.gas.filter(|gas| *gas != 0))
            .gas_price(pending.gas_price.filter(|price| !price.is_zero()))
            .build()
            .await?;
        signing::sign_local(&key, &transaction)
    }
}

#[cfg(feature = "http")]
impl Dispatcher<Web3Node, RelayClient> {
    pub fn connect(
        config: &ClientConfig,
        profile: ChainProfile,
        registry: Arc<ContractRegistry>,
    ) -> Result<Self> {
        //! Dispatcher talking HTTP to the endpoints derived from `config`.
        let rpc = Web3Node::new(&config.rpc_endpoint(&profile))?;
        let relay = RelayClient::new(&config.relay_endpoint(&profile), config.api_key.clone())?;
        Ok(Self::new(profile, registry, Arc::new(rpc), Arc::new(relay)))
    }
}
