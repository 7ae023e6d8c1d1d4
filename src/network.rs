//! Module for interacting with node HTTP APIs.
//!
//! [`Web3Node`] speaks JSON-RPC 2.0 to an EVM node and [`RelayClient`]
//! registers pending transactions with the key-management relay. Endpoint
//! URLs may embed an API key and are therefore never logged.

use crate::error::{Error, Result, RpcError};
use crate::rlp::Bytes;
use crate::rpc::{CallRequest, ChainRpc, SignerRelay};
use crate::utils::{encode_hex, unhex};
use crate::{Address, U256};
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[serde_with::serde_as]
#[derive(Deserialize)]
#[serde(transparent)]
struct HexU64(#[serde_as(as = "unhex::Quantity")] u64);

#[serde_with::serde_as]
#[derive(Deserialize)]
#[serde(transparent)]
struct HexU256(#[serde_as(as = "unhex::Quantity")] U256);

#[serde_with::serde_as]
#[derive(Deserialize)]
#[serde(transparent)]
struct HexData(#[serde_as(as = "unhex::Hex")] Bytes);

fn transport(err: reqwest::Error) -> RpcError {
    RpcError::Transport(err.without_url().to_string())
}

fn to_param<T: Serialize>(value: &T) -> std::result::Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::Decode(e.to_string()))
}

fn parse_response(status: StatusCode, body: &str) -> std::result::Result<Value, RpcError> {
    let response: RpcResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !status.is_success() => {
            return Err(RpcError::Transport(format!("HTTP {status}")))
        }
        Err(e) => return Err(RpcError::Decode(e.to_string())),
    };
    match response {
        RpcResponse {
            error: Some(error), ..
        } => Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        }),
        RpcResponse {
            result: Some(result),
            ..
        } => Ok(result),
        _ => Err(RpcError::Decode(
            "response has neither result nor error".to_string(),
        )),
    }
}

/// JSON-RPC client of an EVM node.
pub struct Web3Node {
    endpoint: Url,
    client: Client,
    next_id: AtomicU64,
}

impl fmt::Debug for Web3Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Web3Node")
            .field("host", &self.endpoint.host_str())
            .finish_non_exhaustive()
    }
}

impl Web3Node {
    pub fn new(endpoint: &str) -> Result<Self> {
        //! Client for the given JSON-RPC URL.
        let endpoint = endpoint
            .parse::<Url>()
            .map_err(|e| Error::validation("endpoint", e.to_string()))?;
        Ok(Self::with_client(endpoint, Client::new()))
    }

    pub fn with_client(endpoint: Url, client: Client) -> Self {
        //! Reuse an existing [`reqwest::Client`].
        Self {
            endpoint,
            client,
            next_id: AtomicU64::new(1),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> std::result::Result<T, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        let result = parse_response(status, &body).map_err(|e| {
            tracing::debug!(method, error = %e, "JSON-RPC call failed");
            e
        })?;
        serde_json::from_value(result).map_err(|e| RpcError::Decode(format!("{method}: {e}")))
    }
}

impl ChainRpc for Web3Node {
    async fn next_nonce(&self, account: Address) -> std::result::Result<u64, RpcError> {
        let params = vec![Value::String(account.to_hex()), "pending".into()];
        let HexU64(nonce) = self.request("eth_getTransactionCount", params).await?;
        Ok(nonce)
    }

    async fn gas_price(&self) -> std::result::Result<U256, RpcError> {
        let HexU256(price) = self.request("eth_gasPrice", vec![]).await?;
        Ok(price)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> std::result::Result<u64, RpcError> {
        let HexU64(gas) = self.request("eth_estimateGas", vec![to_param(call)?]).await?;
        Ok(gas)
    }

    async fn call(&self, call: &CallRequest) -> std::result::Result<Bytes, RpcError> {
        let params = vec![to_param(call)?, "latest".into()];
        let HexData(output) = self.request("eth_call", params).await?;
        Ok(output)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> std::result::Result<String, RpcError> {
        self.request("eth_sendRawTransaction", vec![Value::String(encode_hex(raw))])
            .await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    tx_data: &'a str,
    signature_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayResponse {
    tx_id: Option<String>,
    signature_id: Option<String>,
    status_code: Option<i64>,
    message: Option<String>,
}

fn parse_ack(status: StatusCode, body: &str) -> std::result::Result<String, RpcError> {
    let response: RelayResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if !status.is_success() => {
            return Err(RpcError::Transport(format!("HTTP {status}")))
        }
        Err(e) => return Err(RpcError::Decode(e.to_string())),
    };
    if !status.is_success() {
        return Err(RpcError::Rpc {
            code: response.status_code.unwrap_or(i64::from(status.as_u16())),
            message: response.message.unwrap_or_default(),
        });
    }
    response
        .tx_id
        .or(response.signature_id)
        .ok_or_else(|| RpcError::Decode("acknowledgement carries no id".to_string()))
}

/// HTTP client of the key-management relay.
#[derive(Clone)]
pub struct RelayClient {
    endpoint: Url,
    api_key: Option<String>,
    client: Client,
}

impl fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayClient")
            .field("host", &self.endpoint.host_str())
            .field("authenticated", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl RelayClient {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        //! Client posting to `endpoint`, authenticated with `x-api-key`.
        let endpoint = endpoint
            .parse::<Url>()
            .map_err(|e| Error::validation("endpoint", e.to_string()))?;
        Ok(Self {
            endpoint,
            api_key,
            client: Client::new(),
        })
    }
}

impl SignerRelay for RelayClient {
    async fn register(
        &self,
        transaction: &str,
        signature_id: &str,
    ) -> std::result::Result<String, RpcError> {
        let mut request = self.client.post(self.endpoint.clone()).json(&RelayRequest {
            tx_data: transaction,
            signature_id,
        });
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        parse_ack(status, &body)
    }
}
