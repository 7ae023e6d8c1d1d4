#![allow(dead_code)]

use multichain_devkit::error::RpcError;
use multichain_devkit::rlp::Bytes;
use multichain_devkit::rpc::{CallRequest, ChainRpc, SignerRelay};
use multichain_devkit::utils::encode_hex;
use multichain_devkit::{keccak, Address, U256};
use std::sync::Mutex;

pub const KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";
pub const KEY_ADDRESS: &str = "0x9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f";
pub const TOKEN: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const RECIPIENT: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

/// Chain node double answering from fixed values and recording every call.
#[derive(Debug)]
pub struct StubRpc {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas: u64,
    /// `None` makes `eth_call` fail
    pub call_output: Option<Bytes>,
    pub fail_estimation: bool,
    pub broadcast_error: Option<String>,
    pub calls: Mutex<Vec<&'static str>>,
    pub estimated: Mutex<Vec<CallRequest>>,
    pub broadcast: Mutex<Vec<Bytes>>,
}

pub fn uint_word(value: u64) -> Bytes {
    let mut word = [0u8; 32];
    U256::from(value).to_big_endian(&mut word);
    Bytes::copy_from_slice(&word)
}

impl Default for StubRpc {
    fn default() -> Self {
        Self {
            nonce: 5,
            gas_price: U256::from(7_000_000_000u64),
            gas: 60_000,
            call_output: Some(uint_word(18)),
            fail_estimation: false,
            broadcast_error: None,
            calls: Mutex::new(vec![]),
            estimated: Mutex::new(vec![]),
            broadcast: Mutex::new(vec![]),
        }
    }
}

impl StubRpc {
    pub fn with_decimals(decimals: u64) -> Self {
        Self {
            call_output: Some(uint_word(decimals)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn estimated(&self) -> Vec<CallRequest> {
        self.estimated.lock().unwrap().clone()
    }

    pub fn broadcast(&self) -> Vec<Bytes> {
        self.broadcast.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }
}

impl ChainRpc for StubRpc {
    async fn next_nonce(&self, _account: Address) -> Result<u64, RpcError> {
        self.record("eth_getTransactionCount");
        Ok(self.nonce)
    }

    async fn gas_price(&self) -> Result<U256, RpcError> {
        self.record("eth_gasPrice");
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, RpcError> {
        self.record("eth_estimateGas");
        self.estimated.lock().unwrap().push(call.clone());
        if self.fail_estimation {
            Err(RpcError::Rpc {
                code: -32000,
                message: "execution reverted".into(),
            })
        } else {
            Ok(self.gas)
        }
    }

    async fn call(&self, _call: &CallRequest) -> Result<Bytes, RpcError> {
        self.record("eth_call");
        self.call_output
            .clone()
            .ok_or_else(|| RpcError::Transport("connection refused".into()))
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<String, RpcError> {
        self.record("eth_sendRawTransaction");
        self.broadcast.lock().unwrap().push(raw.clone());
        match &self.broadcast_error {
            Some(message) => Err(RpcError::Rpc {
                code: -32000,
                message: message.clone(),
            }),
            None => Ok(encode_hex(keccak(raw))),
        }
    }
}

/// Signer relay double that acknowledges everything.
#[derive(Debug, Default)]
pub struct StubRelay {
    registered: Mutex<Vec<(String, String)>>,
}

impl StubRelay {
    pub fn registered(&self) -> Vec<(String, String)> {
        self.registered.lock().unwrap().clone()
    }
}

impl SignerRelay for StubRelay {
    async fn register(&self, transaction: &str, signature_id: &str) -> Result<String, RpcError> {
        let mut registered = self.registered.lock().unwrap();
        registered.push((transaction.to_string(), signature_id.to_string()));
        Ok(format!("ack-{}", registered.len()))
    }
}
