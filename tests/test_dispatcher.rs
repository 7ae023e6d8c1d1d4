mod common;

use common::{StubRelay, StubRpc, KEY, KEY_ADDRESS, RECIPIENT, TOKEN};
use ethabi::Token;
use multichain_devkit::catalog::{Fee, Operation, OperationRequest, ReadMethodInvocation};
use multichain_devkit::config::ChainProfile;
use multichain_devkit::contracts::ContractRegistry;
use multichain_devkit::dispatcher::Dispatcher;
use multichain_devkit::signing::{Credential, SignedPayload};
use multichain_devkit::transactions::{LegacyTransaction, UnsignedTransaction};
use multichain_devkit::{Address, Error, ErrorKind, U256};
use std::sync::Arc;

type StubDispatcher = Dispatcher<StubRpc, StubRelay>;

fn setup(profile: ChainProfile, rpc: StubRpc) -> (StubDispatcher, Arc<StubRpc>, Arc<StubRelay>) {
    let rpc = Arc::new(rpc);
    let relay = Arc::new(StubRelay::default());
    let registry = Arc::new(ContractRegistry::bundled().expect("Bundled ABIs"));
    let dispatcher = Dispatcher::new(profile, registry, Arc::clone(&rpc), Arc::clone(&relay));
    (dispatcher, rpc, relay)
}

fn transfer_erc20(credential: &str, digits: &str) -> String {
    format!(
        r#"{{
            "operation": "transfer-erc20",
            "contractAddress": "{TOKEN}",
            "to": "{RECIPIENT}",
            "amount": "1.5",
            {digits}
            {credential}
        }}"#
    )
}

fn local() -> String {
    format!(r#""fromPrivateKey": "{KEY}""#)
}

fn remote() -> String {
    r#""signatureId": "sig-123""#.to_string()
}

fn transfer_calldata(amount: U256) -> Vec<u8> {
    let mut data = vec![0xa9, 0x05, 0x9c, 0xbb];
    data.extend(ethabi::encode(&[
        Token::Address(RECIPIENT.parse::<Address>().unwrap().inner()),
        Token::Uint(amount),
    ]));
    data
}

fn raw(payload: SignedPayload) -> LegacyTransaction {
    match payload {
        SignedPayload::Raw(raw) => LegacyTransaction::decode_raw(&raw).expect("Must decode"),
        SignedPayload::Pending { .. } => panic!("Must be signed locally"),
    }
}

#[tokio::test]
async fn test_transfer_erc20_signed_locally() {
    let (dispatcher, rpc, relay) = setup(ChainProfile::kcc(true), StubRpc::default());
    let request =
        OperationRequest::from_json(&transfer_erc20(&local(), r#""digits": 18,"#)).unwrap();

    let payload = dispatcher.prepare(&request).await.expect("Must prepare");
    assert!(payload.serialize().unwrap().starts_with("0x"));

    let tx = raw(payload);
    assert_eq!(tx.to, Some(TOKEN.parse().unwrap()));
    assert_eq!(tx.value, U256::zero());
    assert_eq!(
        tx.data.to_vec(),
        transfer_calldata(U256::from(1_500_000_000_000_000_000u64))
    );
    assert_eq!(tx.chain_id(), ChainProfile::KCC_TESTNET_CHAIN_ID);
    assert_eq!(tx.nonce, 5);
    assert_eq!(tx.gas, 60_000);
    assert_eq!(tx.gas_price, U256::from(1_000_000_000u64));
    assert_eq!(tx.recover_sender().unwrap().to_hex(), KEY_ADDRESS);

    // KCC has a fixed gas price, so it is never queried.
    assert_eq!(rpc.calls(), vec!["eth_getTransactionCount", "eth_estimateGas"]);
    let estimated = rpc.estimated();
    assert_eq!(estimated[0].from.map(|a| a.to_hex()).as_deref(), Some(KEY_ADDRESS));
    assert_eq!(estimated[0].to, Some(TOKEN.parse().unwrap()));
    assert!(relay.registered().is_empty());
}

#[tokio::test]
async fn test_transfer_erc20_remote_signature() {
    let (dispatcher, rpc, _) = setup(ChainProfile::ethereum(true), StubRpc::default());
    let request =
        OperationRequest::from_json(&transfer_erc20(&remote(), r#""digits": 18,"#)).unwrap();

    let payload = dispatcher.prepare(&request).await.expect("Must prepare");
    assert!(payload.is_pending());
    let json = payload.serialize().unwrap();
    assert!(!json.contains("4646"));
    assert!(!json.to_lowercase().contains("privatekey"));

    let envelope: UnsignedTransaction = serde_json::from_str(&json).expect("Must parse back");
    assert_eq!(envelope.to, Some(TOKEN.parse().unwrap()));
    assert_eq!(
        envelope.data.to_vec(),
        transfer_calldata(U256::from(1_500_000_000_000_000_000u64))
    );
    assert_eq!(envelope.chain_id, 11_155_111);
    assert_eq!(envelope.nonce, None);
    assert_eq!(envelope.gas, Some(60_000));
    assert_eq!(envelope.gas_price, Some(U256::from(7_000_000_000u64)));
    assert_eq!(rpc.calls(), vec!["eth_gasPrice", "eth_estimateGas"]);
}

#[tokio::test]
async fn test_decimals_are_fetched_when_missing() {
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), StubRpc::with_decimals(6));
    let request = OperationRequest::from_json(&transfer_erc20(&local(), "")).unwrap();

    let tx = raw(dispatcher.prepare(&request).await.unwrap());
    assert_eq!(tx.data.to_vec(), transfer_calldata(U256::from(1_500_000)));
    assert_eq!(
        rpc.calls(),
        vec!["eth_call", "eth_getTransactionCount", "eth_estimateGas"]
    );
}

#[tokio::test]
async fn test_decimals_failure_stops_before_signing() {
    let rpc = StubRpc {
        call_output: None,
        ..StubRpc::default()
    };
    let (dispatcher, rpc, relay) = setup(ChainProfile::kcc(false), rpc);
    let request = OperationRequest::from_json(&transfer_erc20(&remote(), "")).unwrap();

    let err = dispatcher.send(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContractQuery);
    assert!(err.is_retryable());
    assert_eq!(rpc.calls(), vec!["eth_call"]);
    assert!(relay.registered().is_empty());
}

#[tokio::test]
async fn test_empty_contract_address_never_reaches_network() {
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), StubRpc::default());
    let request = OperationRequest::new(
        Operation::TransferErc20 {
            contract_address: String::new(),
            to: RECIPIENT.into(),
            amount: "1".into(),
            digits: None,
        },
        Credential::from_parts(Some(KEY), None).unwrap(),
    );
    match dispatcher.send(&request).await.unwrap_err() {
        Error::Validation { field, .. } => assert_eq!(field, "contractAddress"),
        other => panic!("Unexpected {other}"),
    }
    assert!(rpc.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_amount_never_reaches_network() {
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), StubRpc::default());
    let request = OperationRequest::new(
        Operation::MintErc20 {
            contract_address: TOKEN.into(),
            to: RECIPIENT.into(),
            amount: "ten".into(),
            digits: None,
        },
        Credential::RemoteSignature("sig-1".into()),
    );
    let err = dispatcher.prepare(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    assert!(!err.is_retryable());
    assert!(rpc.calls().is_empty());
}

#[tokio::test]
async fn test_credentials_must_be_exclusive() {
    let both = transfer_erc20(
        &format!(r#"{}, {}"#, local(), remote()),
        r#""digits": 18,"#,
    );
    let neither = transfer_erc20(r#""nonce": 1"#, r#""digits": 18,"#);
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), StubRpc::default());
    for request in [both, neither] {
        let err = dispatcher.send_json(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
    }
    assert!(rpc.calls().is_empty());
}

#[tokio::test]
async fn test_batch_arity_mismatch() {
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), StubRpc::default());
    let request = format!(
        r#"{{
            "operation": "mint-multiple-erc721",
            "contractAddress": "{TOKEN}",
            "to": ["{RECIPIENT}", "{RECIPIENT}", "{RECIPIENT}"],
            "tokenId": ["1", "2"],
            "url": ["a", "b", "c"],
            "signatureId": "sig-1"
        }}"#
    );
    match dispatcher.send_json(&request).await.unwrap_err() {
        Error::ArityMismatch {
            field,
            expected,
            got,
        } => {
            assert_eq!(field, "tokenId");
            assert_eq!((expected, got), (3, 2));
        }
        other => panic!("Unexpected {other}"),
    }
    assert!(rpc.calls().is_empty());
}

#[tokio::test]
async fn test_overrides_skip_queries() {
    let (dispatcher, rpc, _) = setup(ChainProfile::polygon(false), StubRpc::default());
    let request = OperationRequest::new(
        Operation::TransferNative {
            to: RECIPIENT.into(),
            amount: "0.25".into(),
            data: Some("memo".into()),
        },
        Credential::from_parts(Some(KEY), None).unwrap(),
    )
    .with_nonce(42)
    .with_fee(Fee {
        gas_limit: Some(30_000),
        gas_price: Some("2.5".into()),
    });

    let tx = raw(dispatcher.prepare(&request).await.unwrap());
    assert_eq!(tx.nonce, 42);
    assert_eq!(tx.gas, 30_000);
    assert_eq!(tx.gas_price, U256::from(2_500_000_000u64));
    assert_eq!(tx.value, U256::from(250_000_000_000_000_000u64));
    assert_eq!(&tx.data[..], b"memo");
    assert_eq!(tx.chain_id(), 137);
    assert!(rpc.calls().is_empty());
}

#[tokio::test]
async fn test_estimation_failure() {
    let rpc = StubRpc {
        fail_estimation: true,
        ..StubRpc::default()
    };
    let (dispatcher, _, _) = setup(ChainProfile::kcc(false), rpc);
    let request =
        OperationRequest::from_json(&transfer_erc20(&local(), r#""digits": 18,"#)).unwrap();
    let err = dispatcher.send(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Estimation);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_send_broadcasts_raw_transaction() {
    let (dispatcher, rpc, relay) = setup(ChainProfile::kcc(false), StubRpc::default());
    let request =
        OperationRequest::from_json(&transfer_erc20(&local(), r#""digits": 18,"#)).unwrap();

    let hash = dispatcher.send(&request).await.expect("Must send");
    let broadcast = rpc.broadcast();
    assert_eq!(broadcast.len(), 1);
    let tx = LegacyTransaction::decode_raw(&broadcast[0]).unwrap();
    assert_eq!(hash, multichain_devkit::utils::encode_hex(tx.hash()));
    assert!(relay.registered().is_empty());
}

#[tokio::test]
async fn test_send_registers_pending_transaction() {
    let (dispatcher, rpc, relay) = setup(ChainProfile::kcc(false), StubRpc::default());
    let request =
        OperationRequest::from_json(&transfer_erc20(&remote(), r#""digits": 18,"#)).unwrap();

    let ack = dispatcher.send(&request).await.expect("Must register");
    assert_eq!(ack, "ack-1");
    let registered = relay.registered();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].1, "sig-123");
    let envelope: UnsignedTransaction = serde_json::from_str(&registered[0].0).unwrap();
    assert_eq!(envelope.chain_id, 321);
    assert!(!rpc.calls().contains(&"eth_sendRawTransaction"));
}

#[tokio::test]
async fn test_broadcast_failure_is_reported_verbatim() {
    let rpc = StubRpc {
        broadcast_error: Some("insufficient funds for gas * price + value".into()),
        ..StubRpc::default()
    };
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), rpc);
    let request =
        OperationRequest::from_json(&transfer_erc20(&local(), r#""digits": 18,"#)).unwrap();
    let err = dispatcher.send(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Broadcast);
    assert!(err.to_string().contains("insufficient funds"));
    assert_eq!(
        rpc.calls()
            .iter()
            .filter(|&&m| m == "eth_sendRawTransaction")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_deploy_bundled_custodial_wallet() {
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(true), StubRpc::default());
    let request = format!(
        r#"{{
            "operation": "deploy-custodial-wallet",
            "enableNonFungibleTokens": true,
            "enableBatchTransactions": true,
            "fromPrivateKey": "{KEY}"
        }}"#
    );
    let payload = dispatcher
        .prepare(&OperationRequest::from_json(&request).unwrap())
        .await
        .expect("Bytecode is bundled");
    let tx = raw(payload);
    assert_eq!(tx.to, None);
    assert_eq!(&tx.data[..5], [0x60, 0x80, 0x60, 0x40, 0x52]);
    assert_eq!(tx.chain_id(), ChainProfile::KCC_TESTNET_CHAIN_ID);
    assert_eq!(rpc.estimated()[0].to, None);

    let request = request.replace("enableBatchTransactions", "enableFungibleTokens");
    let err = dispatcher
        .send_json(&request)
        .await
        .expect_err("No bytecode for this flavour");
    assert_eq!(err.kind(), ErrorKind::Artifact);
    assert_eq!(rpc.calls().len(), 2);
}

#[tokio::test]
async fn test_sign_pending_envelope() {
    let (dispatcher, rpc, _) = setup(ChainProfile::bsc(true), StubRpc::default());
    let request =
        OperationRequest::from_json(&transfer_erc20(&remote(), r#""digits": 18,"#)).unwrap();
    let envelope = dispatcher.prepare(&request).await.unwrap().serialize().unwrap();

    let raw = dispatcher
        .sign_pending(&envelope, KEY)
        .await
        .expect("Must sign");
    let tx = LegacyTransaction::decode_raw(&raw).unwrap();
    assert_eq!(tx.nonce, 5);
    assert_eq!(tx.chain_id(), 97);
    assert_eq!(tx.gas_price, U256::from(7_000_000_000u64));
    assert_eq!(tx.recover_sender().unwrap().to_hex(), KEY_ADDRESS);
    assert_eq!(
        rpc.calls(),
        vec!["eth_gasPrice", "eth_estimateGas", "eth_getTransactionCount"]
    );

    let (other_chain, _, _) = setup(ChainProfile::bsc(false), StubRpc::default());
    let err = other_chain.sign_pending(&envelope, KEY).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = dispatcher.sign_pending(&envelope, "0x12").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCredential);
}

#[tokio::test]
async fn test_invoke_read() {
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), StubRpc::with_decimals(42));
    let invocation = ReadMethodInvocation::from_json(&format!(
        r#"{{
            "contractAddress": "{TOKEN}",
            "methodName": "balanceOf",
            "methodABI": {{
                "name": "balanceOf",
                "inputs": [{{"name": "owner", "type": "address"}}],
                "outputs": [{{"name": "", "type": "uint256"}}],
                "stateMutability": "view"
            }},
            "params": ["{RECIPIENT}"]
        }}"#
    ))
    .unwrap();
    let output = dispatcher.invoke_read(&invocation).await.unwrap();
    assert_eq!(output, vec![Token::Uint(U256::from(42))]);
    assert_eq!(rpc.calls(), vec!["eth_call"]);
}

#[tokio::test]
async fn test_dispatcher_is_shared_between_tasks() {
    let (dispatcher, rpc, _) = setup(ChainProfile::kcc(false), StubRpc::default());
    let handles: Vec<_> = (0..4u64)
        .map(|nonce| {
            let dispatcher = dispatcher.clone();
            let request =
                OperationRequest::from_json(&transfer_erc20(&local(), r#""digits": 18,"#))
                    .unwrap()
                    .with_nonce(nonce);
            tokio::spawn(async move { dispatcher.prepare(&request).await })
        })
        .collect();
    for handle in handles {
        assert!(!handle.await.unwrap().unwrap().is_pending());
    }
    assert_eq!(rpc.calls().len(), 4);
}
