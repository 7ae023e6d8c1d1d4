//! Network communication requires `http` crate feature.
//!
//! Reads an ERC-20 balance through `eth_call`, then prepares a transfer for
//! a remote signer and shows how the signer side completes it.
//!
//! Environment: `TEST_TOKEN_ADDRESS`, `TEST_TO_ADDRESS`, `TEST_PRIVATE_KEY`,
//! and either `KCC_RPC_URL` or `TATUM_API_KEY`.

use multichain_devkit::catalog::{OperationRequest, ReadMethodInvocation};
use multichain_devkit::config::{ChainProfile, ClientConfig, DEFAULT_API_URL};
use multichain_devkit::contracts::ContractRegistry;
use multichain_devkit::dispatcher::Dispatcher;
use multichain_devkit::transactions::LegacyTransaction;
use multichain_devkit::units::from_base_units;
use multichain_devkit::Token;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} must be provided"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = ClientConfig::new(DEFAULT_API_URL, std::env::var("TATUM_API_KEY").ok()).testnet();
    if let Ok(provider) = std::env::var("KCC_RPC_URL") {
        config = config.with_provider(provider);
    }
    let registry = Arc::new(ContractRegistry::bundled()?);
    let dispatcher = Dispatcher::connect(&config, ChainProfile::kcc(config.testnet), registry)?;

    let token = env("TEST_TOKEN_ADDRESS");
    let recipient = env("TEST_TO_ADDRESS");
    let balance_of = ReadMethodInvocation {
        contract_address: token.clone(),
        method_name: "balanceOf".to_string(),
        method_abi: json!({
            "name": "balanceOf",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        }),
        params: vec![json!(recipient)],
    };
    let decimals = dispatcher.erc20_decimals(token.parse()?).await?;
    if let [Token::Uint(balance)] = dispatcher.invoke_read(&balance_of).await?.as_slice() {
        println!("Balance before: {}", from_base_units(*balance, decimals));
    }

    // Remote signing: the envelope carries no key material.
    let request = OperationRequest::from_json(
        &json!({
            "operation": "transfer-erc20",
            "contractAddress": token,
            "to": recipient,
            "amount": "0.01",
            "digits": decimals,
            "signatureId": "demo-signature"
        })
        .to_string(),
    )?;
    let envelope = dispatcher.prepare(&request).await?.serialize()?;
    println!("Pending envelope: {envelope}");

    // Signer side.
    let raw = dispatcher
        .sign_pending(&envelope, &env("TEST_PRIVATE_KEY"))
        .await?;
    let signed = LegacyTransaction::decode_raw(&raw).map_err(|e| e.to_string())?;
    println!(
        "Signed by {} with nonce {}",
        signed.recover_sender()?,
        signed.nonce
    );
    Ok(())
}
