//! Network communication requires `http` crate feature.
//!
//! Transfers 1.5 tokens of an ERC-20 contract on KCC testnet, signing
//! locally. Decimals are fetched from the contract.
//!
//! Environment: `TEST_PRIVATE_KEY`, `TEST_TOKEN_ADDRESS`, `TEST_TO_ADDRESS`,
//! and either `KCC_RPC_URL` or `TATUM_API_KEY`.

use multichain_devkit::catalog::{Operation, OperationRequest};
use multichain_devkit::config::{ChainProfile, ClientConfig, DEFAULT_API_URL};
use multichain_devkit::contracts::ContractRegistry;
use multichain_devkit::dispatcher::Dispatcher;
use multichain_devkit::signing::Credential;
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

    let credential = Credential::from_parts(Some(&env("TEST_PRIVATE_KEY")), None)?;
    let request = OperationRequest::new(
        Operation::TransferErc20 {
            contract_address: env("TEST_TOKEN_ADDRESS"),
            to: env("TEST_TO_ADDRESS"),
            amount: "1.5".to_string(),
            digits: None,
        },
        credential,
    );

    let payload = dispatcher.prepare(&request).await?;
    println!("Signed: {}", payload.serialize()?);
    let hash = dispatcher.submit(&payload).await?;
    println!("Transaction hash: {hash}");
    Ok(())
}
