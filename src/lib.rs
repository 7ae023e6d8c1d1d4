#![doc(html_root_url = "https://docs.rs/multichain-devkit/0.1.0-beta.1")]
#![warn(rust_2018_idioms, missing_docs)]
#![deny(dead_code, unused_imports, unused_mut)]

//! Rust library to build, sign and broadcast token and contract transactions
//! on EVM-compatible chains: KCC, Ethereum, BNB Smart Chain, Polygon and
//! Harmony ONE out of the box.
//!
//! Every supported operation (native transfers, ERC-20/721/1155 lifecycle,
//! custodial wallets, marketplace contracts, arbitrary method calls) goes
//! through the same pipeline: validate, encode, assemble, sign, submit.
//! Signing happens either in process with a private key, or is deferred to
//! an external key-management signer identified by a signature id.
//!
//! ## Usage
//!
//! Requests can be built as typed values or parsed from the JSON wire
//! format. Encoding never touches the network:
//!
//! ```rust
//! use std::sync::Arc;
//! use multichain_devkit::catalog::OperationRequest;
//! use multichain_devkit::contracts::ContractRegistry;
//! use multichain_devkit::encoder::{CallEncoder, Encoding};
//!
//! let request = OperationRequest::from_json(r#"{
//!     "operation": "transfer-erc20",
//!     "contractAddress": "0x1111111111111111111111111111111111111111",
//!     "to": "0x2222222222222222222222222222222222222222",
//!     "amount": "1.5",
//!     "digits": 18,
//!     "fromPrivateKey": "0x4646464646464646464646464646464646464646464646464646464646464646"
//! }"#).expect("Must parse");
//! request.validate().expect("Must be valid");
//!
//! let registry = Arc::new(ContractRegistry::bundled().expect("Bundled ABIs"));
//! let encoder = CallEncoder::new(registry, 18);
//! let Encoding::Ready(call) = encoder
//!     .encode_operation(&request.operation, request.credential.sender())
//!     .expect("Must encode")
//! else {
//!     panic!("Digits are explicit");
//! };
//! assert_eq!(&call.data[..4], [0xa9, 0x05, 0x9c, 0xbb]);
//! ```
//!
//! To submit transactions, wire a [`dispatcher::Dispatcher`] with a chain
//! profile. With the default `http` feature,
//! [`dispatcher::Dispatcher::connect`] builds JSON-RPC and relay clients
//! from a [`config::ClientConfig`]; without it, bring your own
//! [`rpc::ChainRpc`] and [`rpc::SignerRelay`] implementations.
//!
//! ## Examples
//!
//! You can check out sample usage of this crate in the `demos/` folder of
//! the project repo.
//!
//! ### MSRV
//!
//! Currently it requires rust `1.75.0` or higher to build.
//!
//! ## License
//!
//! This project is licensed under the GNU General Public License v3.

mod address;
pub use address::{
    parse_private_key, Address, AddressConvertible, AddressValidationError, PrivateKey, PublicKey,
};
pub mod broadcast;
pub mod catalog;
pub mod config;
pub mod contracts;
pub mod dispatcher;
pub mod encoder;
pub mod error;
#[cfg(feature = "http")]
pub mod network;
pub mod rlp;
pub mod rpc;
pub mod signing;
pub mod transaction_builder;
pub mod transactions;
pub mod units;
pub mod utils;
pub use error::{Error, ErrorKind, Result};
pub use ethabi::Token;
pub use ethereum_types::U256;
pub use utils::keccak;
