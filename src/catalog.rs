//! Closed catalog of supported operations and the request schema.
//!
//! Every operation is one [`Operation`] variant carrying its own fields and
//! one [`OperationSpec`] entry describing which contract and method it
//! targets, how amounts are scaled and which fields are required. Requests
//! are validated against that entry before anything touches the network.
//!
//! JSON requests use the wire names of the hosted API:
//!
//! ```rust
//! use multichain_devkit::catalog::{OperationKind, OperationRequest};
//!
//! let request = OperationRequest::from_json(r#"{
//!     "operation": "transfer-erc20",
//!     "contractAddress": "0x1111111111111111111111111111111111111111",
//!     "to": "0x2222222222222222222222222222222222222222",
//!     "amount": "1.5",
//!     "digits": 18,
//!     "signatureId": "sig-123"
//! }"#).expect("Must parse");
//! assert_eq!(request.kind(), OperationKind::TransferErc20);
//! request.validate().expect("Must be valid");
//! ```

use crate::contracts::ContractKind;
use crate::error::{Error, Result};
use crate::signing::Credential;
use crate::units::parse_gwei;
use crate::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

/// How the amounts of an operation are converted to base units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountScaling {
    /// No amounts
    None,
    /// Native coin decimals of the chain profile
    Native,
    /// Token decimals: explicit `digits`, else the contract's `decimals()`
    TokenDecimals,
    /// Decimals given by the request itself (`digits`)
    ExplicitDigits,
    /// Amounts are plain integers
    RawInteger,
}

/// Static description of one catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationSpec {
    /// Wire name, e.g. `transfer-erc20`
    pub name: &'static str,
    /// Target contract standard, if any
    pub contract: Option<ContractKind>,
    /// ABI method, if the operation is a fixed method call
    pub method: Option<&'static str>,
    /// Amount conversion
    pub scaling: AmountScaling,
    /// Whether the transaction creates a contract
    pub deploy: bool,
    /// Fields that must be present and non-empty (wire names)
    pub required: &'static [&'static str],
}

/// Fieldless discriminant of [`Operation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum OperationKind {
    TransferNative,
    StoreData,
    DeployErc20,
    MintErc20,
    BurnErc20,
    TransferErc20,
    DeployErc721,
    MintErc721,
    MintCashbackErc721,
    MintMultipleErc721,
    MintMultipleCashbackErc721,
    BurnErc721,
    TransferErc721,
    UpdateCashbackErc721,
    DeployErc1155,
    MintErc1155,
    MintBatchErc1155,
    BurnErc1155,
    BurnBatchErc1155,
    TransferErc1155,
    TransferBatchErc1155,
    DeployCustodialWallet,
    DeployMarketplaceListing,
    DeployAuction,
    InvokeMethod,
}

const fn entry(
    name: &'static str,
    contract: Option<ContractKind>,
    method: Option<&'static str>,
    scaling: AmountScaling,
    required: &'static [&'static str],
) -> OperationSpec {
    OperationSpec {
        name,
        contract,
        method,
        scaling,
        deploy: false,
        required,
    }
}

const fn deploy(
    name: &'static str,
    contract: ContractKind,
    scaling: AmountScaling,
    required: &'static [&'static str],
) -> OperationSpec {
    OperationSpec {
        name,
        contract: Some(contract),
        method: None,
        scaling,
        deploy: true,
        required,
    }
}

impl OperationKind {
    /// Every supported operation.
    pub const ALL: [Self; 25] = [
        Self::TransferNative,
        Self::StoreData,
        Self::DeployErc20,
        Self::MintErc20,
        Self::BurnErc20,
        Self::TransferErc20,
        Self::DeployErc721,
        Self::MintErc721,
        Self::MintCashbackErc721,
        Self::MintMultipleErc721,
        Self::MintMultipleCashbackErc721,
        Self::BurnErc721,
        Self::TransferErc721,
        Self::UpdateCashbackErc721,
        Self::DeployErc1155,
        Self::MintErc1155,
        Self::MintBatchErc1155,
        Self::BurnErc1155,
        Self::BurnBatchErc1155,
        Self::TransferErc1155,
        Self::TransferBatchErc1155,
        Self::DeployCustodialWallet,
        Self::DeployMarketplaceListing,
        Self::DeployAuction,
        Self::InvokeMethod,
    ];

    pub const fn spec(&self) -> OperationSpec {
        //! Catalog entry of this operation.
        use AmountScaling as S;
        use ContractKind::*;
        match self {
            Self::TransferNative => entry("transfer-native", None, None, S::Native, &["to", "amount"]),
            Self::StoreData => entry("store-data", None, None, S::None, &["data"]),
            Self::DeployErc20 => deploy(
                "deploy-erc20",
                Erc20,
                S::ExplicitDigits,
                &["name", "symbol", "address", "supply", "digits"],
            ),
            Self::MintErc20 => entry(
                "mint-erc20",
                Some(Erc20),
                Some("mint"),
                S::TokenDecimals,
                &["contractAddress", "to", "amount"],
            ),
            Self::BurnErc20 => entry(
                "burn-erc20",
                Some(Erc20),
                Some("burn"),
                S::TokenDecimals,
                &["contractAddress", "amount"],
            ),
            Self::TransferErc20 => entry(
                "transfer-erc20",
                Some(Erc20),
                Some("transfer"),
                S::TokenDecimals,
                &["contractAddress", "to", "amount"],
            ),
            Self::DeployErc721 => deploy("deploy-erc721", Erc721, S::None, &["name", "symbol"]),
            Self::MintErc721 => entry(
                "mint-erc721",
                Some(Erc721),
                Some("mintWithTokenURI"),
                S::None,
                &["contractAddress", "to", "tokenId", "url"],
            ),
            Self::MintCashbackErc721 => entry(
                "mint-cashback-erc721",
                Some(Erc721),
                Some("mintWithCashback"),
                S::Native,
                &[
                    "contractAddress",
                    "to",
                    "tokenId",
                    "url",
                    "authorAddresses",
                    "cashbackValues",
                ],
            ),
            Self::MintMultipleErc721 => entry(
                "mint-multiple-erc721",
                Some(Erc721),
                Some("mintMultiple"),
                S::None,
                &["contractAddress", "to", "tokenId", "url"],
            ),
            Self::MintMultipleCashbackErc721 => entry(
                "mint-multiple-cashback-erc721",
                Some(Erc721),
                Some("mintMultipleCashback"),
                S::Native,
                &[
                    "contractAddress",
                    "to",
                    "tokenId",
                    "url",
                    "authorAddresses",
                    "cashbackValues",
                ],
            ),
            Self::BurnErc721 => entry(
                "burn-erc721",
                Some(Erc721),
                Some("burn"),
                S::None,
                &["contractAddress", "tokenId"],
            ),
            Self::TransferErc721 => entry(
                "transfer-erc721",
                Some(Erc721),
                Some("safeTransfer"),
                S::Native,
                &["contractAddress", "to", "tokenId"],
            ),
            Self::UpdateCashbackErc721 => entry(
                "update-cashback-erc721",
                Some(Erc721),
                Some("updateCashbackForAuthor"),
                S::Native,
                &["contractAddress", "tokenId", "cashbackValue"],
            ),
            Self::DeployErc1155 => deploy("deploy-erc1155", Erc1155, S::None, &["uri"]),
            Self::MintErc1155 => entry(
                "mint-erc1155",
                Some(Erc1155),
                Some("mint"),
                S::RawInteger,
                &["contractAddress", "to", "tokenId", "amount"],
            ),
            Self::MintBatchErc1155 => entry(
                "mint-batch-erc1155",
                Some(Erc1155),
                Some("mintBatch"),
                S::RawInteger,
                &["contractAddress", "to", "tokenId", "amounts"],
            ),
            Self::BurnErc1155 => entry(
                "burn-erc1155",
                Some(Erc1155),
                Some("burn"),
                S::RawInteger,
                &["contractAddress", "account", "tokenId", "amount"],
            ),
            Self::BurnBatchErc1155 => entry(
                "burn-batch-erc1155",
                Some(Erc1155),
                Some("burnBatch"),
                S::RawInteger,
                &["contractAddress", "account", "tokenId", "amounts"],
            ),
            Self::TransferErc1155 => entry(
                "transfer-erc1155",
                Some(Erc1155),
                Some("safeTransfer"),
                S::RawInteger,
                &["contractAddress", "to", "tokenId", "amount"],
            ),
            Self::TransferBatchErc1155 => entry(
                "transfer-batch-erc1155",
                Some(Erc1155),
                Some("safeBatchTransfer"),
                S::RawInteger,
                &["contractAddress", "to", "tokenId", "amounts"],
            ),
            Self::DeployCustodialWallet => {
                deploy("deploy-custodial-wallet", CustodialWallet, S::None, &[])
            }
            Self::DeployMarketplaceListing => deploy(
                "deploy-marketplace-listing",
                MarketplaceListing,
                S::RawInteger,
                &["marketplaceFee", "feeRecipient"],
            ),
            Self::DeployAuction => deploy(
                "deploy-auction",
                Auction,
                S::RawInteger,
                &["auctionFee", "feeRecipient"],
            ),
            Self::InvokeMethod => entry(
                "invoke-method",
                None,
                None,
                S::Native,
                &["contractAddress", "methodName", "methodABI"],
            ),
        }
    }

    pub const fn name(&self) -> &'static str {
        //! Wire name of this operation.
        self.spec().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        //! Reverse of [`OperationKind::name`].
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation together with its fields.
///
/// Addresses, amounts and token ids are kept as the caller sent them; they
/// are parsed (with field paths in errors) when the call is encoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
#[allow(missing_docs)]
pub enum Operation {
    /// Send native coin, optionally with a text memo as call data.
    TransferNative {
        to: String,
        amount: String,
        data: Option<String>,
    },
    /// Write a text record into transaction data.
    ///
    /// The record is sent to `to`, or to the sender itself.
    StoreData { data: String, to: Option<String> },
    DeployErc20 {
        name: String,
        symbol: String,
        /// Receiver of the initial supply
        address: String,
        supply: String,
        digits: u32,
        /// Defaults to `supply`
        total_cap: Option<String>,
    },
    MintErc20 {
        contract_address: String,
        to: String,
        amount: String,
        digits: Option<u32>,
    },
    BurnErc20 {
        contract_address: String,
        amount: String,
        digits: Option<u32>,
    },
    TransferErc20 {
        contract_address: String,
        to: String,
        amount: String,
        digits: Option<u32>,
    },
    DeployErc721 { name: String, symbol: String },
    MintErc721 {
        contract_address: String,
        to: String,
        token_id: String,
        url: String,
    },
    MintCashbackErc721 {
        contract_address: String,
        to: String,
        token_id: String,
        url: String,
        author_addresses: Vec<String>,
        cashback_values: Vec<String>,
    },
    MintMultipleErc721 {
        contract_address: String,
        to: Vec<String>,
        token_id: Vec<String>,
        url: Vec<String>,
    },
    MintMultipleCashbackErc721 {
        contract_address: String,
        to: Vec<String>,
        token_id: Vec<String>,
        url: Vec<String>,
        author_addresses: Vec<Vec<String>>,
        cashback_values: Vec<Vec<String>>,
    },
    BurnErc721 {
        contract_address: String,
        token_id: String,
    },
    TransferErc721 {
        contract_address: String,
        to: String,
        token_id: String,
        /// Native coin sent along with the token
        value: Option<String>,
    },
    UpdateCashbackErc721 {
        contract_address: String,
        token_id: String,
        cashback_value: String,
    },
    DeployErc1155 { uri: String },
    MintErc1155 {
        contract_address: String,
        to: String,
        token_id: String,
        amount: String,
        data: Option<String>,
    },
    MintBatchErc1155 {
        contract_address: String,
        to: Vec<String>,
        token_id: Vec<Vec<String>>,
        amounts: Vec<Vec<String>>,
        data: Option<String>,
    },
    BurnErc1155 {
        contract_address: String,
        account: String,
        token_id: String,
        amount: String,
    },
    BurnBatchErc1155 {
        contract_address: String,
        account: String,
        token_id: Vec<String>,
        amounts: Vec<String>,
    },
    TransferErc1155 {
        contract_address: String,
        to: String,
        token_id: String,
        amount: String,
        data: Option<String>,
    },
    TransferBatchErc1155 {
        contract_address: String,
        to: String,
        token_id: Vec<String>,
        amounts: Vec<String>,
        data: Option<String>,
    },
    DeployCustodialWallet {
        #[serde(default)]
        enable_fungible_tokens: bool,
        #[serde(default)]
        enable_non_fungible_tokens: bool,
        #[serde(default)]
        enable_semi_fungible_tokens: bool,
        #[serde(default)]
        enable_batch_transactions: bool,
    },
    DeployMarketplaceListing {
        /// Fee in basis points
        marketplace_fee: String,
        fee_recipient: String,
    },
    DeployAuction {
        /// Fee in basis points
        auction_fee: String,
        fee_recipient: String,
    },
    /// Call an arbitrary state-changing contract method.
    InvokeMethod {
        contract_address: String,
        method_name: String,
        #[serde(rename = "methodABI")]
        method_abi: Value,
        #[serde(default)]
        params: Vec<Value>,
        /// Native coin sent along with the call
        amount: Option<String>,
    },
}

impl Operation {
    pub const fn kind(&self) -> OperationKind {
        //! Catalog discriminant.
        match self {
            Self::TransferNative { .. } => OperationKind::TransferNative,
            Self::StoreData { .. } => OperationKind::StoreData,
            Self::DeployErc20 { .. } => OperationKind::DeployErc20,
            Self::MintErc20 { .. } => OperationKind::MintErc20,
            Self::BurnErc20 { .. } => OperationKind::BurnErc20,
            Self::TransferErc20 { .. } => OperationKind::TransferErc20,
            Self::DeployErc721 { .. } => OperationKind::DeployErc721,
            Self::MintErc721 { .. } => OperationKind::MintErc721,
            Self::MintCashbackErc721 { .. } => OperationKind::MintCashbackErc721,
            Self::MintMultipleErc721 { .. } => OperationKind::MintMultipleErc721,
            Self::MintMultipleCashbackErc721 { .. } => OperationKind::MintMultipleCashbackErc721,
            Self::BurnErc721 { .. } => OperationKind::BurnErc721,
            Self::TransferErc721 { .. } => OperationKind::TransferErc721,
            Self::UpdateCashbackErc721 { .. } => OperationKind::UpdateCashbackErc721,
            Self::DeployErc1155 { .. } => OperationKind::DeployErc1155,
            Self::MintErc1155 { .. } => OperationKind::MintErc1155,
            Self::MintBatchErc1155 { .. } => OperationKind::MintBatchErc1155,
            Self::BurnErc1155 { .. } => OperationKind::BurnErc1155,
            Self::BurnBatchErc1155 { .. } => OperationKind::BurnBatchErc1155,
            Self::TransferErc1155 { .. } => OperationKind::TransferErc1155,
            Self::TransferBatchErc1155 { .. } => OperationKind::TransferBatchErc1155,
            Self::DeployCustodialWallet { .. } => OperationKind::DeployCustodialWallet,
            Self::DeployMarketplaceListing { .. } => OperationKind::DeployMarketplaceListing,
            Self::DeployAuction { .. } => OperationKind::DeployAuction,
            Self::InvokeMethod { .. } => OperationKind::InvokeMethod,
        }
    }

    pub fn validate(&self) -> Result<()> {
        //! Check that every required field is present and non-empty.
        //!
        //! Elements of required arrays are checked too, reporting paths
        //! like `to[2]`.
        let value = serde_json::to_value(self)
            .map_err(|e| Error::validation("operation", e.to_string()))?;
        for field in self.kind().spec().required {
            let present = value.get(field).unwrap_or(&Value::Null);
            check_present(field, present, true)?;
        }
        Ok(())
    }
}

fn check_present(path: &str, value: &Value, top_level: bool) -> Result<()> {
    match value {
        Value::Null => Err(Error::validation(path, "is required")),
        Value::String(text) if text.trim().is_empty() => {
            Err(Error::validation(path, "must not be empty"))
        }
        Value::Array(items) if items.is_empty() && top_level => {
            Err(Error::validation(path, "must not be empty"))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_present(&format!("{path}[{i}]"), item, false)),
        _ => Ok(()),
    }
}

/// Fee override. Missing halves are resolved from the network or the chain
/// profile.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    /// Gas limit
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Gas price in gwei, as a decimal string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

impl Fee {
    pub fn gas_price_wei(&self) -> Result<Option<U256>> {
        //! Gas price converted from gwei to wei.
        self.gas_price
            .as_deref()
            .map(|price| parse_gwei(price).map_err(|e| Error::amount("fee.gasPrice", e)))
            .transpose()
    }
}

/// A complete request: operation, credential and overrides.
#[derive(Clone, Debug)]
pub struct OperationRequest {
    /// What to do
    pub operation: Operation,
    /// Who signs
    pub credential: Credential,
    /// Nonce override
    pub nonce: Option<u64>,
    /// Fee override
    pub fee: Option<Fee>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperationRequest {
    #[serde(flatten)]
    operation: Operation,
    from_private_key: Option<String>,
    signature_id: Option<String>,
    nonce: Option<u64>,
    fee: Option<Fee>,
}

impl OperationRequest {
    #[must_use]
    pub const fn new(operation: Operation, credential: Credential) -> Self {
        //! Request without overrides.
        Self {
            operation,
            credential,
            nonce: None,
            fee: None,
        }
    }
    #[must_use]
    pub const fn with_nonce(mut self, nonce: u64) -> Self {
        //! Use this nonce instead of querying the network.
        self.nonce = Some(nonce);
        self
    }
    #[must_use]
    pub fn with_fee(mut self, fee: Fee) -> Self {
        //! Override gas limit and/or gas price.
        self.fee = Some(fee);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        //! Parse a request in wire format.
        //!
        //! Exactly one of `fromPrivateKey` and `signatureId` must be set.
        let raw: RawOperationRequest =
            serde_json::from_str(json).map_err(|e| Error::validation("request", e.to_string()))?;
        let credential =
            Credential::from_parts(raw.from_private_key.as_deref(), raw.signature_id.as_deref())?;
        Ok(Self {
            operation: raw.operation,
            credential,
            nonce: raw.nonce,
            fee: raw.fee,
        })
    }

    pub const fn kind(&self) -> OperationKind {
        //! Catalog discriminant of the operation.
        self.operation.kind()
    }

    pub fn validate(&self) -> Result<()> {
        //! Schema validation, no I/O.
        self.operation.validate()?;
        if let Some(fee) = &self.fee {
            fee.gas_price_wei()?;
        }
        Ok(())
    }
}

/// Read-only contract call; needs no credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadMethodInvocation {
    /// Contract to call
    pub contract_address: String,
    /// Method to call
    pub method_name: String,
    /// ABI of the method (single entry or array)
    #[serde(rename = "methodABI")]
    pub method_abi: Value,
    /// Arguments, in ABI order
    #[serde(default)]
    pub params: Vec<Value>,
}

impl ReadMethodInvocation {
    pub fn from_json(json: &str) -> Result<Self> {
        //! Parse a read request in wire format.
        let request: Self =
            serde_json::from_str(json).map_err(|e| Error::validation("request", e.to_string()))?;
        if request.contract_address.trim().is_empty() {
            return Err(Error::validation("contractAddress", "must not be empty"));
        }
        Ok(request)
    }
}
