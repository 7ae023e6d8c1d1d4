//! Turning catalog operations into call data.
//!
//! [`CallEncoder::encode_operation`] is pure: every field is parsed and
//! checked here, before the pipeline performs any I/O. The only value it
//! cannot know in advance is the decimal count of an ERC-20 token when the
//! request omits `digits`; such calls come back as
//! [`Encoding::AwaitingDecimals`] and are finished once `decimals()` has been
//! queried.

use crate::address::{Address, AddressValidationError};
use crate::catalog::{AmountScaling, Operation, OperationSpec};
use crate::contracts::{ContractRegistry, CustodialFlavor};
use crate::error::{Error, Result, RpcError};
use crate::rlp::Bytes;
use crate::units::{parse_integer, to_base_units};
use crate::utils::decode_hex;
use crate::U256;
use ethabi::token::{LenientTokenizer, Tokenizer};
use ethabi::{Function, ParamType, StateMutability, Token};
use serde_json::Value;
use std::sync::Arc;

/// Recipient, value and data of a transaction, before assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedCall {
    /// Recipient; `None` creates a contract
    pub to: Option<Address>,
    /// Native coin to send, in wei
    pub value: U256,
    /// Call data or creation code
    pub data: Bytes,
}

/// Outcome of [`CallEncoder::encode_operation`].
#[derive(Clone, Debug)]
pub enum Encoding {
    /// Fully encoded.
    Ready(EncodedCall),
    /// Token amount waits for the contract's `decimals()`.
    AwaitingDecimals(PendingTokenCall),
}

/// ERC-20 call whose amount is the last argument and still unscaled.
#[derive(Clone, Debug)]
pub struct PendingTokenCall {
    token: Address,
    function: Function,
    leading: Vec<Token>,
    amount: String,
}

impl PendingTokenCall {
    pub const fn token(&self) -> Address {
        //! Token contract to query.
        self.token
    }

    pub fn finish(self, decimals: u32) -> Result<EncodedCall> {
        //! Scale the amount and encode the call.
        let amount =
            to_base_units(&self.amount, decimals).map_err(|e| Error::amount("amount", e))?;
        let mut args = self.leading;
        args.push(Token::Uint(amount));
        let data = self.function.encode_input(&args).map_err(|e| {
            Error::validation(&self.function.name, format!("arguments do not match ABI: {e}"))
        })?;
        Ok(EncodedCall {
            to: Some(self.token),
            value: U256::zero(),
            data: data.into(),
        })
    }
}

/// Encodes catalog operations against a contract registry.
#[derive(Clone, Debug)]
pub struct CallEncoder {
    registry: Arc<ContractRegistry>,
    native_decimals: u32,
}

impl CallEncoder {
    pub fn new(registry: Arc<ContractRegistry>, native_decimals: u32) -> Self {
        //! Encoder for a chain whose native coin has `native_decimals`.
        Self {
            registry,
            native_decimals,
        }
    }

    pub fn registry(&self) -> &ContractRegistry {
        //! Underlying descriptors.
        &self.registry
    }

    pub fn encode_operation(
        &self,
        operation: &Operation,
        sender: Option<Address>,
    ) -> Result<Encoding> {
        //! Encode an operation into recipient, value and data.
        //!
        //! `sender` is only used as the default recipient of `store-data`.
        let spec = operation.kind().spec();
        match operation {
            Operation::TransferNative { to, amount, data } => ready(EncodedCall {
                to: Some(address("to", to)?),
                value: self.native_value("amount", amount)?,
                data: data
                    .as_deref()
                    .map(|text| Bytes::copy_from_slice(text.as_bytes()))
                    .unwrap_or_default(),
            }),
            Operation::StoreData { data, to } => {
                let to = match to.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                    Some(to) => address("to", to)?,
                    None => sender.ok_or_else(|| {
                        Error::validation("to", "is required when the sender is not known")
                    })?,
                };
                ready(EncodedCall {
                    to: Some(to),
                    value: U256::zero(),
                    data: Bytes::copy_from_slice(data.as_bytes()),
                })
            }
            Operation::DeployErc20 {
                name,
                symbol,
                address: receiver,
                supply,
                digits,
                total_cap,
            } => {
                let supply = self.amount(&spec, "supply", supply, Some(*digits))?;
                let cap = match total_cap.as_deref().filter(|c| !c.trim().is_empty()) {
                    Some(cap) => self.amount(&spec, "totalCap", cap, Some(*digits))?,
                    None => supply.clone(),
                };
                self.deployment(
                    &spec,
                    vec![
                        Token::String(name.clone()),
                        Token::String(symbol.clone()),
                        address_token("address", receiver)?,
                        Token::Uint(U256::from(*digits)),
                        cap,
                        supply,
                    ],
                )
            }
            Operation::MintErc20 {
                contract_address,
                to,
                amount,
                digits,
            } => self.token_call(
                &spec,
                contract_address,
                vec![address_token("to", to)?],
                amount,
                *digits,
            ),
            Operation::BurnErc20 {
                contract_address,
                amount,
                digits,
            } => self.token_call(&spec, contract_address, vec![], amount, *digits),
            Operation::TransferErc20 {
                contract_address,
                to,
                amount,
                digits,
            } => self.token_call(
                &spec,
                contract_address,
                vec![address_token("to", to)?],
                amount,
                *digits,
            ),
            Operation::DeployErc721 { name, symbol } => self.deployment(
                &spec,
                vec![Token::String(name.clone()), Token::String(symbol.clone())],
            ),
            Operation::MintErc721 {
                contract_address,
                to,
                token_id,
                url,
            } => self.contract_call(
                &spec,
                contract_address,
                U256::zero(),
                vec![
                    address_token("to", to)?,
                    integer("tokenId", token_id)?,
                    Token::String(url.clone()),
                ],
            ),
            Operation::MintCashbackErc721 {
                contract_address,
                to,
                token_id,
                url,
                author_addresses,
                cashback_values,
            } => {
                same_len("cashbackValues", author_addresses.len(), cashback_values.len())?;
                self.contract_call(
                    &spec,
                    contract_address,
                    U256::zero(),
                    vec![
                        address_token("to", to)?,
                        integer("tokenId", token_id)?,
                        Token::String(url.clone()),
                        Token::Array(address_tokens("authorAddresses", author_addresses)?),
                        Token::Array(self.amounts(&spec, "cashbackValues", cashback_values)?),
                    ],
                )
            }
            Operation::MintMultipleErc721 {
                contract_address,
                to,
                token_id,
                url,
            } => {
                same_len("tokenId", to.len(), token_id.len())?;
                same_len("url", to.len(), url.len())?;
                self.contract_call(
                    &spec,
                    contract_address,
                    U256::zero(),
                    vec![
                        Token::Array(address_tokens("to", to)?),
                        Token::Array(integers("tokenId", token_id)?),
                        Token::Array(url.iter().cloned().map(Token::String).collect()),
                    ],
                )
            }
            Operation::MintMultipleCashbackErc721 {
                contract_address,
                to,
                token_id,
                url,
                author_addresses,
                cashback_values,
            } => {
                same_len("tokenId", to.len(), token_id.len())?;
                same_len("url", to.len(), url.len())?;
                same_len("authorAddresses", to.len(), author_addresses.len())?;
                same_len("cashbackValues", to.len(), cashback_values.len())?;
                let mut authors = Vec::with_capacity(to.len());
                let mut cashbacks = Vec::with_capacity(to.len());
                for (i, (row_authors, row_values)) in
                    author_addresses.iter().zip(cashback_values).enumerate()
                {
                    same_len(
                        &format!("cashbackValues[{i}]"),
                        row_authors.len(),
                        row_values.len(),
                    )?;
                    authors.push(Token::Array(address_tokens(
                        &format!("authorAddresses[{i}]"),
                        row_authors,
                    )?));
                    cashbacks.push(Token::Array(self.amounts(
                        &spec,
                        &format!("cashbackValues[{i}]"),
                        row_values,
                    )?));
                }
                self.contract_call(
                    &spec,
                    contract_address,
                    U256::zero(),
                    vec![
                        Token::Array(address_tokens("to", to)?),
                        Token::Array(integers("tokenId", token_id)?),
                        Token::Array(url.iter().cloned().map(Token::String).collect()),
                        Token::Array(authors),
                        Token::Array(cashbacks),
                    ],
                )
            }
            Operation::BurnErc721 {
                contract_address,
                token_id,
            } => self.contract_call(
                &spec,
                contract_address,
                U256::zero(),
                vec![integer("tokenId", token_id)?],
            ),
            Operation::TransferErc721 {
                contract_address,
                to,
                token_id,
                value,
            } => {
                let value = match value.as_deref().filter(|v| !v.trim().is_empty()) {
                    Some(value) => self.native_value("value", value)?,
                    None => U256::zero(),
                };
                self.contract_call(
                    &spec,
                    contract_address,
                    value,
                    vec![address_token("to", to)?, integer("tokenId", token_id)?],
                )
            }
            Operation::UpdateCashbackErc721 {
                contract_address,
                token_id,
                cashback_value,
            } => self.contract_call(
                &spec,
                contract_address,
                U256::zero(),
                vec![
                    integer("tokenId", token_id)?,
                    self.amount(&spec, "cashbackValue", cashback_value, None)?,
                ],
            ),
            Operation::DeployErc1155 { uri } => {
                self.deployment(&spec, vec![Token::String(uri.clone())])
            }
            Operation::MintErc1155 {
                contract_address,
                to,
                token_id,
                amount,
                data,
            }
            | Operation::TransferErc1155 {
                contract_address,
                to,
                token_id,
                amount,
                data,
            } => self.contract_call(
                &spec,
                contract_address,
                U256::zero(),
                vec![
                    address_token("to", to)?,
                    integer("tokenId", token_id)?,
                    self.amount(&spec, "amount", amount, None)?,
                    data_token("data", data.as_deref())?,
                ],
            ),
            Operation::MintBatchErc1155 {
                contract_address,
                to,
                token_id,
                amounts,
                data,
            } => {
                same_len("tokenId", to.len(), token_id.len())?;
                same_len("amounts", to.len(), amounts.len())?;
                let mut ids = Vec::with_capacity(to.len());
                let mut values = Vec::with_capacity(to.len());
                for (i, (row_ids, row_amounts)) in token_id.iter().zip(amounts).enumerate() {
                    same_len(&format!("amounts[{i}]"), row_ids.len(), row_amounts.len())?;
                    ids.push(Token::Array(integers(&format!("tokenId[{i}]"), row_ids)?));
                    values.push(Token::Array(self.amounts(
                        &spec,
                        &format!("amounts[{i}]"),
                        row_amounts,
                    )?));
                }
                self.contract_call(
                    &spec,
                    contract_address,
                    U256::zero(),
                    vec![
                        Token::Array(address_tokens("to", to)?),
                        Token::Array(ids),
                        Token::Array(values),
                        data_token("data", data.as_deref())?,
                    ],
                )
            }
            Operation::BurnErc1155 {
                contract_address,
                account,
                token_id,
                amount,
            } => self.contract_call(
                &spec,
                contract_address,
                U256::zero(),
                vec![
                    address_token("account", account)?,
                    integer("tokenId", token_id)?,
                    self.amount(&spec, "amount", amount, None)?,
                ],
            ),
            Operation::BurnBatchErc1155 {
                contract_address,
                account,
                token_id,
                amounts,
            } => {
                same_len("amounts", token_id.len(), amounts.len())?;
                self.contract_call(
                    &spec,
                    contract_address,
                    U256::zero(),
                    vec![
                        address_token("account", account)?,
                        Token::Array(integers("tokenId", token_id)?),
                        Token::Array(self.amounts(&spec, "amounts", amounts)?),
                    ],
                )
            }
            Operation::TransferBatchErc1155 {
                contract_address,
                to,
                token_id,
                amounts,
                data,
            } => {
                same_len("amounts", token_id.len(), amounts.len())?;
                self.contract_call(
                    &spec,
                    contract_address,
                    U256::zero(),
                    vec![
                        address_token("to", to)?,
                        Token::Array(integers("tokenId", token_id)?),
                        Token::Array(self.amounts(&spec, "amounts", amounts)?),
                        data_token("data", data.as_deref())?,
                    ],
                )
            }
            Operation::DeployCustodialWallet {
                enable_fungible_tokens,
                enable_non_fungible_tokens,
                enable_semi_fungible_tokens,
                enable_batch_transactions,
            } => {
                let flavor = CustodialFlavor {
                    fungible: *enable_fungible_tokens,
                    non_fungible: *enable_non_fungible_tokens,
                    semi_fungible: *enable_semi_fungible_tokens,
                    batch: *enable_batch_transactions,
                };
                ready(EncodedCall {
                    to: None,
                    value: U256::zero(),
                    data: self.registry.custodial(flavor)?.encode_deploy(&[])?,
                })
            }
            Operation::DeployMarketplaceListing {
                marketplace_fee,
                fee_recipient,
            } => self.fee_deployment(&spec, "marketplaceFee", marketplace_fee, fee_recipient),
            Operation::DeployAuction {
                auction_fee,
                fee_recipient,
            } => self.fee_deployment(&spec, "auctionFee", auction_fee, fee_recipient),
            Operation::InvokeMethod {
                contract_address,
                method_name,
                method_abi,
                params,
                amount,
            } => {
                let call = MethodCall::resolve(method_abi, method_name, params)?;
                let value = match amount.as_deref().filter(|a| !a.trim().is_empty()) {
                    Some(amount) => self.native_value("amount", amount)?,
                    None => U256::zero(),
                };
                ready(EncodedCall {
                    to: Some(address("contractAddress", contract_address)?),
                    value,
                    data: call.encode()?,
                })
            }
        }
    }

    fn contract_call(
        &self,
        spec: &OperationSpec,
        contract: &str,
        value: U256,
        args: Vec<Token>,
    ) -> Result<Encoding> {
        let to = address("contractAddress", contract)?;
        let (kind, method) = spec.contract.zip(spec.method).ok_or_else(|| {
            Error::UnsupportedOperation(format!("`{}` is not a contract call", spec.name))
        })?;
        let data = self.registry.descriptor(kind)?.encode_call(method, &args)?;
        Ok(Encoding::Ready(EncodedCall {
            to: Some(to),
            value,
            data,
        }))
    }

    fn deployment(&self, spec: &OperationSpec, args: Vec<Token>) -> Result<Encoding> {
        let kind = spec.contract.filter(|_| spec.deploy).ok_or_else(|| {
            Error::UnsupportedOperation(format!("`{}` is not a deployment", spec.name))
        })?;
        let data = self.registry.descriptor(kind)?.encode_deploy(&args)?;
        Ok(Encoding::Ready(EncodedCall {
            to: None,
            value: U256::zero(),
            data,
        }))
    }

    fn fee_deployment(
        &self,
        spec: &OperationSpec,
        fee_field: &str,
        fee: &str,
        recipient: &str,
    ) -> Result<Encoding> {
        self.deployment(
            spec,
            vec![
                self.amount(spec, fee_field, fee, None)?,
                address_token("feeRecipient", recipient)?,
            ],
        )
    }

    fn token_call(
        &self,
        spec: &OperationSpec,
        contract: &str,
        leading: Vec<Token>,
        amount: &str,
        digits: Option<u32>,
    ) -> Result<Encoding> {
        let token = address("contractAddress", contract)?;
        let (kind, method) = spec.contract.zip(spec.method).ok_or_else(|| {
            Error::UnsupportedOperation(format!("`{}` is not a token call", spec.name))
        })?;
        // Syntax only; the real scale may still be unknown.
        to_base_units(amount, 0).map_err(|e| Error::amount("amount", e))?;
        let pending = PendingTokenCall {
            token,
            function: self.registry.descriptor(kind)?.function(method)?.clone(),
            leading,
            amount: amount.to_string(),
        };
        match digits {
            Some(digits) => pending.finish(digits).map(Encoding::Ready),
            None => Ok(Encoding::AwaitingDecimals(pending)),
        }
    }

    fn native_value(&self, field: &str, text: &str) -> Result<U256> {
        to_base_units(text, self.native_decimals).map_err(|e| Error::amount(field, e))
    }

    fn amount(
        &self,
        spec: &OperationSpec,
        field: &str,
        text: &str,
        digits: Option<u32>,
    ) -> Result<Token> {
        let scale = match spec.scaling {
            AmountScaling::RawInteger => return integer(field, text),
            AmountScaling::Native => self.native_decimals,
            AmountScaling::ExplicitDigits | AmountScaling::TokenDecimals => {
                digits.ok_or_else(|| Error::validation("digits", "is required"))?
            }
            AmountScaling::None => {
                return Err(Error::UnsupportedOperation(format!(
                    "`{}` carries no amounts",
                    spec.name
                )))
            }
        };
        to_base_units(text, scale)
            .map(Token::Uint)
            .map_err(|e| Error::amount(field, e))
    }

    fn amounts(&self, spec: &OperationSpec, field: &str, items: &[String]) -> Result<Vec<Token>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.amount(spec, &format!("{field}[{i}]"), item, None))
            .collect()
    }
}

fn ready(call: EncodedCall) -> Result<Encoding> {
    Ok(Encoding::Ready(call))
}

fn address(field: &str, text: &str) -> Result<Address> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    text.parse()
        .map_err(|e: AddressValidationError| Error::validation(field, e.to_string()))
}

fn address_token(field: &str, text: &str) -> Result<Token> {
    address(field, text).map(|a| Token::Address(a.inner()))
}

fn address_tokens(field: &str, items: &[String]) -> Result<Vec<Token>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| address_token(&format!("{field}[{i}]"), item))
        .collect()
}

fn integer(field: &str, text: &str) -> Result<Token> {
    parse_integer(text)
        .map(Token::Uint)
        .map_err(|e| Error::amount(field, e))
}

fn integers(field: &str, items: &[String]) -> Result<Vec<Token>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| integer(&format!("{field}[{i}]"), item))
        .collect()
}

fn same_len(field: &str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(Error::ArityMismatch {
            field: field.to_string(),
            expected,
            got,
        })
    }
}

fn data_token(field: &str, data: Option<&str>) -> Result<Token> {
    match data.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(Token::Bytes(vec![])),
        Some(hex) => decode_hex(hex)
            .map(Token::Bytes)
            .map_err(|e| Error::validation(field, e.to_string())),
    }
}

/// A method call resolved once against a caller-supplied ABI.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodCall {
    function: Function,
    args: Vec<Token>,
}

impl MethodCall {
    pub fn resolve(method_abi: &Value, method_name: &str, params: &[Value]) -> Result<Self> {
        //! Find `method_name` in `method_abi` and type its arguments.
        //!
        //! `method_abi` is either one ABI entry or an array of them. Entries
        //! without `type` are taken to be functions. An unknown method fails
        //! with [`Error::UnsupportedOperation`]; wrong argument count or
        //! types fail with [`Error::Validation`].
        let entries: Vec<Value> = match method_abi {
            Value::Array(items) => items.iter().cloned().map(complete_entry).collect(),
            Value::Object(_) => vec![complete_entry(method_abi.clone())],
            _ => {
                return Err(Error::validation(
                    "methodABI",
                    "must be an ABI entry or an array of entries",
                ))
            }
        };
        let json =
            serde_json::to_vec(&entries).map_err(|e| Error::validation("methodABI", e.to_string()))?;
        let abi = ethabi::Contract::load(json.as_slice())
            .map_err(|e| Error::validation("methodABI", e.to_string()))?;
        let function = abi
            .function(method_name)
            .map_err(|_| {
                Error::UnsupportedOperation(format!(
                    "`{method_name}` is not declared in the supplied ABI"
                ))
            })?
            .clone();
        if function.inputs.len() != params.len() {
            return Err(Error::validation(
                "params",
                format!(
                    "`{method_name}` takes {} arguments, got {}",
                    function.inputs.len(),
                    params.len()
                ),
            ));
        }
        let args = function
            .inputs
            .iter()
            .zip(params)
            .enumerate()
            .map(|(i, (input, value))| tokenize(&format!("params[{i}]"), &input.kind, value))
            .collect::<Result<_>>()?;
        Ok(Self { function, args })
    }

    pub fn function(&self) -> &Function {
        //! Resolved ABI entry.
        &self.function
    }

    pub fn args(&self) -> &[Token] {
        //! Typed arguments.
        &self.args
    }

    pub fn is_read_only(&self) -> bool {
        //! Whether the method is `view` or `pure`.
        matches!(
            self.function.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }

    pub fn encode(&self) -> Result<Bytes> {
        //! Selector followed by encoded arguments.
        self.function
            .encode_input(&self.args)
            .map(Bytes::from)
            .map_err(|e| Error::validation("params", e.to_string()))
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>> {
        //! Decode the return data of an `eth_call`.
        self.function
            .decode_output(data)
            .map_err(|e| Error::ContractQuery(RpcError::Decode(e.to_string())))
    }
}

fn complete_entry(mut entry: Value) -> Value {
    if let Value::Object(map) = &mut entry {
        map.entry("type").or_insert_with(|| "function".into());
        map.entry("inputs").or_insert_with(|| Value::Array(vec![]));
        map.entry("outputs").or_insert_with(|| Value::Array(vec![]));
        if !map.contains_key("stateMutability") {
            let constant = map.get("constant").and_then(Value::as_bool) == Some(true);
            let payable = map.get("payable").and_then(Value::as_bool) == Some(true);
            let mutability = match (constant, payable) {
                (true, _) => "view",
                (false, true) => "payable",
                (false, false) => "nonpayable",
            };
            map.insert("stateMutability".into(), mutability.into());
        }
    }
    entry
}

fn scalar_text(path: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.trim().to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(Error::validation(path, "expected a scalar value")),
    }
}

fn sequence<'v>(path: &str, value: &'v Value) -> Result<&'v [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Error::validation(path, "expected an array"))
}

fn tokenize(path: &str, kind: &ParamType, value: &Value) -> Result<Token> {
    let invalid = |text: &str| Error::validation(path, format!("{text:?} is not a valid {kind}"));
    match kind {
        ParamType::Array(inner) => sequence(path, value)?
            .iter()
            .enumerate()
            .map(|(i, item)| tokenize(&format!("{path}[{i}]"), inner, item))
            .collect::<Result<_>>()
            .map(Token::Array),
        ParamType::FixedArray(inner, len) => {
            let items = sequence(path, value)?;
            same_len(path, *len, items.len())?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| tokenize(&format!("{path}[{i}]"), inner, item))
                .collect::<Result<_>>()
                .map(Token::FixedArray)
        }
        ParamType::Tuple(kinds) => {
            let items = sequence(path, value)?;
            same_len(path, kinds.len(), items.len())?;
            kinds
                .iter()
                .zip(items)
                .enumerate()
                .map(|(i, (kind, item))| tokenize(&format!("{path}[{i}]"), kind, item))
                .collect::<Result<_>>()
                .map(Token::Tuple)
        }
        ParamType::Address => address_token(path, &scalar_text(path, value)?),
        ParamType::Bool => match value {
            Value::Bool(flag) => Ok(Token::Bool(*flag)),
            other => match scalar_text(path, other)?.as_str() {
                "true" => Ok(Token::Bool(true)),
                "false" => Ok(Token::Bool(false)),
                text => Err(invalid(text)),
            },
        },
        ParamType::String => scalar_text(path, value).map(Token::String),
        ParamType::Bytes => {
            let text = scalar_text(path, value)?;
            decode_hex(&text)
                .map(Token::Bytes)
                .map_err(|_| invalid(&text))
        }
        ParamType::FixedBytes(len) => {
            let text = scalar_text(path, value)?;
            match decode_hex(&text) {
                Ok(bytes) if bytes.len() == *len => Ok(Token::FixedBytes(bytes)),
                _ => Err(invalid(&text)),
            }
        }
        ParamType::Uint(bits) => {
            let text = scalar_text(path, value)?;
            let parsed = match text.strip_prefix("0x") {
                Some(hex) => U256::from_str_radix(hex, 16).ok(),
                None => U256::from_dec_str(&text).ok(),
            };
            match parsed {
                Some(number) if number.bits() <= *bits => Ok(Token::Uint(number)),
                _ => Err(invalid(&text)),
            }
        }
        ParamType::Int(bits) => {
            let text = scalar_text(path, value)?;
            match LenientTokenizer::tokenize(kind, &text) {
                Ok(Token::Int(number)) if fits_signed(number, *bits) => Ok(Token::Int(number)),
                _ => Err(invalid(&text)),
            }
        }
    }
}

/// Whether a two's complement 256-bit word is representable in `bits` bits.
fn fits_signed(word: U256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let Some(sign_bit) = bits.checked_sub(1) else {
        return false;
    };
    let magnitude = if word.bit(255) { !word } else { word };
    magnitude < U256::one() << sign_bit
}
