//! Contract descriptors: ABI plus optional deployment bytecode.
//!
//! ABIs of the supported standards are bundled with the crate, together with
//! the creation bytecode that is published alongside them (currently the
//! batch-enabled ERC-721 custodial wallet). Other bytecode is external data:
//! attach it with [`ContractRegistry::with_bytecode`] or
//! [`ContractRegistry::load_artifacts`] before dispatching deploy operations.
//! Deploying an artifact without bytecode fails with [`Error::Artifact`].
//!
//! A registry is built once and then shared read-only (wrap it in an
//! [`Arc`]); descriptors themselves are reference counted, so handing them
//! out is cheap.

use crate::error::{Error, Result};
use crate::rlp::Bytes;
use crate::utils::decode_hex;
use ethabi::{Contract, Function, Token};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const ERC20_ABI: &str = include_str!("../data/abi/erc20.json");
const ERC721_ABI: &str = include_str!("../data/abi/erc721.json");
const ERC1155_ABI: &str = include_str!("../data/abi/erc1155.json");
const CUSTODIAL_ABI: &str = include_str!("../data/abi/custodial_wallet.json");
const CUSTODIAL_BATCH_ABI: &str = include_str!("../data/abi/custodial_wallet_batch.json");
const LISTING_ABI: &str = include_str!("../data/abi/marketplace_listing.json");
const AUCTION_ABI: &str = include_str!("../data/abi/auction.json");

/// Creation bytecode shipped with the crate, by artifact name.
const BUNDLED_BYTECODE: [(&str, &str); 1] = [(
    "custodial_721_batch",
    include_str!("../data/bin/custodial_721_batch.bin"),
)];

/// Contract standard known to the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// Fungible token
    Erc20,
    /// Non-fungible token with author cashback support
    Erc721,
    /// Multi-token
    Erc1155,
    /// Custodial wallet; the concrete artifact depends on [`CustodialFlavor`]
    CustodialWallet,
    /// NFT marketplace listing
    MarketplaceListing,
    /// NFT auction
    Auction,
}

impl ContractKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Erc20,
        Self::Erc721,
        Self::Erc1155,
        Self::CustodialWallet,
        Self::MarketplaceListing,
        Self::Auction,
    ];

    pub const fn artifact_name(&self) -> &'static str {
        //! Registry key and artifact file stem.
        match self {
            Self::Erc20 => "erc20",
            Self::Erc721 => "erc721",
            Self::Erc1155 => "erc1155",
            Self::CustodialWallet => "custodial_wallet",
            Self::MarketplaceListing => "marketplace_listing",
            Self::Auction => "auction",
        }
    }

    const fn bundled_abi(&self) -> &'static str {
        match self {
            Self::Erc20 => ERC20_ABI,
            Self::Erc721 => ERC721_ABI,
            Self::Erc1155 => ERC1155_ABI,
            Self::CustodialWallet => CUSTODIAL_BATCH_ABI,
            Self::MarketplaceListing => LISTING_ABI,
            Self::Auction => AUCTION_ABI,
        }
    }
}

/// Token types a custodial wallet can hold, plus batch transfer support.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodialFlavor {
    /// ERC-20 and native coin
    pub fungible: bool,
    /// ERC-721
    pub non_fungible: bool,
    /// ERC-1155
    pub semi_fungible: bool,
    /// `transferBatch` support
    pub batch: bool,
}

impl CustodialFlavor {
    pub fn artifact_name(&self) -> Result<String> {
        //! Artifact name of this flavour, e.g. `custodial_20_721_batch`.
        //!
        //! Fails if no token type is enabled.
        let parts: Vec<&str> = [
            (self.fungible, "20"),
            (self.non_fungible, "721"),
            (self.semi_fungible, "1155"),
        ]
        .into_iter()
        .filter_map(|(enabled, part)| enabled.then_some(part))
        .collect();
        if parts.is_empty() {
            return Err(Error::validation(
                "enableFungibleTokens",
                "at least one token type must be enabled",
            ));
        }
        let suffix = if self.batch { "_batch" } else { "" };
        Ok(format!("custodial_{}{suffix}", parts.join("_")))
    }

    pub fn all() -> impl Iterator<Item = Self> {
        //! Every valid flavour (at least one token type enabled).
        (1u8..8).flat_map(|mask| {
            [false, true].into_iter().map(move |batch| Self {
                fungible: mask & 1 != 0,
                non_fungible: mask & 2 != 0,
                semi_fungible: mask & 4 != 0,
                batch,
            })
        })
    }
}

/// ABI and (when loaded) deployment bytecode of one contract.
#[derive(Clone, Debug)]
pub struct ContractDescriptor {
    /// Artifact name, used in error messages
    pub name: String,
    /// Parsed interface
    pub abi: Contract,
    /// Creation bytecode
    pub bytecode: Option<Bytes>,
}

impl ContractDescriptor {
    pub fn from_abi_json(name: impl Into<String>, abi: &str) -> Result<Self> {
        //! Parse a JSON ABI (array of entries).
        let name = name.into();
        let abi = Contract::load(abi.as_bytes()).map_err(|e| Error::artifact(&name, e))?;
        Ok(Self {
            name,
            abi,
            bytecode: None,
        })
    }

    pub fn function(&self, method: &str) -> Result<&Function> {
        //! Look up a method by name.
        self.abi.function(method).map_err(|_| {
            Error::UnsupportedOperation(format!(
                "`{method}` is not a method of `{}`",
                self.name
            ))
        })
    }

    pub fn encode_call(&self, method: &str, args: &[Token]) -> Result<Bytes> {
        //! Selector followed by ABI-encoded arguments.
        let function = self.function(method)?;
        function
            .encode_input(args)
            .map(Bytes::from)
            .map_err(|e| Error::validation(method, format!("arguments do not match ABI: {e}")))
    }

    pub fn encode_deploy(&self, args: &[Token]) -> Result<Bytes> {
        //! Creation bytecode followed by ABI-encoded constructor arguments.
        let code = self
            .bytecode
            .as_ref()
            .ok_or_else(|| Error::artifact(&self.name, "deployment bytecode is not loaded"))?;
        match &self.abi.constructor {
            Some(constructor) => constructor
                .encode_input(code.to_vec(), args)
                .map(Bytes::from)
                .map_err(|e| {
                    Error::validation("constructor", format!("arguments do not match ABI: {e}"))
                }),
            None if args.is_empty() => Ok(code.clone()),
            None => Err(Error::validation(
                "constructor",
                format!("`{}` takes no constructor arguments", self.name),
            )),
        }
    }
}

/// Named set of contract descriptors.
#[derive(Clone, Debug, Default)]
pub struct ContractRegistry {
    descriptors: HashMap<String, Arc<ContractDescriptor>>,
}

impl ContractRegistry {
    pub fn bundled() -> Result<Self> {
        //! Registry with every bundled ABI and bundled bytecode.
        let mut descriptors = HashMap::new();
        for kind in ContractKind::ALL {
            let name = kind.artifact_name();
            descriptors.insert(
                name.to_string(),
                Arc::new(ContractDescriptor::from_abi_json(name, kind.bundled_abi())?),
            );
        }
        for flavor in CustodialFlavor::all() {
            let name = flavor.artifact_name()?;
            let abi = if flavor.batch {
                CUSTODIAL_BATCH_ABI
            } else {
                CUSTODIAL_ABI
            };
            let descriptor = ContractDescriptor::from_abi_json(&name, abi)?;
            descriptors.insert(name, Arc::new(descriptor));
        }
        BUNDLED_BYTECODE
            .into_iter()
            .try_fold(Self { descriptors }, |registry, (name, code)| {
                registry.with_bytecode(name, code.trim())
            })
    }

    pub fn with_bytecode(mut self, name: &str, bytecode: &str) -> Result<Self> {
        //! Attach creation bytecode (hex, `0x` optional) to a known artifact.
        let code = decode_hex(bytecode).map_err(|e| Error::artifact(name, e))?;
        if code.is_empty() {
            return Err(Error::artifact(name, "bytecode is empty"));
        }
        let entry = self
            .descriptors
            .get_mut(name)
            .ok_or_else(|| Error::artifact(name, "unknown artifact"))?;
        Arc::make_mut(entry).bytecode = Some(Bytes::from(code));
        Ok(self)
    }

    pub fn load_artifacts(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        //! Read `<name>.abi` and `<name>.bin` files from a directory.
        //!
        //! Only known artifact names are considered. A present `.abi` file
        //! replaces the bundled interface; a present `.bin` file supplies the
        //! creation bytecode. Missing files are skipped.
        let dir = dir.as_ref();
        let names: Vec<String> = self.descriptors.keys().cloned().collect();
        for name in names {
            let abi_path = dir.join(format!("{name}.abi"));
            if abi_path.is_file() {
                let abi = fs::read_to_string(&abi_path).map_err(|e| Error::artifact(&name, e))?;
                let descriptor = ContractDescriptor::from_abi_json(&name, &abi)?;
                if let Some(entry) = self.descriptors.get_mut(&name) {
                    let bytecode = entry.bytecode.clone();
                    *entry = Arc::new(ContractDescriptor {
                        bytecode,
                        ..descriptor
                    });
                }
                tracing::debug!(artifact = %name, "Replaced bundled ABI");
            }
            let bin_path = dir.join(format!("{name}.bin"));
            if bin_path.is_file() {
                let code = fs::read_to_string(&bin_path).map_err(|e| Error::artifact(&name, e))?;
                self = self.with_bytecode(&name, code.trim())?;
                tracing::debug!(artifact = %name, "Loaded bytecode");
            }
        }
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Result<Arc<ContractDescriptor>> {
        //! Descriptor by artifact name.
        self.descriptors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnsupportedOperation(format!("unknown contract `{name}`")))
    }

    pub fn descriptor(&self, kind: ContractKind) -> Result<Arc<ContractDescriptor>> {
        //! Descriptor of a contract standard.
        self.get(kind.artifact_name())
    }

    pub fn custodial(&self, flavor: CustodialFlavor) -> Result<Arc<ContractDescriptor>> {
        //! Descriptor of a custodial wallet flavour.
        self.get(&flavor.artifact_name()?)
    }
}
