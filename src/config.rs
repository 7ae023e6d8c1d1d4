//! Client configuration and chain profiles.
//!
//! Nothing here reads the process environment: callers build a
//! [`ClientConfig`] explicitly (or deserialize it from their own config
//! file) and pick a [`ChainProfile`].

use crate::units::{ETHER_DECIMALS, GWEI_DECIMALS};
use crate::U256;
use serde::{Deserialize, Serialize};

/// Default base URL of the hosted API gateway.
pub const DEFAULT_API_URL: &str = "https://api.tatum.io";

/// Where to send RPC traffic and relay registrations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// API gateway base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key appended to gateway RPC URLs and sent as `x-api-key`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Explicit RPC endpoint, overrides the gateway URL for chain traffic
    #[serde(default)]
    pub provider: Option<String>,
    /// Use testnet chain ids
    #[serde(default)]
    pub testnet: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            provider: None,
            testnet: false,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        //! Gateway configuration with the given base URL and key.
        Self {
            api_url: api_url.into(),
            api_key,
            ..Self::default()
        }
    }
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        //! Route chain RPC traffic to a specific node.
        self.provider = Some(provider.into());
        self
    }
    #[must_use]
    pub const fn testnet(mut self) -> Self {
        //! Switch to testnet.
        self.testnet = true;
        self
    }

    pub fn rpc_endpoint(&self, profile: &ChainProfile) -> String {
        //! JSON-RPC endpoint for the given chain.
        //!
        //! An explicit provider wins; otherwise the gateway web3 route
        //! `{api_url}/v3/{slug}/web3/{api_key}` is used.
        match &self.provider {
            Some(provider) => provider.clone(),
            None => format!(
                "{}/v3/{}/web3/{}",
                self.api_url.trim_end_matches('/'),
                profile.slug,
                self.api_key.as_deref().unwrap_or_default()
            ),
        }
    }

    pub fn relay_endpoint(&self, profile: &ChainProfile) -> String {
        //! Broadcast route of the signer relay for the given chain.
        format!(
            "{}/v3/{}/broadcast",
            self.api_url.trim_end_matches('/'),
            profile.slug
        )
    }
}

/// How to pick a gas price when the request does not carry one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GasPricePolicy {
    /// Always use this price (in wei).
    Fixed(U256),
    /// Ask the node (`eth_gasPrice`).
    Oracle,
}

/// Per-chain parameters of the otherwise generic pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainProfile {
    /// Human-readable name
    pub name: &'static str,
    /// Route segment used by the gateway (`kcc`, `ethereum`, ...)
    pub slug: &'static str,
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Decimals of the native coin
    pub native_decimals: u32,
    /// Default gas price policy
    pub gas_price: GasPricePolicy,
}

fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(GWEI_DECIMALS as usize)
}

impl ChainProfile {
    /// Chain id of KCC mainnet
    pub const KCC_MAINNET_CHAIN_ID: u64 = 321;
    /// Chain id of KCC testnet
    pub const KCC_TESTNET_CHAIN_ID: u64 = 322;

    pub fn kcc(testnet: bool) -> Self {
        //! KuCoin Community Chain. Gas price is fixed at 1 gwei.
        Self {
            name: "KCC",
            slug: "kcc",
            chain_id: if testnet {
                Self::KCC_TESTNET_CHAIN_ID
            } else {
                Self::KCC_MAINNET_CHAIN_ID
            },
            native_decimals: ETHER_DECIMALS,
            gas_price: GasPricePolicy::Fixed(gwei(1)),
        }
    }

    pub fn ethereum(testnet: bool) -> Self {
        //! Ethereum mainnet or Sepolia.
        Self {
            name: "Ethereum",
            slug: "ethereum",
            chain_id: if testnet { 11_155_111 } else { 1 },
            native_decimals: ETHER_DECIMALS,
            gas_price: GasPricePolicy::Oracle,
        }
    }

    pub fn bsc(testnet: bool) -> Self {
        //! BNB Smart Chain.
        Self {
            name: "BNB Smart Chain",
            slug: "bsc",
            chain_id: if testnet { 97 } else { 56 },
            native_decimals: ETHER_DECIMALS,
            gas_price: GasPricePolicy::Oracle,
        }
    }

    pub fn polygon(testnet: bool) -> Self {
        //! Polygon PoS mainnet or Amoy.
        Self {
            name: "Polygon",
            slug: "polygon",
            chain_id: if testnet { 80_002 } else { 137 },
            native_decimals: ETHER_DECIMALS,
            gas_price: GasPricePolicy::Oracle,
        }
    }

    pub fn harmony(testnet: bool) -> Self {
        //! Harmony ONE, shard 0.
        Self {
            name: "Harmony",
            slug: "one",
            chain_id: if testnet {
                1_666_700_000
            } else {
                1_666_600_000
            },
            native_decimals: ETHER_DECIMALS,
            gas_price: GasPricePolicy::Oracle,
        }
    }

    pub fn by_slug(slug: &str, testnet: bool) -> Option<Self> {
        //! Look up a built-in profile by its gateway slug.
        match slug {
            "kcc" => Some(Self::kcc(testnet)),
            "ethereum" | "eth" => Some(Self::ethereum(testnet)),
            "bsc" => Some(Self::bsc(testnet)),
            "polygon" | "matic" => Some(Self::polygon(testnet)),
            "one" | "harmony" => Some(Self::harmony(testnet)),
            _ => None,
        }
    }
}
