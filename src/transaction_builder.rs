//! Assembly of unsigned transactions from encoded calls.

use crate::address::Address;
use crate::config::{ChainProfile, GasPricePolicy};
use crate::error::{Error, Result};
use crate::rlp::Bytes;
use crate::rpc::{CallRequest, ChainRpc};
use crate::transactions::UnsignedTransaction;
use crate::U256;

#[derive(Clone, Debug, Eq, PartialEq, Default)]
struct TransactionTemplate {
    from: Option<Address>,
    to: Option<Address>,
    value: U256,
    data: Bytes,
    nonce: Option<u64>,
    gas: Option<u64>,
    gas_price: Option<U256>,
}

/// Transaction builder allows to create and prepare transactions
/// with minimal developers efforts.
///
/// Values that are not set explicitly are resolved by [`TransactionBuilder::build`]:
/// nonce first, then gas price, then gas limit.
#[derive(Debug)]
pub struct TransactionBuilder<'a, R> {
    rpc: &'a R,
    profile: &'a ChainProfile,
    template: TransactionTemplate,
}

impl<'a, R: ChainRpc> TransactionBuilder<'a, R> {
    #[must_use]
    pub fn new(rpc: &'a R, profile: &'a ChainProfile) -> Self {
        //! Create a new builder.
        Self {
            rpc,
            profile,
            template: TransactionTemplate::default(),
        }
    }
    #[must_use]
    pub const fn sender(mut self, sender: Option<Address>) -> Self {
        //! Set the sender. Without one the nonce is left to the signer.
        self.template.from = sender;
        self
    }
    #[must_use]
    pub const fn to(mut self, recipient: Option<Address>) -> Self {
        //! Set the recipient. `None` creates a contract.
        self.template.to = recipient;
        self
    }
    #[must_use]
    pub const fn value(mut self, value: U256) -> Self {
        //! Set native coin amount in wei.
        self.template.value = value;
        self
    }
    #[must_use]
    pub fn data(mut self, data: Bytes) -> Self {
        //! Set call data or creation code.
        self.template.data = data;
        self
    }
    #[must_use]
    pub const fn nonce(mut self, nonce: Option<u64>) -> Self {
        //! Set a nonce for transaction.
        self.template.nonce = nonce;
        self
    }
    #[must_use]
    pub const fn gas(mut self, gas: Option<u64>) -> Self {
        //! Set maximal gas amount for transaction.
        self.template.gas = gas;
        self
    }
    #[must_use]
    pub const fn gas_price(mut self, gas_price: Option<U256>) -> Self {
        //! Set gas price in wei.
        self.template.gas_price = gas_price;
        self
    }

    async fn resolve_nonce(&self) -> Result<Option<u64>> {
        match (self.template.nonce, self.template.from) {
            (Some(nonce), _) => Ok(Some(nonce)),
            (None, Some(sender)) => {
                let nonce = self.rpc.next_nonce(sender).await.map_err(|e| {
                    tracing::warn!(error = %e, "Nonce query failed");
                    Error::Estimation(e)
                })?;
                Ok(Some(nonce))
            }
            (None, None) => Ok(None),
        }
    }

    async fn resolve_gas_price(&self) -> Result<U256> {
        if let Some(price) = self.template.gas_price {
            return Ok(price);
        }
        match self.profile.gas_price {
            GasPricePolicy::Fixed(price) => Ok(price),
            GasPricePolicy::Oracle => self.rpc.gas_price().await.map_err(|e| {
                tracing::warn!(error = %e, "Gas price query failed");
                Error::Estimation(e)
            }),
        }
    }

    async fn resolve_gas(&self) -> Result<u64> {
        if let Some(gas) = self.template.gas {
            return Ok(gas);
        }
        let call = CallRequest {
            from: self.template.from,
            to: self.template.to,
            value: self.template.value,
            data: self.template.data.clone(),
        };
        self.rpc.estimate_gas(&call).await.map_err(|e| {
            tracing::warn!(error = %e, "Gas estimation failed");
            Error::Estimation(e)
        })
    }

    pub async fn build(&self) -> Result<UnsignedTransaction> {
        //! Prepare an [`UnsignedTransaction`]. This may perform network
        //! requests to identify appropriate parameters.
        let nonce = self.resolve_nonce().await?;
        let gas_price = self.resolve_gas_price().await?;
        let gas = self.resolve_gas().await?;
        tracing::debug!(
            chain = self.profile.name,
            ?nonce,
            gas,
            %gas_price,
            "Assembled transaction"
        );
        Ok(UnsignedTransaction {
            from: self.template.from,
            to: self.template.to,
            value: self.template.value,
            data: self.template.data.clone(),
            nonce,
            gas: Some(gas),
            gas_price: Some(gas_price),
            chain_id: self.profile.chain_id,
        })
    }
}
