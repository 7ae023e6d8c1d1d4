//! Final submission of a signed payload.

use crate::error::{Error, Result};
use crate::rpc::{ChainRpc, SignerRelay};
use crate::signing::SignedPayload;

/// Routes a payload to the chain or to the signer relay.
#[derive(Debug)]
pub struct Broadcaster<'a, R, K> {
    rpc: &'a R,
    relay: &'a K,
}

impl<'a, R: ChainRpc, K: SignerRelay> Broadcaster<'a, R, K> {
    pub const fn new(rpc: &'a R, relay: &'a K) -> Self {
        //! Borrow both collaborators.
        Self { rpc, relay }
    }

    pub async fn submit(&self, payload: &SignedPayload) -> Result<String> {
        //! Submit and return the chain transaction hash, or the relay
        //! acknowledgement id for pending payloads.
        //!
        //! Failures are returned as [`Error::Broadcast`] and never retried.
        match payload {
            SignedPayload::Raw(raw) => {
                let hash = self.rpc.send_raw_transaction(raw).await.map_err(|e| {
                    tracing::warn!(error = %e, "Raw transaction rejected");
                    Error::Broadcast(e)
                })?;
                tracing::info!(%hash, "Broadcast transaction");
                Ok(hash)
            }
            SignedPayload::Pending { signature_id, .. } => {
                let envelope = payload.serialize()?;
                let ack = self
                    .relay
                    .register(&envelope, signature_id)
                    .await
                    .map_err(|e| {
                        tracing::warn!(error = %e, %signature_id, "Relay registration failed");
                        Error::Broadcast(e)
                    })?;
                tracing::info!(%signature_id, %ack, "Registered pending transaction");
                Ok(ack)
            }
        }
    }
}
