//! Check proof state: ask the mint whether proofs are still spendable
//!
//! `POST /v1/checkstate` (NUT-07). Useful to reconcile proofs left in an
//! unknown state by an interrupted operation — a melt that timed out
//! mid-poll, a send whose token was never confirmed as received — without
//! needing the original secrets, only their `Y` values.

use cashu_core::nuts::{CheckStateRequest, ProofState, ProofsMethods};
use cashu_core::Proofs;
use tracing::instrument;

use super::error::Error;
use super::Wallet;

impl Wallet {
    /// Query the mint's state (`UNSPENT`, `SPENT`, `PENDING`, `RESERVED`)
    /// for every proof in `proofs`.
    ///
    /// Returned in the same order as `proofs`.
    #[instrument(skip(self, proofs))]
    pub async fn check_proofs_state(&self, proofs: &Proofs) -> Result<Vec<ProofState>, Error> {
        let ys = proofs.ys()?;
        let request = CheckStateRequest { ys };
        let response = self.client.post_check_state(&self.mint_url, request).await?;
        Ok(response.states)
    }
}
