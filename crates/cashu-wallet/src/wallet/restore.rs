//! Restore: recover proofs for a counter range from the seed alone
//!
//! `POST /v1/restore` (NUT-09). Re-derives the blinded messages a
//! deterministic wallet would have sent for `start_count..=end_count` and
//! asks the mint to resend any signatures it still has on file for them.
//! This is how a wallet that lost its local state, but kept its seed,
//! recovers ecash it already minted or received into.

use std::collections::HashMap;

use cashu_core::dhke::construct_proofs;
use cashu_core::nuts::{PreMintSecrets, RestoreRequest};
use cashu_core::{Id, Proofs, PublicKey};
use tracing::instrument;

use super::error::Error;
use super::Wallet;

/// Outcome of a successful [`Wallet::restore`] call.
#[derive(Debug, Clone)]
pub struct RestoreOutcome {
    /// Proofs the mint still had signatures for.
    pub proofs: Proofs,
    /// How many of `start_count..=end_count` actually came back signed.
    /// A caller restoring incrementally can use this to decide whether to
    /// keep widening the range.
    pub restored_count: u32,
}

impl Wallet {
    /// Restore signatures for the deterministic counter range
    /// `start_count..=end_count` against `keyset_id`.
    ///
    /// Requires this wallet to have a seed; a random wallet has nothing
    /// to re-derive.
    #[instrument(skip(self))]
    pub async fn restore(
        &self,
        keyset_id: Id,
        start_count: u32,
        end_count: u32,
    ) -> Result<RestoreOutcome, Error> {
        let seed = self.seed.ok_or(Error::MissingRequestDetail(
            "restore requires a deterministic wallet with a seed",
        ))?;

        let batch = PreMintSecrets::restore_batch(keyset_id, &seed, start_count, end_count)?;
        let outputs = batch.blinded_messages();

        let request = RestoreRequest {
            outputs: outputs.clone(),
        };
        let response = self.client.post_restore(&self.mint_url, request).await?;

        let by_blinded_secret: HashMap<PublicKey, usize> = outputs
            .iter()
            .enumerate()
            .map(|(i, output)| (output.blinded_secret, i))
            .collect();

        let rs = batch.rs();
        let secrets = batch.secrets();

        let mut matched_promises = Vec::with_capacity(response.outputs.len());
        let mut matched_rs = Vec::with_capacity(response.outputs.len());
        let mut matched_secrets = Vec::with_capacity(response.outputs.len());

        for (restored_output, signature) in response.outputs.iter().zip(response.signatures) {
            let Some(&index) = by_blinded_secret.get(&restored_output.blinded_secret) else {
                continue;
            };
            matched_promises.push(signature);
            matched_rs.push(rs[index].clone());
            matched_secrets.push(secrets[index].clone());
        }

        let restored_count = matched_promises.len() as u32;
        let keyset = self.keyset(keyset_id).await?;
        let proofs = construct_proofs(matched_promises, matched_rs, matched_secrets, &keyset.keys)?;

        Ok(RestoreOutcome {
            proofs,
            restored_count,
        })
    }
}
