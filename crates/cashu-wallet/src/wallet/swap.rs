//! Swap: exchange proofs for freshly blinded outputs, split across a
//! "keep" and a "send" partition
//!
//! `POST /v1/swap` (NUT-03). The mint enforces
//! `sum(outputs) + fee == sum(inputs)`; this module computes the same fee
//! itself first so a mismatch surfaces as [`Error::InsufficientInputs`]
//! before the round-trip, and treats `transactionUnbalanced` from the mint
//! as a protocol violation rather than something to retry around.
//! [`crate::wallet::send`] and [`crate::wallet::receive`] are both built on
//! this operation.

use cashu_core::amount::FeeAndAmounts;
use cashu_core::fees::calculate_fee;
use cashu_core::nuts::{DleqVerificationResult, SpendingConditions, SwapRequest};
use cashu_core::{dhke::construct_proofs, Amount, Proofs};
use tracing::instrument;

use super::error::Error;
use super::Wallet;

/// Outcome of a successful [`Wallet::swap`] call.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    /// Proofs to keep in the wallet.
    pub keep_proofs: Proofs,
    /// Proofs intended to be handed to a recipient (or further wrapped as
    /// a [`cashu_core::nuts::Token`] by [`crate::wallet::send`]).
    pub send_proofs: Proofs,
    /// Aggregate DLEQ result over the spent inputs.
    pub input_dleq: DleqVerificationResult,
    /// Aggregate DLEQ result over the new outputs.
    pub output_dleq: DleqVerificationResult,
    /// How far to advance the persisted keyset counter. Only the keep
    /// partition and any unlocked send outputs consume deterministic
    /// slots — P2PK-locked send outputs do not.
    pub counter_increase: Option<u32>,
}

impl Wallet {
    /// Swap `inputs` into a `keep_amount` partition and a `send_amount`
    /// partition, optionally locking the send partition with
    /// `send_conditions` (e.g. P2PK).
    ///
    /// `keep_amount + send_amount + fee` must not exceed the sum of
    /// `inputs`, or this returns [`Error::InsufficientInputs`] without
    /// contacting the mint.
    #[instrument(skip(self, inputs, send_conditions))]
    pub async fn swap(
        &self,
        inputs: Proofs,
        keep_amount: Amount,
        send_amount: Amount,
        send_conditions: Option<SpendingConditions>,
        counter: Option<u32>,
    ) -> Result<SwapOutcome, Error> {
        self.check_single_unit(&inputs).await?;

        let fee_map = self.fee_map().await?;
        let fee = calculate_fee(
            &cashu_core::nuts::ProofsMethods::count_by_keyset(&inputs),
            &fee_map,
        )?;

        let input_total = cashu_core::nuts::ProofsMethods::total_amount(&inputs)?;
        let required = keep_amount
            .checked_add(send_amount)?
            .checked_add(fee)?;
        if input_total < required {
            return Err(Error::InsufficientInputs {
                have: input_total,
                need: required,
            });
        }

        let input_keys = self
            .keys_by_id(inputs.iter().map(|proof| proof.keyset_id))
            .await?;
        let input_dleq = super::aggregate_dleq(inputs.iter().filter_map(|proof| {
            input_keys
                .get(&proof.keyset_id)
                .and_then(|keys| keys.amount_key(proof.amount))
                .map(|pubkey| proof.verify_dleq_result(*pubkey))
        }));

        let active_keyset_info = self.active_keyset_info().await?;
        let fee_and_amounts = FeeAndAmounts::new(active_keyset_info.input_fee_ppk);

        let (mut keep_secrets, keep_next) = self.new_premint_secrets(
            active_keyset_info.id,
            keep_amount,
            &cashu_core::amount::SplitTarget::None,
            &fee_and_amounts,
            counter,
        )?;
        let keep_count = keep_secrets.len() as u32;

        let (send_secrets, counter_increase) = match send_conditions {
            Some(conditions) => {
                let secrets = cashu_core::nuts::PreMintSecrets::with_conditions(
                    active_keyset_info.id,
                    send_amount,
                    &cashu_core::amount::SplitTarget::None,
                    &conditions,
                    &fee_and_amounts,
                )?;
                (secrets, keep_next)
            }
            None => {
                let send_counter = counter.map(|start| start + keep_count);
                let (secrets, send_next) = self.new_premint_secrets(
                    active_keyset_info.id,
                    send_amount,
                    &cashu_core::amount::SplitTarget::None,
                    &fee_and_amounts,
                    send_counter,
                )?;
                (secrets, send_next)
            }
        };

        keep_secrets.combine(send_secrets);
        let outputs = keep_secrets.blinded_messages();

        let request = SwapRequest::new(inputs, outputs);
        let response = self.client.post_swap(&self.mint_url, request).await?;

        let active_keyset = self.keyset(active_keyset_info.id).await?;
        let mut proofs = construct_proofs(
            response.signatures,
            keep_secrets.rs(),
            keep_secrets.secrets(),
            &active_keyset.keys,
        )?;

        let output_dleq = super::aggregate_dleq(proofs.iter().filter_map(|proof| {
            active_keyset
                .keys
                .amount_key(proof.amount)
                .map(|pubkey| proof.verify_dleq_result(*pubkey))
        }));

        let send_proofs = proofs.split_off(keep_count as usize);
        let keep_proofs = proofs;

        Ok(SwapOutcome {
            keep_proofs,
            send_proofs,
            input_dleq,
            output_dleq,
            counter_increase,
        })
    }

    /// Ensure every proof in `proofs` belongs to a keyset minted for the
    /// same unit.
    pub(crate) async fn check_single_unit(&self, proofs: &Proofs) -> Result<(), Error> {
        let infos = self.keyset_infos().await?;
        let mut units = proofs.iter().map(|proof| {
            infos
                .iter()
                .find(|info| info.id == proof.keyset_id)
                .map(|info| info.unit.clone())
        });

        let first = units.next().flatten();
        match first {
            None => Ok(()),
            Some(unit) => {
                if units.all(|u| u.as_ref() == Some(&unit)) {
                    Ok(())
                } else {
                    Err(Error::UnitError)
                }
            }
        }
    }
}
