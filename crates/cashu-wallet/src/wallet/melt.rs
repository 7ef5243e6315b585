//! Melt: redeem proofs for a Lightning payment the mint makes on the
//! wallet's behalf
//!
//! `POST /v1/melt/bolt11` (NUT-05), with optional blank outputs for
//! NUT-08 fee-reserve change. A melt quote that comes back `pending`
//! leaves the input proofs in an ambiguous state from the wallet's point
//! of view — the caller must poll [`Wallet::melt_quote_status`] until it
//! settles rather than retrying the melt itself.

use cashu_core::dhke::construct_proofs;
use cashu_core::fees::calculate_fee;
use cashu_core::nuts::{MeltQuoteBolt11Response, ProofsMethods};
use cashu_core::{Amount, Proofs};
use tracing::instrument;

use super::error::Error;
use super::Wallet;

/// Outcome of a successful [`Wallet::melt`] call.
#[derive(Debug, Clone)]
pub struct MeltOutcome {
    /// Whether the mint reports the Lightning payment as settled.
    pub paid: bool,
    /// Lightning payment preimage, if the mint returned one.
    pub preimage: Option<String>,
    /// Change proofs unblinded from the mint's overpaid-fee-reserve
    /// response (NUT-08), if any were requested and returned.
    pub change: Proofs,
    /// Aggregate DLEQ result over the change proofs.
    pub change_dleq: cashu_core::nuts::DleqVerificationResult,
    /// How far to advance the persisted keyset counter for the blank
    /// change outputs that were sent.
    pub counter_increase: Option<u32>,
}

impl Wallet {
    /// Request a quote to pay `invoice` out of this wallet's ecash.
    #[instrument(skip(self, invoice))]
    pub async fn melt_quote(
        &self,
        invoice: cashu_core::Bolt11Invoice,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        self.client
            .post_melt_quote(&self.mint_url, invoice, self.unit.clone())
            .await
    }

    /// Poll the current state of a melt quote.
    ///
    /// Used after a [`Wallet::melt`] call returns with the Lightning
    /// payment still in flight, and by callers reconciling an interrupted
    /// session against quotes whose outcome was never observed.
    #[instrument(skip(self))]
    pub async fn melt_quote_status(
        &self,
        quote_id: &str,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        self.client
            .get_melt_quote_status(&self.mint_url, quote_id)
            .await
    }

    /// Settle `quote` by handing `proofs` to the mint.
    ///
    /// `proofs` must sum to at least `quote.amount + quote.fee_reserve`
    /// plus this wallet's input fee for those proofs, checked locally
    /// before any network call. Blank change outputs are generated
    /// automatically, sized to `quote.fee_reserve`, so the mint can
    /// return unspent reserve as fresh ecash rather than keeping it;
    /// `counter` is required to derive them deterministically when this
    /// wallet has a seed.
    #[instrument(skip(self, proofs))]
    pub async fn melt(
        &self,
        quote: &MeltQuoteBolt11Response,
        proofs: Proofs,
        counter: Option<u32>,
    ) -> Result<MeltOutcome, Error> {
        self.check_single_unit(&proofs).await?;

        let input_total = proofs.total_amount()?;
        let fee_map = self.fee_map().await?;
        let input_fee = calculate_fee(&proofs.count_by_keyset(), &fee_map)?;

        let amount = Amount::from(quote.amount);
        let fee_reserve = Amount::from(quote.fee_reserve);
        let required = amount.checked_add(fee_reserve)?.checked_add(input_fee)?;

        if input_total < required {
            return Err(Error::InsufficientInputs {
                have: input_total,
                need: required,
            });
        }

        let active_keyset_info = self.active_keyset_info().await?;
        let (blank_outputs, counter_increase) =
            self.new_blank_premint_secrets(active_keyset_info.id, fee_reserve, counter)?;
        let outputs = if blank_outputs.is_empty() {
            None
        } else {
            Some(blank_outputs.blinded_messages())
        };

        let inputs = proofs.without_dleqs();
        let response = self
            .client
            .post_melt(&self.mint_url, quote.quote.clone(), inputs, outputs)
            .await?;

        let (change, change_dleq) = match response.change {
            Some(promises) if !blank_outputs.is_empty() => {
                let active_keyset = self.keyset(active_keyset_info.id).await?;
                let returned = promises.len();
                let change_proofs = construct_proofs(
                    promises,
                    blank_outputs.rs()[..returned].to_vec(),
                    blank_outputs.secrets()[..returned].to_vec(),
                    &active_keyset.keys,
                )?;
                let dleq = super::aggregate_dleq(change_proofs.iter().filter_map(|proof| {
                    active_keyset
                        .keys
                        .amount_key(proof.amount)
                        .map(|pubkey| proof.verify_dleq_result(*pubkey))
                }));
                (change_proofs, dleq)
            }
            _ => (
                Proofs::new(),
                cashu_core::nuts::DleqVerificationResult::NoData,
            ),
        };

        Ok(MeltOutcome {
            paid: response.paid,
            preimage: response.payment_preimage,
            change,
            change_dleq,
            counter_increase,
        })
    }
}
