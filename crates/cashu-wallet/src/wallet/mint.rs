//! Mint (issue): requesting and redeeming a Lightning-funded mint quote
//!
//! Two steps, both against `/v1/mint/quote/bolt11` and `/v1/mint/bolt11`
//! (NUT-04): `mint_quote` asks the mint for an invoice, `mint` redeems a
//! paid quote for freshly blinded signatures. The deterministic-secret
//! counter is never advanced on a failed `mint` call — `mintingDisabled`,
//! `quoteNotPaid`, and `proofsAlreadyIssuedForQuote` all leave the
//! caller's persisted counter untouched.

use cashu_core::amount::{FeeAndAmounts, SplitTarget};
use cashu_core::dhke::construct_proofs;
use cashu_core::nuts::{DleqVerificationResult, MintQuoteBolt11Response, ProofsMethods};
use cashu_core::{Amount, Proofs};
use tracing::instrument;

use super::error::Error;
use super::Wallet;

/// Outcome of a successful [`Wallet::mint`] call.
#[derive(Debug, Clone)]
pub struct MintOutcome {
    /// The newly minted proofs.
    pub proofs: Proofs,
    /// Aggregate DLEQ check result across the new proofs.
    pub dleq: DleqVerificationResult,
    /// How far to advance the persisted keyset counter, if this wallet is
    /// deterministic.
    pub counter_increase: Option<u32>,
}

impl Wallet {
    /// Request a mint quote for `amount` in this wallet's unit.
    #[instrument(skip(self))]
    pub async fn mint_quote(&self, amount: Amount) -> Result<MintQuoteBolt11Response, Error> {
        self.client
            .post_mint_quote(&self.mint_url, amount, self.unit.clone())
            .await
    }

    /// Poll the current state of a mint quote.
    #[instrument(skip(self))]
    pub async fn mint_quote_status(
        &self,
        quote_id: &str,
    ) -> Result<MintQuoteBolt11Response, Error> {
        self.client
            .get_mint_quote_status(&self.mint_url, quote_id)
            .await
    }

    /// Redeem a paid mint quote for `amount` worth of new proofs.
    ///
    /// `preferred_distribution`, if given, must sum to `amount`; otherwise
    /// the amount is split by [`SplitTarget::None`] (fewest denominations).
    /// `counter` is required when this wallet has a seed, and ignored
    /// (outputs are random) otherwise.
    #[instrument(skip(self, preferred_distribution))]
    pub async fn mint(
        &self,
        quote: &MintQuoteBolt11Response,
        amount: Amount,
        counter: Option<u32>,
        preferred_distribution: Option<Vec<Amount>>,
    ) -> Result<MintOutcome, Error> {
        if !quote.paid {
            return Err(Error::QuoteNotPaid);
        }
        if let Some(distribution) = &preferred_distribution {
            let sum = Amount::try_sum(distribution.iter().copied())?;
            if sum != amount {
                return Err(Error::PreferredDistributionMismatch);
            }
        }

        let keyset_info = self.active_keyset_info().await?;
        let fee = FeeAndAmounts::new(keyset_info.input_fee_ppk);

        let (premint_secrets, counter_increase) = match &preferred_distribution {
            Some(distribution) => {
                self.new_premint_secrets_for_amounts(keyset_info.id, distribution, counter)?
            }
            None => self.new_premint_secrets(
                keyset_info.id,
                amount,
                &SplitTarget::None,
                &fee,
                counter,
            )?,
        };

        let request = cashu_core::nuts::MintRequest {
            quote: quote.quote.clone(),
            outputs: premint_secrets.blinded_messages(),
        };

        let response = self.client.post_mint(&self.mint_url, request).await?;

        let active_keyset = self.keyset(keyset_info.id).await?;
        let proofs = construct_proofs(
            response.signatures,
            premint_secrets.rs(),
            premint_secrets.secrets(),
            &active_keyset.keys,
        )?;

        let dleq = super::aggregate_dleq(proofs.iter().filter_map(|proof| {
            active_keyset
                .keys
                .amount_key(proof.amount)
                .map(|pubkey| proof.verify_dleq_result(*pubkey))
        }));

        if proofs.total_amount()? != amount {
            return Err(Error::InsufficientInputs {
                have: proofs.total_amount()?,
                need: amount,
            });
        }

        Ok(MintOutcome {
            proofs,
            dleq,
            counter_increase,
        })
    }
}
