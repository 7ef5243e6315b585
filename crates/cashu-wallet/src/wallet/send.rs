//! Send: split proofs on hand into a "send" partition wrapped as a
//! [`Token`], plus a "keep" remainder
//!
//! Reuses [`Wallet::swap`] for the two-way split and, when the caller asks
//! for the exact amount on hand with no lock, skips the mint round-trip
//! entirely and wraps the input proofs directly into a token.

use cashu_core::fees::calculate_fee;
use cashu_core::nuts::{
    DleqVerificationResult, ProofsMethods, PublicKey, SpendingConditions, Token,
};
use cashu_core::{Amount, Proofs};
use tracing::instrument;

use super::error::Error;
use super::Wallet;

/// Outcome of a successful [`Wallet::send`] call.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// Token to hand to the recipient.
    pub token: Token,
    /// Proofs kept in the wallet (the swap's `keep` partition). Empty for
    /// an exact-amount, no-lock send, since nothing is swapped.
    pub change: Proofs,
    /// Aggregate DLEQ result over the proofs placed in `token`.
    pub output_dleq: DleqVerificationResult,
    /// How far to advance the persisted keyset counter. Never counts
    /// P2PK-locked send outputs, which do not consume deterministic slots.
    pub counter_increase: Option<u32>,
}

/// `(keep_amount, send_amount)` for a send of `send_target` (or, if
/// unspecified, everything minus the fee) out of `input_total`.
fn solve_split(
    input_total: Amount,
    send_target: Option<Amount>,
    fee: Amount,
) -> Result<(Amount, Amount), Error> {
    let send_amount = match send_target {
        Some(target) => target,
        None => {
            if input_total < fee {
                return Err(Error::InsufficientInputs {
                    have: input_total,
                    need: fee,
                });
            }
            input_total - fee
        }
    };

    let required = send_amount.checked_add(fee)?;
    if input_total < required {
        return Err(Error::InsufficientInputs {
            have: input_total,
            need: required,
        });
    }

    Ok((input_total - required, send_amount))
}

impl Wallet {
    /// Send `amount` (or everything, if `None`) out of `inputs`, optionally
    /// locking the resulting token to `lock_pubkey` (P2PK, NUT-11).
    ///
    /// Rejects proofs that already carry a spending condition — sending an
    /// already-locked proof on is not supported. `counter` is required when
    /// this wallet is deterministic and a mint round-trip is needed
    /// (i.e. not the exact-amount, unlocked short-circuit).
    #[instrument(skip(self, inputs, memo))]
    pub async fn send(
        &self,
        inputs: Proofs,
        amount: Option<Amount>,
        memo: Option<String>,
        lock_pubkey: Option<PublicKey>,
        counter: Option<u32>,
    ) -> Result<SendOutcome, Error> {
        for proof in &inputs {
            if cashu_core::nuts::Nut10Secret::try_from(&proof.secret).is_ok() {
                return Err(Error::UnsupportedToken(
                    "cannot send a proof that already carries a spending condition".to_string(),
                ));
            }
        }

        self.check_single_unit(&inputs).await?;

        let input_total = inputs.total_amount()?;
        let fee_map = self.fee_map().await?;
        let fee = calculate_fee(&inputs.count_by_keyset(), &fee_map)?;

        let unlocked_exact_send = lock_pubkey.is_none()
            && amount.map(|target| target == input_total).unwrap_or(true)
            && fee == Amount::ZERO;

        if unlocked_exact_send {
            let token = self.wrap_token(inputs, memo)?;
            return Ok(SendOutcome {
                token,
                change: Proofs::new(),
                output_dleq: DleqVerificationResult::Valid,
                counter_increase: None,
            });
        }

        let (keep_amount, send_amount) = solve_split(input_total, amount, fee)?;

        let send_conditions = lock_pubkey.map(|pk| SpendingConditions::new_p2pk(pk, None));

        let swap = self
            .swap(inputs, keep_amount, send_amount, send_conditions, counter)
            .await?;

        let token = self.wrap_token(swap.send_proofs, memo)?;

        Ok(SendOutcome {
            token,
            change: swap.keep_proofs,
            output_dleq: swap.output_dleq,
            counter_increase: swap.counter_increase,
        })
    }

    fn wrap_token(&self, proofs: Proofs, memo: Option<String>) -> Result<Token, Error> {
        Ok(Token::new(
            self.mint_url.clone(),
            proofs,
            memo,
            self.unit.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_split_defaults_send_to_everything_minus_fee() {
        let (keep, send) =
            solve_split(Amount::from(100), None, Amount::from(3)).expect("solves");
        assert_eq!(send, Amount::from(97));
        assert_eq!(keep, Amount::ZERO);
    }

    #[test]
    fn solve_split_keeps_remainder_after_a_target_send() {
        let (keep, send) =
            solve_split(Amount::from(128), Some(Amount::from(100)), Amount::ZERO)
                .expect("solves");
        assert_eq!(send, Amount::from(100));
        assert_eq!(keep, Amount::from(28));
    }

    #[test]
    fn solve_split_rejects_insufficient_inputs() {
        let err = solve_split(Amount::from(10), Some(Amount::from(20)), Amount::ZERO)
            .expect_err("insufficient");
        assert!(matches!(err, Error::InsufficientInputs { .. }));
    }
}
