//! Receive: atomically swap a [`Token`]'s proofs at the mint into fresh,
//! wallet-owned proofs
//!
//! A received token might be P2PK-locked; this module classifies the lock
//! state of the input proofs before anything is sent to the mint, signs if
//! a matching key was supplied, and otherwise swaps unlocked proofs as-is.
//! Mixed-condition tokens (some proofs locked, some not, or locked to
//! different keys) are rejected rather than partially processed.

use cashu_core::nuts::{DleqVerificationResult, ProofsMethods, SecretKey, SpendingConditions, Token};
use cashu_core::Proofs;
use tracing::instrument;

use super::error::Error;
use super::Wallet;

/// Outcome of a successful [`Wallet::receive`] call.
#[derive(Debug, Clone)]
pub struct ReceiveOutcome {
    /// Freshly minted proofs, owned by this wallet.
    pub proofs: Proofs,
    /// Aggregate DLEQ result over the spent (token) proofs.
    pub input_dleq: DleqVerificationResult,
    /// Aggregate DLEQ result over the new proofs.
    pub output_dleq: DleqVerificationResult,
}

/// How a token's input proofs relate to a locking key the caller may have
/// supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockClassification {
    /// No proof carries a P2PK lock.
    NotLocked,
    /// Every proof is locked to the same key, and it matches the supplied one.
    Match,
    /// Every proof is locked to the same key, but it does not match (or no
    /// key was supplied at all).
    Mismatch,
    /// Proofs disagree on whether, or to whom, they are locked.
    Partial,
}

fn classify_lock(proofs: &Proofs, candidate: Option<&SecretKey>) -> LockClassification {
    let mut locked_to: Option<cashu_core::PublicKey> = None;
    let mut saw_unlocked = false;
    let mut saw_locked = false;

    for proof in proofs {
        match SpendingConditions::try_from(&proof.secret) {
            Ok(SpendingConditions::P2PKConditions { data, .. }) => {
                saw_locked = true;
                match locked_to {
                    None => locked_to = Some(data),
                    Some(existing) if existing == data => {}
                    Some(_) => return LockClassification::Partial,
                }
            }
            Ok(SpendingConditions::HTLCConditions { .. }) | Err(_) => {
                saw_unlocked = true;
            }
        }
    }

    if saw_locked && saw_unlocked {
        return LockClassification::Partial;
    }
    if !saw_locked {
        return LockClassification::NotLocked;
    }

    match (locked_to, candidate) {
        (Some(lock), Some(key)) if lock == key.public_key() => LockClassification::Match,
        _ => LockClassification::Mismatch,
    }
}

impl Wallet {
    /// Receive `token`, swapping its proofs at the mint for fresh ones this
    /// wallet owns.
    ///
    /// `unlock_key`, if given, signs every token proof that is P2PK-locked
    /// to the matching public key. A token locked to a different key, or
    /// whose proofs disagree on the lock, is rejected before any network
    /// call. `counter` is required when this wallet is deterministic.
    #[instrument(skip(self, token, unlock_key))]
    pub async fn receive(
        &self,
        token: &Token,
        unlock_key: Option<SecretKey>,
        counter: Option<u32>,
    ) -> Result<ReceiveOutcome, Error> {
        let token_mint_url = token.mint_url()?;
        if token_mint_url != self.mint_url {
            tracing::warn!(
                "token names mint {} but this wallet talks to {}",
                token_mint_url,
                self.mint_url
            );
        }

        let keyset_infos = self.keyset_infos().await?;
        let mut proofs = token.proofs(&keyset_infos)?;

        if let Some(token_unit) = token.unit() {
            if token_unit != self.unit {
                return Err(Error::UnitError);
            }
        }
        self.check_single_unit(&proofs).await?;

        match classify_lock(&proofs, unlock_key.as_ref()) {
            LockClassification::NotLocked => {}
            LockClassification::Match => {
                let key = unlock_key.expect("Match only returned when a key was supplied");
                for proof in proofs.iter_mut() {
                    proof
                        .sign_p2pk(key.clone())
                        .map_err(|e| Error::P2pkSigningError(e.to_string()))?;
                }
            }
            LockClassification::Mismatch => return Err(Error::LockingConditionMismatch),
            LockClassification::Partial => return Err(Error::LockingConditionMismatch),
        }

        let input_total = proofs.total_amount()?;
        let fee_map = self.fee_map().await?;
        let fee = cashu_core::fees::calculate_fee(&proofs.count_by_keyset(), &fee_map)?;
        let keep_amount = if input_total < fee {
            return Err(Error::InsufficientInputs {
                have: input_total,
                need: fee,
            });
        } else {
            input_total - fee
        };

        let swap = self
            .swap(proofs.clone(), keep_amount, cashu_core::Amount::ZERO, None, counter)
            .await?;

        Ok(ReceiveOutcome {
            proofs: swap.keep_proofs,
            input_dleq: swap.input_dleq,
            output_dleq: swap.output_dleq,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use cashu_core::nuts::Id;
    use cashu_core::secret::Secret as RawSecret;
    use cashu_core::{Proof, PublicKey};

    use super::*;

    fn unlocked_proof(keyset_id: Id) -> Proof {
        Proof::new(
            cashu_core::Amount::from(4u64),
            keyset_id,
            RawSecret::generate(),
            PublicKey::from_str(
                "02194603ffa36356f4a56b7df9371fc3192472351453ec7398b8da8117e7c516f",
            )
            .expect("valid test pubkey"),
        )
    }

    fn locked_proof(keyset_id: Id, lock: cashu_core::PublicKey) -> Proof {
        let conditions = SpendingConditions::new_p2pk(lock, None);
        let nut10_secret: cashu_core::nuts::Nut10Secret = conditions.into();
        let secret: RawSecret = nut10_secret.try_into().expect("valid p2pk secret");
        Proof::new(
            cashu_core::Amount::from(4u64),
            keyset_id,
            secret,
            PublicKey::from_str(
                "02194603ffa36356f4a56b7df9371fc3192472351453ec7398b8da8117e7c516f",
            )
            .expect("valid test pubkey"),
        )
    }

    #[test]
    fn classify_not_locked_when_no_proof_carries_a_condition() {
        let keyset_id = Id::from_str("00916bbf7ef91a36").expect("valid test keyset id");
        let proofs = vec![unlocked_proof(keyset_id), unlocked_proof(keyset_id)];
        assert_eq!(classify_lock(&proofs, None), LockClassification::NotLocked);
    }

    #[test]
    fn classify_match_when_key_matches_every_locked_proof() {
        let keyset_id = Id::from_str("00916bbf7ef91a36").expect("valid test keyset id");
        let key = SecretKey::generate();
        let proofs = vec![
            locked_proof(keyset_id, key.public_key()),
            locked_proof(keyset_id, key.public_key()),
        ];
        assert_eq!(
            classify_lock(&proofs, Some(&key)),
            LockClassification::Match
        );
    }

    #[test]
    fn classify_mismatch_when_no_key_supplied() {
        let keyset_id = Id::from_str("00916bbf7ef91a36").expect("valid test keyset id");
        let key = SecretKey::generate();
        let proofs = vec![locked_proof(keyset_id, key.public_key())];
        assert_eq!(classify_lock(&proofs, None), LockClassification::Mismatch);
    }

    #[test]
    fn classify_partial_when_proofs_disagree_on_lock() {
        let keyset_id = Id::from_str("00916bbf7ef91a36").expect("valid test keyset id");
        let key_a = SecretKey::generate();
        let key_b = SecretKey::generate();
        let proofs = vec![
            locked_proof(keyset_id, key_a.public_key()),
            locked_proof(keyset_id, key_b.public_key()),
        ];
        assert_eq!(classify_lock(&proofs, Some(&key_a)), LockClassification::Partial);
    }

    #[test]
    fn classify_partial_when_mixing_locked_and_unlocked() {
        let keyset_id = Id::from_str("00916bbf7ef91a36").expect("valid test keyset id");
        let key = SecretKey::generate();
        let proofs = vec![locked_proof(keyset_id, key.public_key()), unlocked_proof(keyset_id)];
        assert_eq!(classify_lock(&proofs, Some(&key)), LockClassification::Partial);
    }
}
