//! Balance arithmetic over caller-supplied proofs
//!
//! This crate keeps no ledger of its own, so there is no `Wallet::balance`
//! that reaches into a local store — a caller holding proofs already knows
//! which ones are unspent, pending, or reserved; these are plain functions
//! over whatever slice it passes in.

use cashu_core::nuts::ProofsMethods;
use cashu_core::{Amount, Proofs};

use super::error::Error;

/// Sum of `proofs`' amounts.
pub fn total(proofs: &Proofs) -> Result<Amount, Error> {
    Ok(proofs.total_amount()?)
}

/// Sum of `proofs`' amounts restricted to one keyset.
pub fn total_for_keyset(proofs: &Proofs, keyset_id: cashu_core::Id) -> Result<Amount, Error> {
    let filtered: Proofs = proofs
        .iter()
        .filter(|proof| proof.keyset_id == keyset_id)
        .cloned()
        .collect();
    Ok(filtered.total_amount()?)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use cashu_core::nuts::Id;
    use cashu_core::secret::Secret;
    use cashu_core::{Proof, PublicKey};

    use super::*;

    fn proof(keyset_id: Id, amount: u64) -> cashu_core::Proof {
        Proof::new(
            Amount::from(amount),
            keyset_id,
            Secret::generate(),
            PublicKey::from_str(
                "02194603ffa36356f4a56b7df9371fc3192472351453ec7398b8da8117e7c516f",
            )
            .expect("valid test pubkey"),
        )
    }

    #[test]
    fn total_sums_all_proofs() {
        let keyset_id = Id::from_str("00916bbf7ef91a36").expect("valid test keyset id");
        let proofs = vec![proof(keyset_id, 4), proof(keyset_id, 8)];
        assert_eq!(total(&proofs).expect("sum"), Amount::from(12));
    }

    #[test]
    fn total_for_keyset_filters_other_keysets() {
        let keyset_a = Id::from_str("00916bbf7ef91a36").expect("valid test keyset id");
        let keyset_b = Id::from_str("00ad268c4d1f5826").expect("valid test keyset id");
        let proofs = vec![proof(keyset_a, 4), proof(keyset_b, 16)];
        assert_eq!(
            total_for_keyset(&proofs, keyset_a).expect("sum"),
            Amount::from(4)
        );
    }
}
