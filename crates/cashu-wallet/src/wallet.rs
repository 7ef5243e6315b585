//! Wallet-side operation state machines
//!
//! A [`Wallet`] is a thin handle: a mint URL, a unit, an optional
//! deterministic-secret seed, and a [`MintConnector`]. It owns no
//! persistence and no background tasks. Every operation method reads a
//! fresh snapshot of the mint's keysets at the start of the call, and
//! returns any deterministic-counter advance the caller should persist
//! rather than tracking it internally — see each operation module
//! (`mint`, `swap`, `send`, `receive`, `melt`, `restore`, `check_state`)
//! for the exact contract.

use std::collections::HashMap;
use std::sync::Arc;

use cashu_core::amount::{FeeAndAmounts, SplitTarget};
use cashu_core::nuts::{CurrencyUnit, DleqVerificationResult, Id, KeySet, KeySetInfo, Keys, PreMintSecrets};
use cashu_core::{Amount, MintUrl};
use tracing::instrument;

pub mod balance;
pub mod builder;
pub mod check_state;
pub mod client;
pub mod error;
pub mod melt;
pub mod mint;
pub mod receive;
pub mod restore;
pub mod send;
pub mod swap;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::WalletBuilder;
pub use client::{HttpClient, MintConnector};
pub use error::Error;

/// A handle to one mint, for one currency unit.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The mint this wallet talks to.
    pub mint_url: MintUrl,
    /// The currency unit this wallet operates in.
    pub unit: CurrencyUnit,
    /// BIP-39 seed bytes for NUT-13 deterministic secrets. `None` means
    /// every operation generates random, non-recoverable secrets instead.
    pub(crate) seed: Option<[u8; 64]>,
    /// The mint's RPC surface.
    pub(crate) client: Arc<dyn MintConnector + Send + Sync>,
}

impl Wallet {
    /// Build a wallet directly, bypassing [`WalletBuilder`].
    pub fn new(
        mint_url: MintUrl,
        unit: CurrencyUnit,
        seed: Option<[u8; 64]>,
        client: Arc<dyn MintConnector + Send + Sync>,
    ) -> Self {
        Self {
            mint_url,
            unit,
            seed,
            client,
        }
    }

    /// Whether this wallet derives secrets deterministically from a seed.
    pub fn is_deterministic(&self) -> bool {
        self.seed.is_some()
    }

    /// Fetch keyset metadata (no public keys) for every keyset the mint
    /// has ever activated.
    #[instrument(skip(self))]
    pub async fn keyset_infos(&self) -> Result<Vec<KeySetInfo>, Error> {
        Ok(self
            .client
            .get_mint_keysets(&self.mint_url)
            .await?
            .keysets)
    }

    /// The single active keyset for this wallet's unit.
    ///
    /// Errors with [`Error::NoActiveKeysetForUnit`] if none is active, and
    /// logs (but does not fail on) the presence of more than one — mints
    /// are expected to keep exactly one keyset active per unit, but a
    /// transition window where two are briefly active is not fatal here.
    #[instrument(skip(self))]
    pub async fn active_keyset_info(&self) -> Result<KeySetInfo, Error> {
        let infos = self.keyset_infos().await?;
        let mut active: Vec<KeySetInfo> = infos
            .into_iter()
            .filter(|info| info.active && info.unit == self.unit)
            .collect();

        if active.len() > 1 {
            tracing::warn!(
                "mint {} reports {} active keysets for unit {}, using the first",
                self.mint_url,
                active.len(),
                self.unit
            );
        }

        active
            .drain(..)
            .next()
            .ok_or_else(|| Error::NoActiveKeysetForUnit(self.unit.clone()))
    }

    /// Fetch the full, validated keyset (with public keys) for `id`.
    #[instrument(skip(self))]
    pub async fn keyset(&self, id: Id) -> Result<KeySet, Error> {
        let keyset = self.client.get_mint_keyset(&self.mint_url, id).await?;
        if !keyset.validate_id() {
            return Err(Error::InvalidKeysetId(id));
        }
        Ok(keyset)
    }

    /// The active keyset for this wallet's unit, with its public keys.
    #[instrument(skip(self))]
    pub async fn active_keyset(&self) -> Result<KeySet, Error> {
        let info = self.active_keyset_info().await?;
        self.keyset(info.id).await
    }

    /// Fetch `Keys` for each distinct keyset id in `ids`, deduplicated.
    pub(crate) async fn keys_by_id<I: IntoIterator<Item = Id>>(
        &self,
        ids: I,
    ) -> Result<HashMap<Id, Keys>, Error> {
        let mut out = HashMap::new();
        for id in ids {
            if out.contains_key(&id) {
                continue;
            }
            let keyset = self.keyset(id).await?;
            out.insert(id, keyset.keys);
        }
        Ok(out)
    }

    /// Per-keyset `input_fee_ppk`, for every keyset the mint has activated.
    ///
    /// [`cashu_core::fees::calculate_fee`] needs this for every keyset a
    /// set of input proofs touches, not just the active one.
    pub(crate) async fn fee_map(&self) -> Result<HashMap<Id, u64>, Error> {
        Ok(self
            .keyset_infos()
            .await?
            .into_iter()
            .map(|info| (info.id, info.input_fee_ppk))
            .collect())
    }

    /// Build fresh blinded outputs for `amount` against `keyset_id`.
    ///
    /// If this wallet has a seed, `counter` must be `Some(start)` and the
    /// outputs are derived deterministically (NUT-13); the returned
    /// `Some(next_counter)` is how far the caller must advance its
    /// persisted counter on success. Without a seed, outputs are random
    /// and `None` is always returned in the counter slot.
    pub(crate) fn new_premint_secrets(
        &self,
        keyset_id: Id,
        amount: Amount,
        target: &SplitTarget,
        fee: &FeeAndAmounts,
        counter: Option<u32>,
    ) -> Result<(PreMintSecrets, Option<u32>), Error> {
        match (self.seed, counter) {
            (Some(seed), Some(start)) => {
                let secrets =
                    PreMintSecrets::from_seed(keyset_id, start, &seed, amount, target, fee)?;
                let next = start + secrets.len() as u32;
                Ok((secrets, Some(next)))
            }
            (Some(_), None) => Err(Error::MissingRequestDetail(
                "counter is required for a deterministic wallet",
            )),
            (None, _) => {
                let secrets = PreMintSecrets::random(keyset_id, amount, target, fee)?;
                Ok((secrets, None))
            }
        }
    }

    /// Build blank (zero-amount) outputs for NUT-08 fee-overpayment change.
    pub(crate) fn new_blank_premint_secrets(
        &self,
        keyset_id: Id,
        fee_reserve: Amount,
        counter: Option<u32>,
    ) -> Result<(PreMintSecrets, Option<u32>), Error> {
        match (self.seed, counter) {
            (Some(seed), Some(start)) => {
                let secrets = PreMintSecrets::from_seed_blank(keyset_id, start, &seed, fee_reserve)?;
                let next = start + secrets.len() as u32;
                Ok((secrets, Some(next)))
            }
            (Some(_), None) => Err(Error::MissingRequestDetail(
                "counter is required for a deterministic wallet",
            )),
            (None, _) => {
                let secrets = PreMintSecrets::blank(keyset_id, fee_reserve)?;
                Ok((secrets, None))
            }
        }
    }

    /// Build outputs for an exact, caller-chosen list of denominations
    /// (a `preferred_distribution`) rather than letting [`SplitTarget`]
    /// choose them.
    pub(crate) fn new_premint_secrets_for_amounts(
        &self,
        keyset_id: Id,
        amounts: &[Amount],
        counter: Option<u32>,
    ) -> Result<(PreMintSecrets, Option<u32>), Error> {
        match (self.seed, counter) {
            (Some(seed), Some(start)) => {
                let mut secrets = PreMintSecrets::new(keyset_id);
                for (i, amount) in amounts.iter().enumerate() {
                    let index = start + i as u32;
                    let secret = cashu_core::secret::Secret::from_seed(&seed, keyset_id, index)?;
                    let r = cashu_core::nuts::SecretKey::from_seed(&seed, keyset_id, index)?;
                    let (blinded, _) = cashu_core::dhke::blind_message(
                        &secret.to_bytes(),
                        Some(r.clone()),
                    )?;
                    secrets.secrets.push(cashu_core::nuts::PreMint {
                        blinded_message: cashu_core::nuts::BlindedMessage::new(
                            *amount, keyset_id, blinded,
                        ),
                        secret,
                        r,
                        amount: *amount,
                    });
                }
                let next = start + amounts.len() as u32;
                Ok((secrets, Some(next)))
            }
            (Some(_), None) => Err(Error::MissingRequestDetail(
                "counter is required for a deterministic wallet",
            )),
            (None, _) => {
                let random_secrets: Vec<_> = amounts
                    .iter()
                    .map(|_| cashu_core::secret::Secret::generate())
                    .collect();
                let secrets =
                    PreMintSecrets::from_secrets(keyset_id, amounts.to_vec(), random_secrets)?;
                Ok((secrets, None))
            }
        }
    }
}

/// Fold several per-proof DLEQ checks into one verdict for the batch.
///
/// `Invalid` dominates (a single bad proof poisons the batch); otherwise
/// `Valid` requires every proof to have checked out, and any missing DLEQ
/// data anywhere in the batch degrades the whole result to `NoData` rather
/// than silently reporting `Valid`.
pub(crate) fn aggregate_dleq<I: IntoIterator<Item = DleqVerificationResult>>(
    results: I,
) -> DleqVerificationResult {
    let mut saw_no_data = false;
    for result in results {
        match result {
            DleqVerificationResult::Invalid => return DleqVerificationResult::Invalid,
            DleqVerificationResult::NoData => saw_no_data = true,
            DleqVerificationResult::Valid => {}
        }
    }
    if saw_no_data {
        DleqVerificationResult::NoData
    } else {
        DleqVerificationResult::Valid
    }
}
