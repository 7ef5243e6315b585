//! NUT-01: Mint public keys
//!
//! <https://github.com/cashubtc/nuts/blob/main/01.md>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod public_key;
pub mod secret_key;

pub use public_key::PublicKey;
pub use secret_key::SecretKey;

use super::nut02::KeySet;
use crate::Amount;

/// Nut01 Error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid secp256k1 point
    #[error(transparent)]
    Secp256k1(#[from] bitcoin::secp256k1::Error),
    /// Invalid hex
    #[error(transparent)]
    HexError(#[from] crate::util::hex::Error),
    /// Invalid public key size
    #[error("Invalid public key size: expected {expected}, found {found}")]
    InvalidPublicKeySize {
        /// Expected size in bytes
        expected: usize,
        /// Found size in bytes
        found: usize,
    },
}

/// Mint public keys for every denomination of a single keyset
///
/// Maps each power-of-two [`Amount`] a keyset mints to the public key a
/// wallet blinds against for that denomination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keys(BTreeMap<Amount, PublicKey>);

impl Keys {
    /// New [`Keys`]
    pub fn new(keys: BTreeMap<Amount, PublicKey>) -> Self {
        Self(keys)
    }

    /// Get the public key for an [`Amount`]
    pub fn amount_key(&self, amount: Amount) -> Option<&PublicKey> {
        self.0.get(&amount)
    }

    /// Iterate over (amount, public key) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&Amount, &PublicKey)> {
        self.0.iter()
    }

    /// Number of denominations in this keyset
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this keyset has no denominations
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Into the underlying map
    pub fn into_inner(self) -> BTreeMap<Amount, PublicKey> {
        self.0
    }
}

impl From<BTreeMap<Amount, PublicKey>> for Keys {
    fn from(keys: BTreeMap<Amount, PublicKey>) -> Self {
        Self(keys)
    }
}

/// Response to `GET /v1/keys` and `GET /v1/keys/{keyset_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysResponse {
    /// Keysets
    pub keysets: Vec<KeySet>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_keys_json_round_trip() {
        let json = r#"{"1":"02194603ffa36356f4a56b7df9371fc3192472351453ec7398b8da8117e7c516f","2":"03f7d3d0d30c59d2fbfe5d7ea7c9eaeee1e2df9e0a6e7a1f8c6bc0c0d9e5a7f9ea"}"#;
        let keys: Keys = serde_json::from_str(json).unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys
            .amount_key(Amount::from(1))
            .is_some_and(|pk| *pk == PublicKey::from_str(
                "02194603ffa36356f4a56b7df9371fc3192472351453ec7398b8da8117e7c516f"
            )
            .unwrap()));
    }
}
