//! Secret
//!
//! <https://github.com/cashubtc/nuts/blob/main/00.md#secret>

use std::fmt;
use std::str::FromStr;

use bitcoin::secp256k1::rand::{self, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::hex;

/// Secret Error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid hex
    #[error(transparent)]
    Hex(#[from] hex::Error),
}

/// The secret committed to by a [`Proof`](crate::nuts::Proof)
///
/// For an ordinary bearer proof this is 32 random bytes, hex-encoded. A
/// proof carrying a spending condition instead stores the JSON-array form
/// of a [`nut10::Secret`](crate::nuts::nut10::Secret) here; parsing always
/// accepts either form and only the consumer (e.g. [`nut10`](crate::nuts::nut10))
/// decides whether the opaque string decodes further.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Default for Secret {
    fn default() -> Self {
        Self::generate()
    }
}

impl Secret {
    const BYTE_LENGTH: usize = 32;

    /// Generate a new random bearer secret
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut random_bytes = [0u8; Self::BYTE_LENGTH];
        rng.fill_bytes(&mut random_bytes);
        Self(hex::encode(random_bytes))
    }

    /// Raw bytes of the secret's string form
    ///
    /// This is the exact message hashed by `hash_to_curve`, not a decoding
    /// of the hex/JSON content.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Owned bytes of the secret's string form
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Secret {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_32_bytes_hex() {
        let secret = Secret::generate();
        assert_eq!(secret.to_bytes().len(), 64);
        assert!(hex::decode(secret.to_string()).is_ok());
    }

    #[test]
    fn test_generate_is_unique() {
        let a = Secret::generate();
        let b = Secret::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_round_trip_opaque_string() {
        let secret = Secret::from_str("some-opaque-string").unwrap();
        assert_eq!(secret.to_string(), "some-opaque-string");
    }
}
