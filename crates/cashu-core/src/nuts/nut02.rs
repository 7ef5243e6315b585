//! NUT-02: Keysets and keyset IDs
//!
//! <https://github.com/cashubtc/nuts/blob/main/02.md>

use std::fmt;
use std::str::FromStr;

use bitcoin::base64::engine::{general_purpose, GeneralPurpose};
use bitcoin::base64::Engine as _;
use bitcoin::hashes::sha256::Hash as Sha256Hash;
use bitcoin::hashes::Hash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::nut00::CurrencyUnit;
use super::nut01::Keys;
use crate::util::hex;

const LEGACY_BASE64: GeneralPurpose = general_purpose::STANDARD;

/// Nut02 Error
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown keyset ID version byte
    #[error("Unknown keyset ID version")]
    UnknownVersion,
    /// Wrong length for a keyset ID of the given version
    #[error("Invalid keyset ID length")]
    InvalidLength,
    /// Invalid hex
    #[error(transparent)]
    HexError(#[from] hex::Error),
    /// Invalid base64
    #[error(transparent)]
    Base64Error(#[from] bitcoin::base64::DecodeError),
    /// No keyset in `mint_keysets` matches a short keyset ID
    #[error("Unknown short keyset ID")]
    UnknownShortKeysetId,
}

/// A mint keyset ID
///
/// Three wire forms are in use, distinguished by length:
/// - `V0`: 9 raw bytes, printed as 12 base64 characters (pre-versioning mints)
/// - `V1`: a `00` prefix byte followed by 7 hash bytes, printed as 16 hex characters
/// - `V2`: a `01` prefix byte followed by a full 32-byte SHA-256 digest, printed as 66 hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Id {
    /// Legacy 9-byte base64 keyset ID
    V0([u8; 9]),
    /// 8-byte (`00` + 7 hash bytes) hex keyset ID
    V1([u8; 8]),
    /// 33-byte (`01` + 32-byte hash) hex keyset ID
    V2([u8; 33]),
}

impl Id {
    /// Raw bytes of this keyset ID, in the form it is hashed/derived in
    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            Id::V0(b) => b.to_vec(),
            Id::V1(b) => b.to_vec(),
            Id::V2(b) => b.to_vec(),
        }
    }

    /// Parse a keyset ID from its raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.len() {
            9 => {
                let mut arr = [0u8; 9];
                arr.copy_from_slice(bytes);
                Ok(Id::V0(arr))
            }
            8 if bytes[0] == 0x00 => {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(bytes);
                Ok(Id::V1(arr))
            }
            33 if bytes[0] == 0x01 => {
                let mut arr = [0u8; 33];
                arr.copy_from_slice(bytes);
                Ok(Id::V2(arr))
            }
            8 | 33 => Err(Error::UnknownVersion),
            _ => Err(Error::InvalidLength),
        }
    }

    /// Derive the original, pre-versioning keyset ID (12-char base64, 9 raw
    /// bytes under the hood once decoded).
    ///
    /// Concatenates the hex-encoded public key for each denomination, sorted
    /// by amount ascending, hashes the UTF-8 bytes with SHA-256, and
    /// base64-encodes the first 9 bytes of the digest.
    pub fn derive_v0(keys: &Keys) -> Self {
        let mut preimage = String::new();
        for (_amount, pubkey) in keys.iter() {
            preimage.push_str(&pubkey.to_hex());
        }
        let digest = Sha256Hash::hash(preimage.as_bytes()).to_byte_array();
        let mut out = [0u8; 9];
        out.copy_from_slice(&digest[0..9]);
        Id::V0(out)
    }

    /// Derive the legacy, 7-hash-byte keyset ID (version `00`), per NUT-02's
    /// "deriving the keyset ID" algorithm
    ///
    /// Concatenates the raw compressed public key bytes for each
    /// denomination, sorted by amount ascending, and hashes the result with
    /// SHA-256.
    pub fn derive_v1(keys: &Keys) -> Self {
        let digest = Self::pubkeys_digest(keys);
        let mut out = [0u8; 8];
        out[0] = 0x00;
        out[1..8].copy_from_slice(&digest[0..7]);
        Id::V1(out)
    }

    /// Derive the newer, full 32-byte digest keyset ID (version `01`)
    ///
    /// As [`Id::derive_v1`], but the preimage also binds the (lowercased)
    /// unit and, if present, the keyset's final expiry, and the full
    /// 32-byte digest is kept rather than truncated to 7 bytes.
    pub fn derive_v2(keys: &Keys, unit: &CurrencyUnit, final_expiry: Option<u64>) -> Self {
        let mut preimage = Self::pubkeys_preimage(keys);
        preimage.extend_from_slice(format!("unit:{}", unit.to_string().to_lowercase()).as_bytes());
        if let Some(expiry) = final_expiry {
            preimage.extend_from_slice(format!("final_expiry:{expiry}").as_bytes());
        }
        let digest = Sha256Hash::hash(&preimage).to_byte_array();
        let mut out = [0u8; 33];
        out[0] = 0x01;
        out[1..33].copy_from_slice(&digest);
        Id::V2(out)
    }

    /// Recompute this keyset's ID from its keys (and, for a `01` ID, its
    /// unit and final expiry) and compare against the stored ID.
    ///
    /// Dispatches on the stored ID's length/prefix to choose which of the
    /// three derivations to check, per NUT-02.
    pub fn validate(&self, keys: &Keys, unit: &CurrencyUnit, final_expiry: Option<u64>) -> bool {
        match self {
            Id::V0(_) => *self == Self::derive_v0(keys),
            Id::V1(_) => *self == Self::derive_v1(keys),
            Id::V2(_) => *self == Self::derive_v2(keys, unit, final_expiry),
        }
    }

    fn pubkeys_preimage(keys: &Keys) -> Vec<u8> {
        let mut preimage = Vec::new();
        for (_amount, pubkey) in keys.iter() {
            preimage.extend_from_slice(&pubkey.to_bytes());
        }
        preimage
    }

    fn pubkeys_digest(keys: &Keys) -> [u8; 32] {
        Sha256Hash::hash(&Self::pubkeys_preimage(keys)).to_byte_array()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::V0(b) => write!(f, "{}", LEGACY_BASE64.encode(b)),
            Id::V1(b) => write!(f, "{}", hex::encode(b)),
            Id::V2(b) => write!(f, "{}", hex::encode(b)),
        }
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 12 {
            let bytes = LEGACY_BASE64.decode(s)?;
            return Self::from_bytes(&bytes);
        }

        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Id::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// `keysetID_as_int` from NUT-13: the full keyset ID, interpreted as a
/// big-endian integer and reduced modulo `2^31 - 1`, for use as a hardened
/// BIP-32 child index
impl From<Id> for u32 {
    fn from(id: Id) -> u32 {
        const MODULUS: u64 = (1u64 << 31) - 1;
        let mut acc: u64 = 0;
        for byte in id.to_bytes() {
            acc = (acc * 256 + u64::from(byte)) % MODULUS;
        }
        acc as u32
    }
}

/// Truncated, 8-byte keyset ID used as a compact map key in token v3/v4 wire
/// formats
///
/// Any [`Id`] (regardless of version) collapses to the first 8 bytes of its
/// raw form; [`Id::from_short_keyset_id`] resolves a short ID back to the
/// full ID by comparing against a list of keysets the caller already knows
/// about (e.g. from a prior `GET /v1/keys` call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortKeysetId([u8; 8]);

impl ShortKeysetId {
    /// Raw bytes
    pub fn to_bytes(self) -> [u8; 8] {
        self.0
    }

    /// From raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != 8 {
            return Err(Error::InvalidLength);
        }
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

impl From<Id> for ShortKeysetId {
    fn from(id: Id) -> Self {
        let bytes = id.to_bytes();
        let mut arr = [0u8; 8];
        let n = bytes.len().min(8);
        arr[..n].copy_from_slice(&bytes[..n]);
        Self(arr)
    }
}

impl fmt::Display for ShortKeysetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ShortKeysetId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for ShortKeysetId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ShortKeysetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ShortKeysetId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Id {
    /// Resolve a [`ShortKeysetId`] back to the full [`Id`] by matching it
    /// against a list of keysets the caller already knows about
    pub fn from_short_keyset_id(
        short_id: &ShortKeysetId,
        mint_keysets: &[KeySetInfo],
    ) -> Result<Self, Error> {
        mint_keysets
            .iter()
            .map(|info| info.id)
            .find(|id| ShortKeysetId::from(*id) == *short_id)
            .ok_or(Error::UnknownShortKeysetId)
    }
}

/// A mint's keyset, including its public keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    /// Keyset ID
    pub id: Id,
    /// Currency unit the keyset mints
    pub unit: CurrencyUnit,
    /// Public keys for each denomination
    pub keys: Keys,
    /// Unix timestamp after which the keyset is no longer valid, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_expiry: Option<u64>,
}

impl KeySet {
    /// Recompute `self.id` from `self.keys` (and, for a `01` ID, `self.unit`
    /// and `self.final_expiry`) and compare against the stored ID.
    pub fn validate_id(&self) -> bool {
        self.id.validate(&self.keys, &self.unit, self.final_expiry)
    }
}

/// Keyset metadata without public keys, as returned by `GET /v1/keysets`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeySetInfo {
    /// Keyset ID
    pub id: Id,
    /// Currency unit the keyset mints
    pub unit: CurrencyUnit,
    /// Whether the mint is currently minting/melting with this keyset
    pub active: bool,
    /// Fee, in parts-per-thousand, charged per input of this keyset
    #[serde(default)]
    pub input_fee_ppk: u64,
    /// Unix timestamp after which the keyset is no longer valid, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_expiry: Option<u64>,
}

impl From<KeySet> for KeySetInfo {
    fn from(keyset: KeySet) -> Self {
        Self {
            id: keyset.id,
            unit: keyset.unit,
            active: true,
            input_fee_ppk: 0,
            final_expiry: keyset.final_expiry,
        }
    }
}

/// Response to `GET /v1/keysets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetResponse {
    /// Keysets
    pub keysets: Vec<KeySetInfo>,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::nuts::nut01::PublicKey;
    use crate::Amount;

    #[test]
    fn test_id_v1_round_trip() {
        let id = Id::from_str("009a1f293253e41e").unwrap();
        assert_eq!(id.to_string(), "009a1f293253e41e");
        assert_eq!(id.to_bytes().len(), 8);
    }

    #[test]
    fn test_id_v2_round_trip() {
        let hex_id = "012e23479a0029432eaad0d2040c09be53bab592d5cbf1d55e0dd26c9495951b30";
        let id = Id::from_str(hex_id).unwrap();
        assert_eq!(id.to_string(), hex_id);
        assert_eq!(id.to_bytes().len(), 33);
    }

    #[test]
    fn test_id_v0_base64_round_trip() {
        let id = Id::V0([1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let encoded = id.to_string();
        assert_eq!(encoded.len(), 12);
        let decoded = Id::from_str(&encoded).unwrap();
        assert_eq!(id, decoded);
    }

    #[test]
    fn test_keyset_id_as_int() {
        let cases = [
            ("009a1f293253e41e", 864559728u32),
            ("0000000000000000", 0u32),
            ("00ffffffffffffff", 33554431u32),
        ];

        for (id_hex, expected) in cases {
            let id = Id::from_str(id_hex).unwrap();
            assert_eq!(u32::from(id), expected);
        }
    }

    #[test]
    fn test_short_keyset_id_round_trip() {
        let id = Id::from_str("009a1f293253e41e").unwrap();
        let short = ShortKeysetId::from(id);
        let info = KeySetInfo {
            id,
            unit: CurrencyUnit::Sat,
            active: true,
            input_fee_ppk: 0,
            final_expiry: None,
        };
        let resolved = Id::from_short_keyset_id(&short, &[info]).unwrap();
        assert_eq!(resolved, id);
    }

    #[test]
    fn test_derive_v1_is_self_consistent() {
        let mut map = BTreeMap::new();
        map.insert(
            Amount::from(1u64),
            PublicKey::from_str(
                "03a40f20667ed53513075dc51e715ff2046cad64eb68960632269d79769f90819",
            )
            .unwrap(),
        );
        map.insert(
            Amount::from(2u64),
            PublicKey::from_str(
                "03fd4ce5a16b65576145949e6f99f445f8249fee17c606b688b504a3f159a235e",
            )
            .unwrap(),
        );
        let keys = Keys::new(map);
        let id = Id::derive_v1(&keys);
        assert!(matches!(id, Id::V1(_)));
        assert!(id.to_string().starts_with("00"));
        assert_eq!(id, Id::derive_v1(&keys));
    }

    fn sample_keys() -> Keys {
        let mut map = BTreeMap::new();
        map.insert(
            Amount::from(1u64),
            PublicKey::from_str(
                "03a40f20667ed53513075dc51e715ff2046cad64eb68960632269d79769f90819",
            )
            .unwrap(),
        );
        map.insert(
            Amount::from(2u64),
            PublicKey::from_str(
                "03fd4ce5a16b65576145949e6f99f445f8249fee17c606b688b504a3f159a235e",
            )
            .unwrap(),
        );
        Keys::new(map)
    }

    #[test]
    fn test_derive_v0_is_self_consistent() {
        let keys = sample_keys();
        let id = Id::derive_v0(&keys);
        assert!(matches!(id, Id::V0(_)));
        assert_eq!(id.to_string().len(), 12);
        assert_eq!(id, Id::derive_v0(&keys));
    }

    #[test]
    fn test_derive_v1_uses_raw_bytes_not_hex() {
        // Concatenating hex strings vs raw bytes must diverge; this pins the
        // regression where both v0 and v1/v2 hashed the hex representation.
        let keys = sample_keys();
        let id = Id::derive_v1(&keys);

        let mut hex_preimage = String::new();
        for (_, pk) in keys.iter() {
            hex_preimage.push_str(&pk.to_hex());
        }
        let wrong_digest = Sha256Hash::hash(hex_preimage.as_bytes()).to_byte_array();
        let mut wrong = [0u8; 8];
        wrong[0] = 0x00;
        wrong[1..8].copy_from_slice(&wrong_digest[0..7]);
        assert_ne!(id, Id::V1(wrong));
    }

    #[test]
    fn test_derive_v2_binds_unit_and_expiry() {
        let keys = sample_keys();
        let sat = Id::derive_v2(&keys, &CurrencyUnit::Sat, Some(1_700_000_000));
        let usd = Id::derive_v2(&keys, &CurrencyUnit::Usd, Some(1_700_000_000));
        let no_expiry = Id::derive_v2(&keys, &CurrencyUnit::Sat, None);
        let other_expiry = Id::derive_v2(&keys, &CurrencyUnit::Sat, Some(1_800_000_000));

        assert_ne!(sat, usd);
        assert_ne!(sat, no_expiry);
        assert_ne!(sat, other_expiry);
        assert!(sat.to_string().starts_with("01"));
        assert_eq!(sat.to_bytes().len(), 33);
    }

    #[test]
    fn test_validate_id_round_trips_and_detects_tampering() {
        let keys = sample_keys();

        let keyset = KeySet {
            id: Id::derive_v2(&keys, &CurrencyUnit::Sat, Some(1_700_000_000)),
            unit: CurrencyUnit::Sat,
            keys: keys.clone(),
            final_expiry: Some(1_700_000_000),
        };
        assert!(keyset.validate_id());

        let mut wrong_unit = keyset.clone();
        wrong_unit.unit = CurrencyUnit::Usd;
        assert!(!wrong_unit.validate_id());

        let mut wrong_expiry = keyset.clone();
        wrong_expiry.final_expiry = Some(1_800_000_000);
        assert!(!wrong_expiry.validate_id());

        let v1_id = Id::derive_v1(&keys);
        let v1_keyset = KeySet {
            id: v1_id,
            unit: CurrencyUnit::Sat,
            keys,
            final_expiry: None,
        };
        assert!(v1_keyset.validate_id());
    }
}
