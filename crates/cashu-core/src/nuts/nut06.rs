//! Mint Information
// https://github.com/cashubtc/nuts/blob/main/09.md

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::nut01::PublicKey;
use super::{nut04, nut05};

/// Mint Version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintVersion {
    pub name: String,
    pub version: String,
}

impl Serialize for MintVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let combined = format!("{}/{}", self.name, self.version);
        serializer.serialize_str(&combined)
    }
}

impl<'de> Deserialize<'de> for MintVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let combined = String::deserialize(deserializer)?;
        let parts: Vec<&str> = combined.split('/').collect();
        if parts.len() != 2 {
            return Err(serde::de::Error::custom("Invalid input string"));
        }
        Ok(MintVersion {
            name: parts[0].to_string(),
            version: parts[1].to_string(),
        })
    }
}

/// Mint Info [NIP-09]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintInfo {
    /// name of the mint and should be recognizable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// hex pubkey of the mint
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::util::serde_helpers::deserialize_empty_string_as_none"
    )]
    pub pubkey: Option<PublicKey>,
    /// implementation name and the version running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<MintVersion>,
    /// short description of the mint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_long: Option<String>,
    /// contact methods to reach the mint operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<Vec<String>>>,
    /// shows which NUTs the mint supports
    #[serde(deserialize_with = "deserialize_nuts")]
    pub nuts: HashMap<u8, NutSettings>,
    /// message of the day that the wallet must display to the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NutSettings {
    Nut04(nut04::Settings),
    Nut05(nut05::Settings),
    Optional(OptionalSettings),
    UnknownNut(Value),
}

/// Schema-tolerant: a sub-field that fails to parse for its expected NUT
/// degrades to [`NutSettings::UnknownNut`] (or is skipped, for a malformed
/// key) rather than failing the whole `MintInfo` document. Deployed mints
/// disagree on NUT settings shapes across versions; a wallet that can't
/// read `nuts["7"]` should still read everything else.
fn deserialize_nuts<'de, D>(deserializer: D) -> Result<HashMap<u8, NutSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Map<String, Value> = Deserialize::deserialize(deserializer)?;

    let mut nuts: HashMap<u8, NutSettings> = HashMap::with_capacity(raw.len());

    for (key, value) in raw {
        let Ok(num) = key.parse::<u8>() else {
            tracing::debug!("Ignoring non-numeric NUT key in mint info: {key}");
            continue;
        };

        let nut_settings = match num {
            4 => serde_json::from_value::<nut04::Settings>(value.clone())
                .map(NutSettings::Nut04)
                .unwrap_or(NutSettings::UnknownNut(value)),
            5 => serde_json::from_value::<nut05::Settings>(value.clone())
                .map(NutSettings::Nut05)
                .unwrap_or(NutSettings::UnknownNut(value)),
            7..=10 | 12 => serde_json::from_value::<OptionalSettings>(value.clone())
                .map(NutSettings::Optional)
                .unwrap_or(NutSettings::UnknownNut(value)),
            _ => NutSettings::UnknownNut(value),
        };
        nuts.insert(num, nut_settings);
    }

    Ok(nuts)
}

/// Spendable Settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionalSettings {
    supported: bool,
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_mint_info() {
        let mint_info = r#"{"name":"moksha-mint","pubkey":"02b3d8d8280b26f1223dc603a9b2a69618dc26821bef8ee22d419c44d710007cbc","version":"0.1.2","description":"mutiny signet mint v1 api","contact":[["[[email"],["ngutech21@pm.me]]"]],"nuts":{"4":{"methods":[["bolt11","sat"]],"disabled":false},"5":{"methods":[["bolt11","sat"]]},"6":{"supported":true},"7":{"supported":false},"8":{"supported":true},"9":{"supported":false},"10":{"supported":false},"11":{"supported":false},"12":{"supported":false}}}"#;

        let _info: MintInfo = serde_json::from_str(mint_info).unwrap();
    }

    #[test]
    fn test_mint_info_tolerates_malformed_nut_entry() {
        // nut 4 is malformed (methods should be a list of [method, unit] pairs);
        // the rest of the document must still decode.
        let mint_info = r#"{"name":"weird-mint","nuts":{"4":"not an object","5":{"methods":[["bolt11","sat"]]},"7":{"supported":true},"99":{"anything":"goes"}}}"#;

        let info: MintInfo = serde_json::from_str(mint_info).unwrap();
        assert_eq!(info.name.as_deref(), Some("weird-mint"));
        assert!(matches!(info.nuts.get(&4), Some(NutSettings::UnknownNut(_))));
        assert!(matches!(info.nuts.get(&5), Some(NutSettings::Nut05(_))));
        assert!(matches!(info.nuts.get(&7), Some(NutSettings::Optional(_))));
        assert!(matches!(info.nuts.get(&99), Some(NutSettings::UnknownNut(_))));
    }
}
