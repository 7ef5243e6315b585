//! Melting Tokens
// https://github.com/cashubtc/nuts/blob/main/05.md

use serde::{Deserialize, Serialize};

pub use super::nut04::QuoteState;
use super::{BlindSignature, BlindedMessage, CurrencyUnit};
use crate::nuts::Proofs;
use crate::{Amount, Bolt11Invoice};

/// Melt quote request [NUT-05]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltQuoteBolt11Request {
    /// Bolt11 invoice to be paid
    pub request: Bolt11Invoice,
    /// Unit wallet would like to pay with
    pub unit: CurrencyUnit,
}

/// Melt quote response [NUT-05]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltQuoteBolt11Response {
    /// Quote Id
    pub quote: String,
    /// The amount that needs to be provided
    pub amount: u64,
    /// The fee reserve that is required
    pub fee_reserve: u64,
    /// Whether the the request haas be paid
    pub paid: bool,
    /// Unix timestamp until the quote is valid
    pub expiry: u64,
    /// Current state of the quote
    #[serde(default)]
    pub state: Option<QuoteState>,
}

/// Melt Request [NUT-05]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltRequest {
    /// Quote ID
    pub quote: String,
    /// Proofs
    pub inputs: Proofs,
    /// Blinded messages the mint may use to return overpaid fee-reserve
    /// change \[NUT-08\]. Amount field of each `BlindedMessage` SHOULD be
    /// zero; the mint fills in the actual denominations when it signs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<BlindedMessage>>,
}

impl MeltRequest {
    /// Total value of the proofs offered as inputs
    pub fn proofs_amount(&self) -> Amount {
        self.inputs.iter().map(|proof| proof.amount).sum()
    }
}

/// Melt Response [NUT-05]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltResponse {
    /// Indicate if payment was successful
    pub paid: bool,
    /// Bolt11 preimage
    pub payment_preimage: Option<String>,
    /// Blind signatures over the `outputs` supplied in the request,
    /// returning unused fee-reserve as change \[NUT-08\]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Vec<BlindSignature>>,
}

/// Settings for a single melt payment method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltMethodSettings {
    /// Payment method
    pub method: String,
    /// Unit this method settles in
    pub unit: CurrencyUnit,
    /// Minimum meltable amount
    pub min_amount: Option<Amount>,
    /// Maximum meltable amount
    pub max_amount: Option<Amount>,
}

/// Melt Settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    /// Supported (method, unit) combinations
    pub methods: Vec<(String, CurrencyUnit)>,
}
