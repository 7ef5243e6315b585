//! Minting Tokens
// https://github.com/cashubtc/nuts/blob/main/04.md
use serde::{Deserialize, Serialize};

use super::{BlindSignature, BlindedMessage, CurrencyUnit, PaymentMethod};
use crate::Amount;

/// Quote state, shared shape between mint and melt quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteState {
    /// Quote has not been paid
    Unpaid,
    /// Quote has been paid, waiting for mint/melt to complete
    Paid,
    /// Outputs have been signed / invoice has been paid
    Issued,
    /// A melt quote's Lightning payment is in flight (NUT-05 only)
    Pending,
    /// Quote was paid but has expired and can no longer be used
    Expired,
}

/// Mint quote request [NUT-04]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintQuoteBolt11Request {
    /// Amount
    pub amount: Amount,
    /// Unit wallet would like to pay with
    pub unit: CurrencyUnit,
}

/// Mint quote response [NUT-04]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintQuoteBolt11Response {
    /// Quote Id
    pub quote: String,
    /// Payment request to fulfil
    pub request: String,
    /// Whether the the request haas be paid
    pub paid: bool,
    /// Unix timestamp until the quote is valid
    pub expiry: u64,
}

/// Mint request [NUT-04]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    /// Quote id
    pub quote: String,
    /// Outputs
    pub outputs: Vec<BlindedMessage>,
}

impl MintRequest {
    /// Total value of the requested blinded outputs
    pub fn total_amount(&self) -> Amount {
        self.outputs
            .iter()
            .map(|BlindedMessage { amount, .. }| *amount)
            .sum()
    }
}

/// Mint response [NUT-04]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintResponse {
    /// Blinded Signatures
    pub signatures: Vec<BlindSignature>,
}

/// Settings for a single mint payment method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintMethodSettings {
    /// Payment method
    pub method: PaymentMethod,
    /// Unit this method settles in
    pub unit: CurrencyUnit,
    /// Minimum mintable amount
    pub min_amount: Option<Amount>,
    /// Maximum mintable amount
    pub max_amount: Option<Amount>,
}

/// Mint Settings
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Supported (method, unit) combinations
    pub methods: Vec<(PaymentMethod, CurrencyUnit)>,
    /// Whether minting is currently disabled
    pub disabled: bool,
}
