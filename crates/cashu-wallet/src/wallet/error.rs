//! Operation-layer errors
//!
//! Every variant here corresponds to one of the tags a caller needs to
//! branch on when driving mint/swap/send/receive/melt: transport failures,
//! mint-reported protocol errors, malformed input, crypto failures,
//! spending-condition mismatches, and payment-request problems.

use std::fmt;

use cashu_core::{Amount, Id};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Operation-layer error
#[derive(Debug, Error)]
pub enum Error {
    // --- Transport ---
    /// The request could not reach the mint, or the mint's response could
    /// not be parsed at all.
    #[error(transparent)]
    NetworkError(#[from] reqwest::Error),
    /// A melt operation exceeded its poll timeout while the quote remained
    /// pending.
    #[error("Timed out waiting for quote `{0}` to settle")]
    Timeout(String),

    // --- Protocol (mirrors the mint's numeric error codes) ---
    /// 11001: one or more input proofs were already spent.
    #[error("Proof already spent")]
    AlreadySpent,
    /// 11002: `sum(outputs) + fee != sum(inputs)`.
    #[error("Inputs ({inputs}) do not balance outputs ({outputs}) plus fee ({fee})")]
    TransactionUnbalanced {
        /// Sum of input amounts
        inputs: u64,
        /// Sum of output amounts
        outputs: u64,
        /// Fee the mint charged
        fee: u64,
    },
    /// 20001: mint quote has not been paid yet.
    #[error("Quote not paid")]
    QuoteNotPaid,
    /// 20005: payment for a melt quote is in flight.
    #[error("Quote is pending")]
    QuoteIsPending,
    /// 20007: quote expired before it could be redeemed.
    #[error("Quote is expired")]
    QuoteIsExpired,
    /// 20006: the Lightning invoice behind a melt quote was already paid.
    #[error("Invoice already paid")]
    InvoiceAlreadyPaid,
    /// 20003: the mint has minting disabled for this method/unit.
    #[error("Minting is disabled")]
    MintingDisabled,
    /// 11006: requested amount is outside the mint's configured limits.
    #[error("Amount outside of allowed range")]
    AmountOutsideOfLimitRange,
    /// 12002: the keyset named by an input or output is not active.
    #[error("Keyset `{0}` is inactive")]
    KeysetInactive(Id),
    /// 11005: the mint does not support the requested unit.
    #[error("Unit is not supported")]
    UnitIsNotSupported,
    /// 10002: a blinded message was already signed by the mint (replay).
    #[error("Blinded message already signed")]
    BlindedMessageAlreadySigned,
    /// 20002: ecash was already issued for this mint quote.
    #[error("Proofs already issued for quote")]
    ProofsAlreadyIssuedForQuote,

    // --- Input / semantic ---
    /// Proofs on hand do not cover `amount + fee`.
    #[error("Insufficient inputs: have `{have}`, need `{need}`")]
    InsufficientInputs {
        /// What the caller supplied
        have: Amount,
        /// What the operation required
        need: Amount,
    },
    /// An amount failed to parse, overflowed, or was zero where positive
    /// was required.
    #[error(transparent)]
    InvalidAmount(#[from] cashu_core::amount::Error),
    /// Proofs in one call span more than one [`cashu_core::CurrencyUnit`].
    #[error("Cannot mix currency units in a single operation")]
    UnitError,
    /// A caller-supplied preferred output distribution did not sum to the
    /// operation's amount.
    #[error("Preferred distribution does not sum to the requested amount")]
    PreferredDistributionMismatch,
    /// A required detail (description, invoice amount, lock pubkey, ...)
    /// was missing from the request.
    #[error("Missing required request detail: `{0}`")]
    MissingRequestDetail(&'static str),
    /// No active keyset exists for the wallet's unit.
    #[error("No active keyset for unit `{0}`")]
    NoActiveKeysetForUnit(cashu_core::CurrencyUnit),
    /// A token string did not parse as a valid Cashu token.
    #[error(transparent)]
    InvalidToken(#[from] cashu_core::nuts::nut00::Error),
    /// Failed to base64/CBOR-encode a token.
    #[error("Could not encode token: `{0}`")]
    TokenEncoding(String),
    /// Failed to base64/CBOR-decode a token.
    #[error("Could not decode token: `{0}`")]
    TokenDecoding(String),
    /// Token names a mint or scheme this wallet does not support receiving.
    #[error("Unsupported token: `{0}`")]
    UnsupportedToken(String),
    /// Some, but not all, proofs in a token were already spent.
    #[error("Token is partially spent")]
    PartiallySpentToken,

    // --- Crypto ---
    /// Hash-to-curve, blinding, or unblinding failed.
    #[error(transparent)]
    CryptoError(#[from] cashu_core::dhke::Error),
    /// A public or secret key failed to parse or was the wrong length.
    #[error(transparent)]
    InvalidKey(#[from] cashu_core::nuts::nut01::Error),
    /// A keyset's public keys do not hash to its advertised id.
    #[error("Keyset `{0}` failed id validation")]
    InvalidKeysetId(Id),
    /// Signing a P2PK-locked secret failed.
    #[error("P2PK signing failed: `{0}`")]
    P2pkSigningError(String),
    /// A mint's blind signature did not unblind to a valid point.
    #[error("Unblinding failed")]
    UnblindingFailed,

    // --- Spending conditions ---
    /// A spending-condition secret failed to parse or verify.
    #[error(transparent)]
    SpendingConditionError(#[from] cashu_core::nuts::nut11::Error),
    /// The lock a token carries does not match the key the caller supplied.
    #[error("Locking condition mismatch")]
    LockingConditionMismatch,

    // --- Payment request (NUT-18) ---
    /// Failed to CBOR/base64url-encode a payment request.
    #[error("Could not encode payment request: `{0}`")]
    PaymentRequestEncoding(String),
    /// Failed to CBOR/base64url-decode a payment request.
    #[error("Could not decode payment request: `{0}`")]
    PaymentRequestDecoding(String),
    /// A payment request failed semantic validation (e.g. no transport).
    #[error("Invalid payment request: `{0}`")]
    PaymentRequestValidation(String),
    /// None of a payment request's transports are supported by this wallet.
    #[error("Unsupported payment request transport")]
    UnsupportedTransport,
    /// A payment request named an amount the wallet cannot satisfy.
    #[error("Payment request amount could not be satisfied")]
    PaymentRequestAmount,

    // --- Pass-through from cashu-core ---
    /// Keyset/fee/amount bookkeeping error from the aggregated core error.
    #[error(transparent)]
    Core(#[from] cashu_core::Error),
    /// A quote, keyset, or proof id was not found in a mint response.
    #[error("Keyset not found")]
    KeysetNotFound,
    /// The mint URL could not be parsed or its path segments joined.
    #[error(transparent)]
    MintUrl(#[from] cashu_core::mint_url::Error),
    /// The mint returned a response this client could not interpret at all.
    #[error("Unknown error response: `{0}`")]
    UnknownErrorResponse(String),
    /// Anything else, carrying a human-readable message.
    #[error("`{0}`")]
    Custom(String),
}

/// The `{code, error, detail}` body a mint returns alongside a non-2xx
/// response, per NUT-00's error format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Numeric error code
    pub code: ErrorCode,
    /// Short human-readable error
    pub error: Option<String>,
    /// Longer human-readable detail
    pub detail: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "code: {}, error: {}, detail: {}",
            self.code,
            self.error.clone().unwrap_or_default(),
            self.detail.clone().unwrap_or_default()
        )
    }
}

impl ErrorResponse {
    /// Parse a mint error body out of an already-decoded JSON [`Value`].
    ///
    /// A response that matches neither [`ErrorResponse`] nor the expected
    /// success shape is not a protocol violation worth failing hard on: it
    /// is reported as [`ErrorCode::Unknown`] carrying the raw JSON text.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match serde_json::from_value::<ErrorResponse>(value.clone()) {
            Ok(res) => Ok(res),
            Err(_) => Ok(Self {
                code: ErrorCode::Unknown(9999),
                error: Some(value.to_string()),
                detail: None,
            }),
        }
    }
}

impl From<ErrorResponse> for Error {
    fn from(err: ErrorResponse) -> Error {
        match err.code {
            ErrorCode::BlindedMessageAlreadySigned => Error::BlindedMessageAlreadySigned,
            ErrorCode::TokenAlreadySpent => Error::AlreadySpent,
            ErrorCode::TransactionUnbalanced => Error::TransactionUnbalanced {
                inputs: 0,
                outputs: 0,
                fee: 0,
            },
            ErrorCode::UnitUnsupported => Error::UnitIsNotSupported,
            ErrorCode::AmountOutofLimitRange => Error::AmountOutsideOfLimitRange,
            ErrorCode::KeysetNotFound => Error::KeysetNotFound,
            ErrorCode::MintingDisabled => Error::MintingDisabled,
            ErrorCode::QuoteNotPaid => Error::QuoteNotPaid,
            ErrorCode::TokensAlreadyIssued => Error::ProofsAlreadyIssuedForQuote,
            ErrorCode::QuotePending => Error::QuoteIsPending,
            ErrorCode::InvoiceAlreadyPaid => Error::InvoiceAlreadyPaid,
            ErrorCode::QuoteExpired => Error::QuoteIsExpired,
            ErrorCode::Unknown(_) => Error::UnknownErrorResponse(err.to_string()),
        }
    }
}

/// Mint error codes this wallet recognizes.
///
/// The numeric assignments follow the same table the teacher's mint
/// implementation uses to construct [`ErrorResponse`] bodies; the NUT specs
/// themselves only name the codes, not a canonical Rust enum.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ErrorCode {
    /// 10002
    BlindedMessageAlreadySigned,
    /// 11001
    TokenAlreadySpent,
    /// 11002
    TransactionUnbalanced,
    /// 11005
    UnitUnsupported,
    /// 11006
    AmountOutofLimitRange,
    /// 12001
    KeysetNotFound,
    /// 20003 (and 12002, folded into the same disabled-keyset case today)
    MintingDisabled,
    /// 20001
    QuoteNotPaid,
    /// 20002
    TokensAlreadyIssued,
    /// 20005
    QuotePending,
    /// 20006
    InvoiceAlreadyPaid,
    /// 20007
    QuoteExpired,
    /// Anything not in the table above
    Unknown(u16),
}

impl ErrorCode {
    /// Decode a numeric mint error code.
    pub fn from_code(code: u16) -> Self {
        match code {
            10002 => Self::BlindedMessageAlreadySigned,
            11001 => Self::TokenAlreadySpent,
            11002 => Self::TransactionUnbalanced,
            11005 => Self::UnitUnsupported,
            11006 => Self::AmountOutofLimitRange,
            12001 => Self::KeysetNotFound,
            12002 => Self::MintingDisabled,
            20001 => Self::QuoteNotPaid,
            20002 => Self::TokensAlreadyIssued,
            20003 => Self::MintingDisabled,
            20005 => Self::QuotePending,
            20006 => Self::InvoiceAlreadyPaid,
            20007 => Self::QuoteExpired,
            other => Self::Unknown(other),
        }
    }

    /// Encode back to the numeric mint error code.
    pub fn to_code(self) -> u16 {
        match self {
            Self::BlindedMessageAlreadySigned => 10002,
            Self::TokenAlreadySpent => 11001,
            Self::TransactionUnbalanced => 11002,
            Self::UnitUnsupported => 11005,
            Self::AmountOutofLimitRange => 11006,
            Self::KeysetNotFound => 12001,
            Self::MintingDisabled => 20003,
            Self::QuoteNotPaid => 20001,
            Self::TokensAlreadyIssued => 20002,
            Self::QuotePending => 20005,
            Self::InvoiceAlreadyPaid => 20006,
            Self::QuoteExpired => 20007,
            Self::Unknown(code) => code,
        }
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(self.to_code())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(ErrorCode::from_code(u16::deserialize(deserializer)?))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_code())
    }
}
