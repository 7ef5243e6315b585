//! Nuts
//!
//! See all at <https://github.com/cashubtc/nuts>

pub mod nut00;
pub mod nut01;
pub mod nut02;
pub mod nut03;
pub mod nut04;
pub mod nut05;
pub mod nut06;
pub mod nut07;
pub mod nut09;
pub mod nut10;
pub mod nut11;
pub mod nut12;
pub mod nut13;
pub mod nut14;
pub mod nut18;

pub use nut00::{
    BlindSignature, BlindedMessage, CurrencyUnit, PaymentMethod, PreMint, PreMintSecrets, Proof,
    Proofs, ProofsMethods, Token, TokenV3, TokenV4, Witness,
};
pub use nut01::{Keys, KeysResponse, PublicKey, SecretKey};
pub use nut02::{Id, KeySet, KeySetInfo, KeysetResponse, ShortKeysetId};
pub use nut03::{PreSwap, SwapRequest, SwapResponse};
pub use nut04::{
    MintMethodSettings, MintQuoteBolt11Request, MintQuoteBolt11Response, MintRequest,
    MintResponse, QuoteState, Settings as NUT04Settings,
};
pub use nut05::{
    MeltMethodSettings, MeltQuoteBolt11Request, MeltQuoteBolt11Response, MeltRequest,
    MeltResponse, Settings as NUT05Settings,
};
pub use nut06::{MintInfo, MintVersion, NutSettings, OptionalSettings};
pub use nut07::{CheckStateRequest, CheckStateResponse, ProofState, State};
pub use nut09::{RestoreRequest, RestoreResponse};
pub use nut10::{Kind, Secret as Nut10Secret, SecretData};
pub use nut11::{Conditions, P2PKWitness, SigFlag, SpendingConditions, Tag, TagKind};
pub use nut12::{BlindSignatureDleq, DleqVerificationResult, ProofDleq};
pub use nut14::HTLCWitness;
pub use nut18::{
    Nut10SecretRequest, PaymentRequest, PaymentRequestBuilder, PaymentRequestPayload, Transport,
    TransportBuilder, TransportType,
};
