//! Crate-wide error
//!
//! Thin aggregator over [`cashu_core::Error`] and this crate's own
//! [`crate::wallet::Error`], for callers that want one error type to
//! propagate with `?` regardless of which layer raised it.

use thiserror::Error;

/// Crate-wide error
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the protocol/crypto core.
    #[error(transparent)]
    Core(#[from] cashu_core::Error),
    /// An error from a wallet operation (mint, swap, send, receive, melt).
    #[error(transparent)]
    Wallet(#[from] crate::wallet::Error),
}
