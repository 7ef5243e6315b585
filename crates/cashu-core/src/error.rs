//! Top-level error type
//!
//! Aggregates errors from the individual modules that don't otherwise have
//! an obvious home for a crate-wide error (e.g. [`fees`](crate::fees)).

use thiserror::Error;

use crate::nuts::Id;

/// Crate error
#[derive(Debug, Error)]
pub enum Error {
    /// Fee rate unknown for a keyset a proof was issued under
    #[error("Unknown keyset: {0}")]
    KeysetUnknown(Id),
    /// Amount error
    #[error(transparent)]
    Amount(#[from] crate::amount::Error),
    /// DHKE error
    #[error(transparent)]
    DHKE(#[from] crate::dhke::Error),
    /// NUT-00 error
    #[error(transparent)]
    NUT00(#[from] crate::nuts::nut00::Error),
    /// NUT-01 error
    #[error(transparent)]
    NUT01(#[from] crate::nuts::nut01::Error),
    /// NUT-02 error
    #[error(transparent)]
    NUT02(#[from] crate::nuts::nut02::Error),
    /// NUT-03 error
    #[error(transparent)]
    NUT03(#[from] crate::nuts::nut03::Error),
    /// NUT-10 error
    #[error(transparent)]
    NUT10(#[from] crate::nuts::nut10::Error),
    /// NUT-11 error
    #[error(transparent)]
    NUT11(#[from] crate::nuts::nut11::Error),
    /// NUT-12 error
    #[error(transparent)]
    NUT12(#[from] crate::nuts::nut12::Error),
    /// NUT-13 error
    #[error(transparent)]
    NUT13(#[from] crate::nuts::nut13::Error),
    /// NUT-14 error
    #[error(transparent)]
    NUT14(#[from] crate::nuts::nut14::Error),
}
