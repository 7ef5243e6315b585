//! Wallet-side operation state machines for the Cashu protocol
//!
//! This crate has no persistence and no network implementation of its
//! own opinions: a [`wallet::Wallet`] is built from a mint URL, a unit,
//! an optional seed, and anything implementing [`wallet::MintConnector`]
//! (the bundled [`wallet::HttpClient`], or a fake for tests). Every
//! operation method is a pure async state machine over that connector.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod wallet;

#[doc(hidden)]
pub use cashu_core;
pub use wallet::{Error, HttpClient, MintConnector, Wallet, WalletBuilder};
