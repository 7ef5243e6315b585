//! [`WalletBuilder`]: the only configuration surface this crate has
//!
//! There is no file, environment variable, or CLI flag to read; a `Wallet`
//! is fully described by the mint it talks to, the unit it operates in, an
//! optional deterministic-secret seed, and the connector used to reach the
//! mint.

use std::sync::Arc;

use cashu_core::nuts::CurrencyUnit;
use cashu_core::MintUrl;

use super::client::{HttpClient, MintConnector};
use super::error::Error;
use super::Wallet;

/// Builder for a [`Wallet`].
#[derive(Debug, Default)]
pub struct WalletBuilder {
    mint_url: Option<MintUrl>,
    unit: Option<CurrencyUnit>,
    seed: Option<[u8; 64]>,
    client: Option<Arc<dyn MintConnector + Send + Sync>>,
}

impl WalletBuilder {
    /// New, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mint this wallet talks to.
    pub fn mint_url(mut self, mint_url: MintUrl) -> Self {
        self.mint_url = Some(mint_url);
        self
    }

    /// Set the currency unit this wallet operates in.
    pub fn unit(mut self, unit: CurrencyUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the BIP-39 seed bytes used for NUT-13 deterministic secrets.
    ///
    /// Omit this to get a wallet whose outputs are always random and whose
    /// proofs cannot be recovered via [`crate::wallet::restore`] after data
    /// loss.
    pub fn seed(mut self, seed: [u8; 64]) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a custom connector instead of the default [`HttpClient`].
    pub fn client<C: MintConnector + 'static + Send + Sync>(mut self, client: C) -> Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Build the [`Wallet`].
    pub fn build(self) -> Result<Wallet, Error> {
        let mint_url = self
            .mint_url
            .ok_or(Error::MissingRequestDetail("mint_url"))?;
        let unit = self.unit.ok_or(Error::MissingRequestDetail("unit"))?;
        let client = self
            .client
            .unwrap_or_else(|| Arc::new(HttpClient::new()) as Arc<dyn MintConnector + Send + Sync>);

        Ok(Wallet::new(mint_url, unit, self.seed, client))
    }
}
