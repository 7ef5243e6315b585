//! In-memory fake [`MintConnector`], for this crate's own tests and for
//! downstream crates exercising [`Wallet`] without a network.
//!
//! Every call a test cares about is configured ahead of time with
//! `set_*`; anything left unconfigured panics loudly on first use rather
//! than returning a default, so a test that forgets to wire a response
//! fails at the call site instead of producing a confusing downstream
//! assertion failure.

use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use cashu_core::nuts::{
    CheckStateRequest, CheckStateResponse, CurrencyUnit, Id, KeySet, KeysetResponse,
    MeltQuoteBolt11Response, MeltRequest, MeltResponse, MintInfo, MintQuoteBolt11Response,
    MintRequest, MintResponse, Proofs, RestoreRequest, RestoreResponse, SwapRequest, SwapResponse,
};
use cashu_core::{Amount, Bolt11Invoice, MintUrl};

use super::error::Error;
use super::MintConnector;

/// A mint URL with no special meaning, for tests that just need *a* URL.
pub fn test_mint_url() -> MintUrl {
    MintUrl::from_str("https://test-mint.example.com").expect("valid test mint url")
}

/// A keyset id with no special meaning, for tests that just need *an* id.
pub fn test_keyset_id() -> Id {
    Id::from_str("00916bbf7ef91a36").expect("valid test keyset id")
}

type Slot<T> = Mutex<Option<Result<T, Error>>>;

fn empty_slot<T>() -> Slot<T> {
    Mutex::new(None)
}

fn take<T>(slot: &Slot<T>, what: &str) -> Result<T, Error> {
    slot.lock()
        .expect("mock connector mutex poisoned")
        .take()
        .unwrap_or_else(|| panic!("MockMintConnector: {what} called without a configured response"))
}

/// Fake [`MintConnector`] whose responses are set per-call before the
/// operation under test runs.
#[derive(Debug)]
pub struct MockMintConnector {
    mint_keysets: Slot<KeysetResponse>,
    mint_keys: Slot<Vec<KeySet>>,
    mint_keyset: Slot<KeySet>,
    mint_info: Slot<MintInfo>,
    mint_quote: Slot<MintQuoteBolt11Response>,
    mint_quote_status: Slot<MintQuoteBolt11Response>,
    mint: Slot<MintResponse>,
    swap: Slot<SwapResponse>,
    melt_quote: Slot<MeltQuoteBolt11Response>,
    melt_quote_status: Slot<MeltQuoteBolt11Response>,
    melt: Slot<MeltResponse>,
    check_state: Slot<CheckStateResponse>,
    restore: Slot<RestoreResponse>,
}

impl Default for MockMintConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMintConnector {
    /// A connector with every response unset; each call panics until its
    /// matching `set_*` method is used.
    pub fn new() -> Self {
        Self {
            mint_keysets: empty_slot(),
            mint_keys: empty_slot(),
            mint_keyset: empty_slot(),
            mint_info: empty_slot(),
            mint_quote: empty_slot(),
            mint_quote_status: empty_slot(),
            mint: empty_slot(),
            swap: empty_slot(),
            melt_quote: empty_slot(),
            melt_quote_status: empty_slot(),
            melt: empty_slot(),
            check_state: empty_slot(),
            restore: empty_slot(),
        }
    }

    /// Queue the response for the next [`MintConnector::get_mint_keysets`] call.
    pub fn set_mint_keysets(&self, response: Result<KeysetResponse, Error>) {
        *self.mint_keysets.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::get_mint_keys`] call.
    pub fn set_mint_keys(&self, response: Result<Vec<KeySet>, Error>) {
        *self.mint_keys.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::get_mint_keyset`] call.
    pub fn set_mint_keyset(&self, response: Result<KeySet, Error>) {
        *self.mint_keyset.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::get_mint_info`] call.
    pub fn set_mint_info(&self, response: Result<MintInfo, Error>) {
        *self.mint_info.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::post_mint_quote`] call.
    pub fn set_mint_quote(&self, response: Result<MintQuoteBolt11Response, Error>) {
        *self.mint_quote.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::get_mint_quote_status`] call.
    pub fn set_mint_quote_status(&self, response: Result<MintQuoteBolt11Response, Error>) {
        *self.mint_quote_status.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::post_mint`] call.
    pub fn set_mint(&self, response: Result<MintResponse, Error>) {
        *self.mint.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::post_swap`] call.
    pub fn set_swap(&self, response: Result<SwapResponse, Error>) {
        *self.swap.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::post_melt_quote`] call.
    pub fn set_melt_quote(&self, response: Result<MeltQuoteBolt11Response, Error>) {
        *self.melt_quote.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::get_melt_quote_status`] call.
    pub fn set_melt_quote_status(&self, response: Result<MeltQuoteBolt11Response, Error>) {
        *self.melt_quote_status.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::post_melt`] call.
    pub fn set_melt(&self, response: Result<MeltResponse, Error>) {
        *self.melt.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::post_check_state`] call.
    pub fn set_check_state(&self, response: Result<CheckStateResponse, Error>) {
        *self.check_state.lock().expect("mutex poisoned") = Some(response);
    }

    /// Queue the response for the next [`MintConnector::post_restore`] call.
    pub fn set_restore(&self, response: Result<RestoreResponse, Error>) {
        *self.restore.lock().expect("mutex poisoned") = Some(response);
    }
}

#[async_trait]
impl MintConnector for MockMintConnector {
    async fn get_mint_keysets(&self, _mint_url: &MintUrl) -> Result<KeysetResponse, Error> {
        take(&self.mint_keysets, "get_mint_keysets")
    }

    async fn get_mint_keys(&self, _mint_url: &MintUrl) -> Result<Vec<KeySet>, Error> {
        take(&self.mint_keys, "get_mint_keys")
    }

    async fn get_mint_keyset(&self, _mint_url: &MintUrl, _keyset_id: Id) -> Result<KeySet, Error> {
        take(&self.mint_keyset, "get_mint_keyset")
    }

    async fn get_mint_info(&self, _mint_url: &MintUrl) -> Result<MintInfo, Error> {
        take(&self.mint_info, "get_mint_info")
    }

    async fn post_mint_quote(
        &self,
        _mint_url: &MintUrl,
        _amount: Amount,
        _unit: CurrencyUnit,
    ) -> Result<MintQuoteBolt11Response, Error> {
        take(&self.mint_quote, "post_mint_quote")
    }

    async fn get_mint_quote_status(
        &self,
        _mint_url: &MintUrl,
        _quote_id: &str,
    ) -> Result<MintQuoteBolt11Response, Error> {
        take(&self.mint_quote_status, "get_mint_quote_status")
    }

    async fn post_mint(
        &self,
        _mint_url: &MintUrl,
        _request: MintRequest,
    ) -> Result<MintResponse, Error> {
        take(&self.mint, "post_mint")
    }

    async fn post_swap(
        &self,
        _mint_url: &MintUrl,
        _request: SwapRequest,
    ) -> Result<SwapResponse, Error> {
        take(&self.swap, "post_swap")
    }

    async fn post_melt_quote(
        &self,
        _mint_url: &MintUrl,
        _request: Bolt11Invoice,
        _unit: CurrencyUnit,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        take(&self.melt_quote, "post_melt_quote")
    }

    async fn get_melt_quote_status(
        &self,
        _mint_url: &MintUrl,
        _quote_id: &str,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        take(&self.melt_quote_status, "get_melt_quote_status")
    }

    async fn post_melt(
        &self,
        _mint_url: &MintUrl,
        _quote: String,
        _inputs: Proofs,
        _outputs: Option<Vec<cashu_core::nuts::BlindedMessage>>,
    ) -> Result<MeltResponse, Error> {
        take(&self.melt, "post_melt")
    }

    async fn post_check_state(
        &self,
        _mint_url: &MintUrl,
        _request: CheckStateRequest,
    ) -> Result<CheckStateResponse, Error> {
        take(&self.check_state, "post_check_state")
    }

    async fn post_restore(
        &self,
        _mint_url: &MintUrl,
        _request: RestoreRequest,
    ) -> Result<RestoreResponse, Error> {
        take(&self.restore, "post_restore")
    }
}
