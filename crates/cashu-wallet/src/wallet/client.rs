//! The mint's HTTP surface, modelled as a trait
//!
//! Every operation in [`crate::wallet`] talks to the mint only through
//! [`MintConnector`]. The concrete [`HttpClient`] speaks the endpoints in
//! NUT-01 through NUT-09 over `reqwest`; tests and embedders can substitute
//! any other implementation (for example an in-memory fake, see
//! `test_utils` behind the `test-utils` feature) that answers the same
//! calls.

use async_trait::async_trait;
use cashu_core::nuts::{
    BlindedMessage, CheckStateRequest, CheckStateResponse, CurrencyUnit, Id, KeySet, KeysResponse,
    KeysetResponse, MeltQuoteBolt11Request, MeltQuoteBolt11Response, MeltRequest, MeltResponse,
    MintInfo, MintQuoteBolt11Request, MintQuoteBolt11Response, MintRequest, MintResponse,
    Proofs, RestoreRequest, RestoreResponse, SwapRequest, SwapResponse,
};
use cashu_core::{Amount, Bolt11Invoice, MintUrl};
use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use super::error::{Error, ErrorResponse};

/// The mint's HTTP RPC surface, from the wallet's point of view.
///
/// Every method name matches the NUT that defines the corresponding
/// endpoint. Implementations only need to speak JSON over the wire; how a
/// response is transported (reqwest, an in-process fake, anything else) is
/// deliberately left open.
#[async_trait]
pub trait MintConnector: std::fmt::Debug {
    /// `GET /v1/keysets` (NUT-02): keyset metadata for every keyset the
    /// mint has ever activated, without their public keys.
    async fn get_mint_keysets(&self, mint_url: &MintUrl) -> Result<KeysetResponse, Error>;

    /// `GET /v1/keys` (NUT-01): public keys for every active keyset.
    async fn get_mint_keys(&self, mint_url: &MintUrl) -> Result<Vec<KeySet>, Error>;

    /// `GET /v1/keys/{id}` (NUT-01): public keys for one keyset, active or not.
    async fn get_mint_keyset(&self, mint_url: &MintUrl, keyset_id: Id) -> Result<KeySet, Error>;

    /// `GET /v1/info` (NUT-06): mint metadata and supported-NUT registry.
    async fn get_mint_info(&self, mint_url: &MintUrl) -> Result<MintInfo, Error>;

    /// `POST /v1/mint/quote/bolt11` (NUT-04): request a Lightning invoice to
    /// fund a mint quote.
    async fn post_mint_quote(
        &self,
        mint_url: &MintUrl,
        amount: Amount,
        unit: CurrencyUnit,
    ) -> Result<MintQuoteBolt11Response, Error>;

    /// `GET /v1/mint/quote/bolt11/{id}` (NUT-04): current state of a mint quote.
    async fn get_mint_quote_status(
        &self,
        mint_url: &MintUrl,
        quote_id: &str,
    ) -> Result<MintQuoteBolt11Response, Error>;

    /// `POST /v1/mint/bolt11` (NUT-04): redeem a paid quote for signatures.
    async fn post_mint(
        &self,
        mint_url: &MintUrl,
        request: MintRequest,
    ) -> Result<MintResponse, Error>;

    /// `POST /v1/swap` (NUT-03): exchange proofs for freshly blinded outputs.
    async fn post_swap(
        &self,
        mint_url: &MintUrl,
        request: SwapRequest,
    ) -> Result<SwapResponse, Error>;

    /// `POST /v1/melt/quote/bolt11` (NUT-05): request a quote to pay a
    /// Lightning invoice out of ecash.
    async fn post_melt_quote(
        &self,
        mint_url: &MintUrl,
        request: Bolt11Invoice,
        unit: CurrencyUnit,
    ) -> Result<MeltQuoteBolt11Response, Error>;

    /// `GET /v1/melt/quote/bolt11/{id}` (NUT-05): current state of a melt quote.
    async fn get_melt_quote_status(
        &self,
        mint_url: &MintUrl,
        quote_id: &str,
    ) -> Result<MeltQuoteBolt11Response, Error>;

    /// `POST /v1/melt/bolt11` (NUT-05, NUT-08): settle a melt quote by
    /// handing over inputs, optionally with blank outputs for fee change.
    async fn post_melt(
        &self,
        mint_url: &MintUrl,
        quote: String,
        inputs: Proofs,
        outputs: Option<Vec<BlindedMessage>>,
    ) -> Result<MeltResponse, Error>;

    /// `POST /v1/checkstate` (NUT-07): query spent/unspent/pending state for
    /// a batch of proofs by their `Y` value.
    async fn post_check_state(
        &self,
        mint_url: &MintUrl,
        request: CheckStateRequest,
    ) -> Result<CheckStateResponse, Error>;

    /// `POST /v1/restore` (NUT-09): recover signatures for a batch of
    /// deterministically re-derived blinded messages.
    async fn post_restore(
        &self,
        mint_url: &MintUrl,
        request: RestoreRequest,
    ) -> Result<RestoreResponse, Error>;
}

/// `reqwest`-backed [`MintConnector`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// New [`HttpClient`] using a plain, no-frills `reqwest::Client`.
    pub fn new() -> Self {
        Self {
            inner: Client::new(),
        }
    }

    /// New [`HttpClient`] that routes requests to hosts matching
    /// `host_matcher` (or to every host, if `None`) through `proxy`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_proxy(
        proxy: url::Url,
        host_matcher: Option<&str>,
        accept_invalid_certs: bool,
    ) -> Result<Self, Error> {
        let regex = host_matcher
            .map(regex::Regex::new)
            .transpose()
            .map_err(|e| Error::Custom(e.to_string()))?;
        let client = reqwest::Client::builder()
            .proxy(reqwest::Proxy::custom(move |url| {
                let host = url.host_str()?;
                match regex.as_ref() {
                    Some(matcher) if matcher.is_match(host) => Some(proxy.clone()),
                    Some(_) => None,
                    None => Some(proxy.clone()),
                }
            }))
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self { inner: client })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: url::Url) -> Result<T, Error> {
        let body = self.inner.get(url).send().await?.json::<Value>().await?;
        Self::parse(body)
    }

    async fn post<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        url: url::Url,
        body: &B,
    ) -> Result<T, Error> {
        let res = self
            .inner
            .post(url)
            .json(body)
            .send()
            .await?
            .json::<Value>()
            .await?;
        Self::parse(res)
    }

    fn parse<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, Error> {
        match serde_json::from_value::<T>(body.clone()) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!("mint response did not match expected shape: {err}");
                Err(ErrorResponse::from_value(body)?.into())
            }
        }
    }
}

#[async_trait]
impl MintConnector for HttpClient {
    #[instrument(skip(self), fields(mint_url = %mint_url))]
    async fn get_mint_keysets(&self, mint_url: &MintUrl) -> Result<KeysetResponse, Error> {
        let url = mint_url.join_paths(&["v1", "keysets"])?;
        self.get(url).await
    }

    #[instrument(skip(self), fields(mint_url = %mint_url))]
    async fn get_mint_keys(&self, mint_url: &MintUrl) -> Result<Vec<KeySet>, Error> {
        let url = mint_url.join_paths(&["v1", "keys"])?;
        let response: KeysResponse = self.get(url).await?;
        Ok(response.keysets)
    }

    #[instrument(skip(self), fields(mint_url = %mint_url))]
    async fn get_mint_keyset(&self, mint_url: &MintUrl, keyset_id: Id) -> Result<KeySet, Error> {
        let url = mint_url.join_paths(&["v1", "keys", &keyset_id.to_string()])?;
        let response: KeysResponse = self.get(url).await?;
        response
            .keysets
            .into_iter()
            .next()
            .ok_or(Error::KeysetNotFound)
    }

    #[instrument(skip(self), fields(mint_url = %mint_url))]
    async fn get_mint_info(&self, mint_url: &MintUrl) -> Result<MintInfo, Error> {
        let url = mint_url.join_paths(&["v1", "info"])?;
        self.get(url).await
    }

    #[instrument(skip(self), fields(mint_url = %mint_url))]
    async fn post_mint_quote(
        &self,
        mint_url: &MintUrl,
        amount: Amount,
        unit: CurrencyUnit,
    ) -> Result<MintQuoteBolt11Response, Error> {
        let url = mint_url.join_paths(&["v1", "mint", "quote", "bolt11"])?;
        let request = MintQuoteBolt11Request { amount, unit };
        self.post(url, &request).await
    }

    #[instrument(skip(self), fields(mint_url = %mint_url))]
    async fn get_mint_quote_status(
        &self,
        mint_url: &MintUrl,
        quote_id: &str,
    ) -> Result<MintQuoteBolt11Response, Error> {
        let url = mint_url.join_paths(&["v1", "mint", "quote", "bolt11", quote_id])?;
        self.get(url).await
    }

    #[instrument(skip(self, request), fields(mint_url = %mint_url))]
    async fn post_mint(
        &self,
        mint_url: &MintUrl,
        request: MintRequest,
    ) -> Result<MintResponse, Error> {
        let url = mint_url.join_paths(&["v1", "mint", "bolt11"])?;
        self.post(url, &request).await
    }

    #[instrument(skip(self, request), fields(mint_url = %mint_url))]
    async fn post_swap(
        &self,
        mint_url: &MintUrl,
        request: SwapRequest,
    ) -> Result<SwapResponse, Error> {
        let url = mint_url.join_paths(&["v1", "swap"])?;
        self.post(url, &request).await
    }

    #[instrument(skip(self, request), fields(mint_url = %mint_url))]
    async fn post_melt_quote(
        &self,
        mint_url: &MintUrl,
        request: Bolt11Invoice,
        unit: CurrencyUnit,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        let url = mint_url.join_paths(&["v1", "melt", "quote", "bolt11"])?;
        let request = MeltQuoteBolt11Request { request, unit };
        self.post(url, &request).await
    }

    #[instrument(skip(self), fields(mint_url = %mint_url))]
    async fn get_melt_quote_status(
        &self,
        mint_url: &MintUrl,
        quote_id: &str,
    ) -> Result<MeltQuoteBolt11Response, Error> {
        let url = mint_url.join_paths(&["v1", "melt", "quote", "bolt11", quote_id])?;
        self.get(url).await
    }

    #[instrument(skip(self, inputs, outputs), fields(mint_url = %mint_url))]
    async fn post_melt(
        &self,
        mint_url: &MintUrl,
        quote: String,
        inputs: Proofs,
        outputs: Option<Vec<BlindedMessage>>,
    ) -> Result<MeltResponse, Error> {
        let url = mint_url.join_paths(&["v1", "melt", "bolt11"])?;
        let request = MeltRequest {
            quote,
            inputs,
            outputs,
        };
        self.post(url, &request).await
    }

    #[instrument(skip(self, request), fields(mint_url = %mint_url))]
    async fn post_check_state(
        &self,
        mint_url: &MintUrl,
        request: CheckStateRequest,
    ) -> Result<CheckStateResponse, Error> {
        let url = mint_url.join_paths(&["v1", "checkstate"])?;
        self.post(url, &request).await
    }

    #[instrument(skip(self, request), fields(mint_url = %mint_url))]
    async fn post_restore(
        &self,
        mint_url: &MintUrl,
        request: RestoreRequest,
    ) -> Result<RestoreResponse, Error> {
        let url = mint_url.join_paths(&["v1", "restore"])?;
        self.post(url, &request).await
    }
}
