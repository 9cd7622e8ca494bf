// Authorized HTTP client for the PMS gateway.
//
// Every call goes through the shared `TokenCache`, attaches the bearer
// token plus enterprise/hotel/application identifiers, and classifies the
// response. A 401/403 is surfaced as-is and never retried with a new token.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{ClientCredentials, OAuthTokenSource, TokenSource, header_value};
use crate::error::{Error, excerpt};
use crate::token_cache::{RefreshPolicy, TokenCache};
use crate::transport::TransportConfig;

/// Identifiers sent on every authorized call.
#[derive(Debug, Clone)]
pub struct PmsIdentity {
    pub enterprise_id: String,
    pub hotel_id: String,
    pub app_key: String,
}

/// Async client for the PMS availability and reservation surfaces.
///
/// Generic over the token source so tests can drive it with an in-process
/// source; production code uses [`OAuthTokenSource`].
pub struct PmsClient<S = OAuthTokenSource> {
    http: reqwest::Client,
    base_url: Url,
    hotel_id: String,
    tokens: Arc<TokenCache<S>>,
    identity_headers: HeaderMap,
}

impl PmsClient<OAuthTokenSource> {
    /// Build a client and its token cache for one gateway and hotel.
    pub fn new(
        base_url: &str,
        hotel_id: impl Into<String>,
        credentials: ClientCredentials,
        refresh: RefreshPolicy,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        let http = transport.build_client()?;
        let identity = PmsIdentity {
            enterprise_id: credentials.enterprise_id.clone(),
            hotel_id: hotel_id.into(),
            app_key: credentials.app_key.clone(),
        };
        let source = OAuthTokenSource::with_client(http.clone(), &base_url, credentials)?;
        let tokens = Arc::new(TokenCache::new(source, refresh));
        Self::from_parts(http, base_url, &identity, tokens)
    }
}

impl<S: TokenSource> PmsClient<S> {
    /// Assemble a client from an existing `reqwest::Client` and token cache.
    pub fn from_parts(
        http: reqwest::Client,
        base_url: Url,
        identity: &PmsIdentity,
        tokens: Arc<TokenCache<S>>,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-enterpriseid"),
            header_value("x-enterpriseid", &identity.enterprise_id)?,
        );
        headers.insert(
            HeaderName::from_static("x-hotelid"),
            header_value("x-hotelid", &identity.hotel_id)?,
        );
        headers.insert(
            HeaderName::from_static("x-app-key"),
            header_value("x-app-key", &identity.app_key)?,
        );

        Ok(Self {
            http,
            base_url: ensure_trailing_slash(base_url),
            hotel_id: identity.hotel_id.clone(),
            tokens,
            identity_headers: headers,
        })
    }

    pub fn hotel_id(&self) -> &str {
        &self.hotel_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared token cache.
    pub fn tokens(&self) -> &Arc<TokenCache<S>> {
        &self.tokens
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"par/v1/hotels/H1/availability"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Path segment for this client's hotel, percent-encoded.
    pub(crate) fn hotel_segment(&self) -> String {
        encode_segment(&self.hotel_id)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorized(Method::GET, url)
            .await?
            .query(params)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        extra_headers: HeaderMap,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .authorized(Method::POST, url)
            .await?
            .headers(extra_headers)
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn authorized(&self, method: Method, url: Url) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.tokens.get_token().await?;
        let mut bearer = header_value(
            "authorization",
            &format!("Bearer {}", token.secret().expose_secret()),
        )?;
        bearer.set_sensitive(true);

        Ok(self
            .http
            .request(method, url)
            .headers(self.identity_headers.clone())
            .header(AUTHORIZATION, bearer))
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        let url = resp.url().clone();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), %url, body = %excerpt(&body), "PMS rejected credentials");
            return Err(Error::Authentication {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, body = %excerpt(&body), "PMS call failed");
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            let preview = excerpt(&body);
            Error::Protocol {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

/// Parse a gateway base URL, making sure relative joins keep its path.
pub fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    Ok(ensure_trailing_slash(Url::parse(raw)?))
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Percent-encode a value for use as a single path segment.
pub(crate) fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
