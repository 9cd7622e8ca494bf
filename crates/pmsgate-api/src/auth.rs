// OAuth2 client-credentials exchange against the PMS gateway.
//
// `POST {gateway}/oauth/v1/tokens` with a Basic-encoded client id/secret,
// the application key and enterprise id as headers, and a form body of
// `grant_type=client_credentials&scope=<scope>`.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, excerpt};
use crate::transport::TransportConfig;

// ── Credentials ──────────────────────────────────────────────────────

/// Everything needed to request a client-credentials grant.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub scope: String,
    /// Application key sent as `x-app-key`.
    pub app_key: String,
    pub enterprise_id: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("app_key", &self.app_key)
            .field("enterprise_id", &self.enterprise_id)
            .finish()
    }
}

// ── Token ────────────────────────────────────────────────────────────

/// A bearer token together with the instant it stops being valid.
///
/// `expires_at` is always the acquisition instant plus the grant's
/// `expires_in`. The value is never logged.
#[derive(Clone)]
pub struct AccessToken {
    value: SecretString,
    token_type: String,
    expires_at: Instant,
}

impl AccessToken {
    /// Build a token acquired at `acquired_at` and valid for `expires_in`.
    pub fn new(value: impl Into<String>, expires_in: Duration, acquired_at: Instant) -> Self {
        Self {
            value: SecretString::from(value.into()),
            token_type: "Bearer".into(),
            expires_at: acquired_at + expires_in,
        }
    }

    /// The raw token value, for the `Authorization` header.
    pub fn secret(&self) -> &SecretString {
        &self.value
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Time left before expiry, saturating at zero.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ── Token source ─────────────────────────────────────────────────────

/// Anything able to mint a fresh [`AccessToken`].
///
/// The production implementation is [`OAuthTokenSource`]; tests substitute
/// an in-process source to drive the cache under a paused clock.
pub trait TokenSource: Send + Sync + 'static {
    fn fetch_token(&self) -> impl Future<Output = Result<AccessToken, Error>> + Send;
}

/// Grant response body. Every field is optional so that a missing
/// `access_token` surfaces as a protocol error rather than a parse error.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Client-credentials grant over HTTP.
pub struct OAuthTokenSource {
    http: reqwest::Client,
    token_url: Url,
    credentials: ClientCredentials,
}

impl OAuthTokenSource {
    /// Build a token source for the gateway at `base_url`.
    pub fn new(
        base_url: &Url,
        credentials: ClientCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, credentials)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &Url,
        credentials: ClientCredentials,
    ) -> Result<Self, Error> {
        let token_url = base_url.join("oauth/v1/tokens")?;
        Ok(Self {
            http,
            token_url,
            credentials,
        })
    }

    fn grant_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-app-key"),
            header_value("x-app-key", &self.credentials.app_key)?,
        );
        headers.insert(
            HeaderName::from_static("enterpriseid"),
            header_value("enterpriseId", &self.credentials.enterprise_id)?,
        );
        Ok(headers)
    }

    async fn exchange(&self) -> Result<AccessToken, Error> {
        let url = self.token_url.clone();
        debug!("POST {url}");

        let acquired_at = Instant::now();
        let resp = self
            .http
            .post(url)
            .headers(self.grant_headers()?)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", self.credentials.scope.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                body = %excerpt(&body),
                "token grant rejected"
            );
            return Err(Error::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let grant: TokenGrant = match serde_json::from_str(&body) {
            Ok(grant) => grant,
            Err(e) => {
                return Err(Error::Protocol {
                    message: format!("token grant is not valid JSON: {e}"),
                    body,
                });
            }
        };

        let Some(value) = grant.access_token.filter(|t| !t.is_empty()) else {
            return Err(Error::Protocol {
                message: "token grant lacks access_token".into(),
                body,
            });
        };
        let Some(expires_in) = grant.expires_in else {
            return Err(Error::Protocol {
                message: "token grant lacks expires_in".into(),
                body,
            });
        };

        debug!(expires_in, "access token granted");

        let mut token = AccessToken::new(value, Duration::from_secs(expires_in), acquired_at);
        if let Some(token_type) = grant.token_type {
            token.token_type = token_type;
        }
        Ok(token)
    }
}

impl TokenSource for OAuthTokenSource {
    async fn fetch_token(&self) -> Result<AccessToken, Error> {
        self.exchange().await
    }
}

/// Convert a configured string into a header value, naming the header on failure.
pub(crate) fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name,
        message: e.to_string(),
    })
}
