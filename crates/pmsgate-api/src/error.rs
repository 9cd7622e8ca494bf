use std::fmt;

use thiserror::Error;

/// Maximum number of body characters carried into error messages.
const BODY_EXCERPT_CHARS: usize = 200;

/// Which timeout bound a failed call exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    /// TCP/TLS connection was not established within the connect timeout.
    Connect,
    /// The whole request (including the body read) exceeded the request timeout.
    Request,
}

impl fmt::Display for TimeoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connect"),
            Self::Request => f.write_str("request"),
        }
    }
}

/// Top-level error type for the `pmsgate-api` crate.
///
/// Covers every failure mode of the PMS gateway surface: token exchange,
/// authorized calls, response shape, and transport. `pmsgate-core` maps
/// these into its own taxonomy without losing status or body.
///
/// The type is `Clone` so a single failed token exchange can be handed to
/// every caller that was waiting on it.
#[derive(Debug, Clone, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token grant rejected, or an authorized call answered 401/403.
    #[error("Authentication failed (HTTP {status}): {}", excerpt(.body))]
    Authentication { status: u16, body: String },

    // ── Upstream ────────────────────────────────────────────────────
    /// Any other non-success status from the PMS.
    #[error("Upstream error (HTTP {status}): {}", excerpt(.body))]
    Upstream { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The response did not have the expected shape. `body` holds the raw
    /// payload for diagnosis.
    #[error("Protocol error: {message}")]
    Protocol { message: String, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connect or request timeout exceeded.
    #[error("PMS {phase} timed out")]
    Timeout { phase: TimeoutPhase },

    /// Connection refused, DNS failure, TLS handshake failure.
    #[error("Cannot connect to {url}: {message}")]
    Connect { url: String, message: String },

    /// Any other HTTP transport failure.
    #[error("HTTP transport error: {message}")]
    Transport { message: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configured value cannot be sent as an HTTP header.
    #[error("Invalid value for header {name}: {message}")]
    InvalidHeader { name: &'static str, message: String },

    /// The `reqwest::Client` could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let phase = if err.is_connect() {
                TimeoutPhase::Connect
            } else {
                TimeoutPhase::Request
            };
            return Self::Timeout { phase };
        }
        if err.is_connect() {
            return Self::Connect {
                url: err.url().map(ToString::to_string).unwrap_or_default(),
                message: err.to_string(),
            };
        }
        Self::Transport {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Returns `true` for authentication failures (grant rejected, 401/403).
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on an
    /// idempotent call.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            Self::Authentication { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the PMS answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Upstream { status: 404, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw upstream body carried by the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Authentication { body, .. }
            | Self::Upstream { body, .. }
            | Self::Protocol { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// First [`BODY_EXCERPT_CHARS`] characters of a body, on a char boundary.
pub fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        return body.to_owned();
    }
    let mut cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}
