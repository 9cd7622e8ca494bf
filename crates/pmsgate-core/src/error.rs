// ── Core error types ──
//
// Errors surfaced to the booking application. Every upstream-facing kind
// keeps the HTTP status and raw body so the caller can decide on
// user-facing messaging. Catalog mismatches are not errors here: they are
// recorded as diagnostics (see `model::diagnostics`).

use thiserror::Error;
use uuid::Uuid;

use pmsgate_api::TimeoutPhase;
use pmsgate_api::error::excerpt;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    /// Token grant rejected, or an authorized call answered 401/403.
    #[error("PMS authentication failed (HTTP {status}): {}", excerpt(.body))]
    Auth { status: u16, body: String },

    // ── Upstream ─────────────────────────────────────────────────────
    /// Non-success status from an availability, reservation or lookup call.
    #[error("PMS returned HTTP {status}: {}", excerpt(.body))]
    Upstream { status: u16, body: String },

    /// Response did not have the expected shape.
    #[error("Unexpected PMS response: {message}")]
    Protocol { message: String, body: String },

    /// A reservation POST that failed after it was sent, or whose response
    /// could not be read. The booking may exist upstream; retrying with the
    /// same key cannot duplicate it.
    #[error("{source} (idempotency key {idempotency_key})")]
    ReservationFailed {
        idempotency_key: Uuid,
        source: Box<CoreError>,
    },

    // ── Transport ────────────────────────────────────────────────────
    #[error("PMS {phase} timed out")]
    Timeout { phase: TimeoutPhase },

    #[error("Cannot reach PMS gateway {url}: {reason}")]
    Connection { url: String, reason: String },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid catalog: {message}")]
    Catalog { message: String },
}

impl CoreError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// The underlying failure, looking through `ReservationFailed`.
    pub fn root(&self) -> &Self {
        match self {
            Self::ReservationFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Key to resend when retrying a failed reservation.
    pub fn idempotency_key(&self) -> Option<Uuid> {
        match self {
            Self::ReservationFailed {
                idempotency_key, ..
            } => Some(*idempotency_key),
            _ => None,
        }
    }

    /// Returns `true` for errors a caller may retry on an idempotent call.
    pub fn is_transient(&self) -> bool {
        match self.root() {
            Self::Timeout { .. } | Self::Connection { .. } => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self.root(), Self::Auth { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::Upstream { status: 404, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::Auth { status, .. } | Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw upstream body carried by the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self.root() {
            Self::Auth { body, .. } | Self::Upstream { body, .. } | Self::Protocol { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<pmsgate_api::Error> for CoreError {
    fn from(err: pmsgate_api::Error) -> Self {
        match err {
            pmsgate_api::Error::Authentication { status, body } => Self::Auth { status, body },
            pmsgate_api::Error::Upstream { status, body } => Self::Upstream { status, body },
            pmsgate_api::Error::Protocol { message, body } => Self::Protocol { message, body },
            pmsgate_api::Error::Timeout { phase } => Self::Timeout { phase },
            pmsgate_api::Error::Connect { url, message } => Self::Connection {
                url,
                reason: message,
            },
            pmsgate_api::Error::Transport { message } => Self::Connection {
                url: String::new(),
                reason: message,
            },
            pmsgate_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid gateway URL: {e}"),
            },
            pmsgate_api::Error::InvalidHeader { name, message } => Self::Config {
                message: format!("value for header {name} is not sendable: {message}"),
            },
            pmsgate_api::Error::ClientBuild(message) => Self::Config { message },
        }
    }
}
