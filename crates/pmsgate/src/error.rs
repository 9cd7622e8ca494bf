//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use pmsgate_config::ConfigError;
use pmsgate_core::{CoreError, excerpt};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UPSTREAM: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach PMS gateway {url}")]
    #[diagnostic(
        code(pmsgate::connection_failed),
        help(
            "Check the gateway URL and your network.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("PMS {phase} timed out")]
    #[diagnostic(
        code(pmsgate::timeout),
        help("Raise the limit with --connect-timeout / --timeout, or in the profile.")
    )]
    Timeout { phase: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(pmsgate::auth_failed),
        help(
            "Verify client_id, app_key, scope and the client secret.\n\
             The secret is read from the profile's client_secret_env, then\n\
             PMSGATE_CLIENT_SECRET, then client_secret in the config file.\n\
             Gateway said: {body}"
        )
    )]
    AuthFailed { status: u16, body: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(pmsgate::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── Upstream ─────────────────────────────────────────────────────
    #[error("PMS returned HTTP {status}")]
    #[diagnostic(code(pmsgate::upstream), help("Gateway said: {body}"))]
    Upstream { status: u16, body: String },

    #[error("Reservation failed: {inner}")]
    #[diagnostic(
        code(pmsgate::reservation_failed),
        help(
            "The gateway may still have created the booking.\n\
             Retry with this key so it is not created twice:\n\
             --idempotency-key {idempotency_key}"
        )
    )]
    ReservationFailed {
        idempotency_key: String,
        inner: Box<CliError>,
    },

    #[error("Unexpected PMS response: {message}")]
    #[diagnostic(
        code(pmsgate::protocol),
        help("Re-run with -vv to log the raw response body.")
    )]
    Protocol { message: String },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(pmsgate::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No configuration found")]
    #[diagnostic(
        code(pmsgate::no_config),
        help(
            "Create a profile in {path}\n\
             Run: pmsgate config path"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(pmsgate::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Profile '{profile}' is incomplete")]
    #[diagnostic(
        code(pmsgate::incomplete_profile),
        help("Missing: {missing}")
    )]
    IncompleteProfile { profile: String, missing: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(pmsgate::config))]
    Config { message: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error("{context}: {source}")]
    #[diagnostic(code(pmsgate::io))]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("Invalid JSON input: {0}")]
    #[diagnostic(code(pmsgate::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(pmsgate::render))]
    Render(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ReservationFailed { inner, .. } => inner.exit_code(),
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::Upstream { status: 404, .. } => exit_code::NOT_FOUND,
            Self::Upstream { .. } | Self::Protocol { .. } => exit_code::UPSTREAM,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            Self::NoConfig { .. }
            | Self::ProfileNotFound { .. }
            | Self::IncompleteProfile { .. }
            | Self::Config { .. } => exit_code::CONFIG,
            Self::Io { .. } | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Auth { status, body } => Self::AuthFailed {
                status,
                body: excerpt(&body),
            },
            CoreError::Upstream { status, body } => Self::Upstream {
                status,
                body: excerpt(&body),
            },
            CoreError::Protocol { message, .. } => Self::Protocol { message },
            CoreError::ReservationFailed {
                idempotency_key,
                source,
            } => Self::ReservationFailed {
                idempotency_key: idempotency_key.to_string(),
                inner: Box::new((*source).into()),
            },
            CoreError::Timeout { phase } => Self::Timeout {
                phase: phase.to_string(),
            },
            CoreError::Connection { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Validation { field, message } => Self::Validation {
                field: field.into(),
                reason: message,
            },
            CoreError::Config { message } | CoreError::Catalog { message } => {
                Self::Config { message }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Config {
                message: format!("invalid {field}: {reason}"),
            },
            ConfigError::Incomplete { profile, missing } => Self::IncompleteProfile {
                profile,
                missing: missing.join(", "),
            },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::Core(core) => core.into(),
            other @ (ConfigError::Figment(_) | ConfigError::CatalogFile { .. }) => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
