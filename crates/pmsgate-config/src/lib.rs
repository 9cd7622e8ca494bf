//! Shared configuration for pmsgate front ends.
//!
//! TOML profiles layered with `PMSGATE_*` environment variables, client
//! secret resolution (env + plaintext), catalog loading, and translation
//! to `pmsgate_core::ServiceConfig`. The CLI adds flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use pmsgate_core::{
    ClientCredentials, ConfigCatalog, CoreError, ReservationDefaults, ServiceConfig, TlsMode,
    TransportConfig,
};

/// Conventional environment variable holding the client secret.
pub const CLIENT_SECRET_ENV: &str = "PMSGATE_CLIENT_SECRET";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' is missing: {}", .missing.join(", "))]
    Incomplete {
        profile: String,
        missing: Vec<&'static str>,
    },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("cannot read catalog {path}: {source}")]
    CatalogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named hotel profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `None`.
    pub fn profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Label language: "en" or "es".
    #[serde(default = "default_language")]
    pub language: String,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Overall request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            language: default_language(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_connect_timeout() -> u64 {
    5
}
fn default_request_timeout() -> u64 {
    15
}

/// A named hotel profile.
///
/// Required fields are optional here so validation can report every
/// missing one at once.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway base URL (e.g., "https://gateway.example.com").
    pub gateway_url: Option<String>,
    pub enterprise_id: Option<String>,
    pub hotel_id: Option<String>,
    pub client_id: Option<String>,

    /// Client secret (plaintext; prefer an env var).
    pub client_secret: Option<String>,

    /// Environment variable name containing the client secret.
    pub client_secret_env: Option<String>,

    /// Application key sent as `x-app-key`.
    pub app_key: Option<String>,
    pub scope: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override connect timeout (seconds).
    pub connect_timeout: Option<u64>,

    /// Override request timeout (seconds).
    pub request_timeout: Option<u64>,

    /// Availability page size.
    pub availability_limit: Option<u32>,

    pub default_rate_plan: Option<String>,

    // ── Reservation defaults ──
    pub currency: Option<String>,
    pub guarantee_code: Option<String>,
    pub guarantee_description: Option<String>,
    pub market_code: Option<String>,
    pub source_code: Option<String>,
    pub payment_method: Option<String>,

    /// TOML catalog file; the built-in resort catalog when unset.
    pub catalog: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pmsgate", "pmsgate").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pmsgate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) layered with `PMSGATE_*`
/// variables. Nested keys use `__`, e.g. `PMSGATE_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PMSGATE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Secret resolution ───────────────────────────────────────────────

/// Resolve the client secret: the profile's env var, then
/// `PMSGATE_CLIENT_SECRET`, then plaintext in the profile.
pub fn resolve_client_secret(profile: &Profile) -> Option<SecretString> {
    resolve_client_secret_with(profile, |name| std::env::var(name).ok())
}

/// [`resolve_client_secret`] with an explicit environment lookup.
pub fn resolve_client_secret_with(
    profile: &Profile,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    let non_empty = |value: String| (!value.is_empty()).then_some(value);

    profile
        .client_secret_env
        .as_deref()
        .and_then(&env)
        .and_then(non_empty)
        .or_else(|| env(CLIENT_SECRET_ENV).and_then(non_empty))
        .or_else(|| profile.client_secret.clone().and_then(non_empty))
        .map(SecretString::from)
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ServiceConfig` from a profile, resolving the secret from the
/// process environment.
pub fn profile_to_service_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ServiceConfig, ConfigError> {
    profile_to_service_config_with(profile, profile_name, defaults, |name| {
        std::env::var(name).ok()
    })
}

/// [`profile_to_service_config`] with an explicit environment lookup.
/// Reports every missing required field in one error.
pub fn profile_to_service_config_with(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServiceConfig, ConfigError> {
    let secret = resolve_client_secret_with(profile, env);

    let mut missing = Vec::new();
    let mut require = |field: &'static str, value: Option<&String>| -> String {
        match value.map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(v) => v.to_owned(),
            None => {
                missing.push(field);
                String::new()
            }
        }
    };
    let gateway_url = require("gateway_url", profile.gateway_url.as_ref());
    let enterprise_id = require("enterprise_id", profile.enterprise_id.as_ref());
    let hotel_id = require("hotel_id", profile.hotel_id.as_ref());
    let client_id = require("client_id", profile.client_id.as_ref());
    let app_key = require("app_key", profile.app_key.as_ref());
    let scope = require("scope", profile.scope.as_ref());

    if secret.is_none() {
        missing.push("client_secret");
    }
    let (Some(client_secret), true) = (secret, missing.is_empty()) else {
        return Err(ConfigError::Incomplete {
            profile: profile_name.into(),
            missing,
        });
    };

    if !(gateway_url.starts_with("http://") || gateway_url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            field: "gateway_url".into(),
            reason: format!("expected an http(s) URL, got '{gateway_url}'"),
        });
    }

    let transport = TransportConfig {
        tls: profile
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa),
        connect_timeout: Duration::from_secs(
            profile.connect_timeout.unwrap_or(defaults.connect_timeout),
        ),
        request_timeout: Duration::from_secs(
            profile.request_timeout.unwrap_or(defaults.request_timeout),
        ),
    };

    let mut reservation_defaults = ReservationDefaults::default();
    let overrides = [
        (&profile.currency, &mut reservation_defaults.currency_code),
        (&profile.guarantee_code, &mut reservation_defaults.guarantee_code),
        (
            &profile.guarantee_description,
            &mut reservation_defaults.guarantee_description,
        ),
        (&profile.market_code, &mut reservation_defaults.market_code),
        (&profile.source_code, &mut reservation_defaults.source_code),
        (&profile.payment_method, &mut reservation_defaults.payment_method),
    ];
    for (value, slot) in overrides {
        if let Some(value) = value {
            value.clone_into(slot);
        }
    }

    let mut config = ServiceConfig::new(
        gateway_url,
        hotel_id,
        ClientCredentials {
            client_id,
            client_secret,
            scope,
            app_key,
            enterprise_id,
        },
    );
    config.transport = transport;
    config.reservation_defaults = reservation_defaults;
    if let Some(limit) = profile.availability_limit {
        config.availability_limit = limit;
    }
    if let Some(plan) = &profile.default_rate_plan {
        plan.clone_into(&mut config.default_rate_plan);
    }
    Ok(config)
}

// ── Catalog ─────────────────────────────────────────────────────────

/// Load the profile's catalog file, or the built-in catalog.
pub fn load_catalog(profile: Option<&Profile>) -> Result<ConfigCatalog, ConfigError> {
    match profile.and_then(|p| p.catalog.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "loading catalog");
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CatalogFile {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(ConfigCatalog::from_toml_str(&raw)?)
        }
        None => Ok(ConfigCatalog::builtin()?),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn complete_profile() -> Profile {
        Profile {
            gateway_url: Some("https://gw.example.com".into()),
            enterprise_id: Some("ENT1".into()),
            hotel_id: Some("HOTEL1".into()),
            client_id: Some("client-id".into()),
            client_secret: Some("plain".into()),
            app_key: Some("app-key".into()),
            scope: Some("pms-scope".into()),
            ..Profile::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn secret_resolution_order() {
        let mut profile = complete_profile();
        profile.client_secret_env = Some("HOTEL1_SECRET".into());

        let env = |name: &str| match name {
            "HOTEL1_SECRET" => Some("from-profile-env".to_owned()),
            CLIENT_SECRET_ENV => Some("from-conventional-env".to_owned()),
            _ => None,
        };
        let secret = resolve_client_secret_with(&profile, env).unwrap();
        assert_eq!(secret.expose_secret(), "from-profile-env");

        let env = |name: &str| (name == CLIENT_SECRET_ENV).then(|| "from-conventional-env".to_owned());
        let secret = resolve_client_secret_with(&profile, env).unwrap();
        assert_eq!(secret.expose_secret(), "from-conventional-env");

        let secret = resolve_client_secret_with(&profile, no_env).unwrap();
        assert_eq!(secret.expose_secret(), "plain");

        profile.client_secret = None;
        assert!(resolve_client_secret_with(&profile, no_env).is_none());
    }

    #[test]
    fn incomplete_profile_reports_every_missing_field() {
        let profile = Profile {
            gateway_url: Some("https://gw.example.com".into()),
            client_id: Some("client-id".into()),
            ..Profile::default()
        };
        let err = profile_to_service_config_with(&profile, "default", &Defaults::default(), no_env)
            .unwrap_err();
        match err {
            ConfigError::Incomplete { profile, missing } => {
                assert_eq!(profile, "default");
                assert_eq!(
                    missing,
                    vec![
                        "enterprise_id",
                        "hotel_id",
                        "app_key",
                        "scope",
                        "client_secret"
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn complete_profile_translates_with_defaults() {
        let config =
            profile_to_service_config_with(&complete_profile(), "default", &Defaults::default(), no_env)
                .unwrap();
        assert_eq!(config.gateway_url, "https://gw.example.com");
        assert_eq!(config.hotel_id, "HOTEL1");
        assert_eq!(config.credentials.enterprise_id, "ENT1");
        assert_eq!(config.credentials.client_secret.expose_secret(), "plain");
        assert_eq!(config.transport.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.transport.request_timeout, Duration::from_secs(15));
        assert_eq!(config.availability_limit, 50);
        assert_eq!(config.default_rate_plan, "AIF-2025");
        assert_eq!(config.reservation_defaults, ReservationDefaults::default());
    }

    #[test]
    fn profile_overrides_apply() {
        let mut profile = complete_profile();
        profile.request_timeout = Some(30);
        profile.currency = Some("MXN".into());
        profile.guarantee_code = Some("CC".into());
        profile.availability_limit = Some(10);
        profile.default_rate_plan = Some("BI-2025".into());
        profile.ca_cert = Some(PathBuf::from("/etc/pms/ca.pem"));

        let config =
            profile_to_service_config_with(&profile, "default", &Defaults::default(), no_env).unwrap();
        assert_eq!(config.transport.request_timeout, Duration::from_secs(30));
        assert_eq!(config.reservation_defaults.currency_code, "MXN");
        assert_eq!(config.reservation_defaults.guarantee_code, "CC");
        assert_eq!(config.reservation_defaults.market_code, "INTERNET");
        assert_eq!(config.availability_limit, 10);
        assert_eq!(config.default_rate_plan, "BI-2025");
        assert!(matches!(config.transport.tls, TlsMode::CustomCa(ref p) if p.ends_with("ca.pem")));
    }

    #[test]
    fn non_http_gateway_is_rejected() {
        let mut profile = complete_profile();
        profile.gateway_url = Some("gw.example.com".into());
        let err = profile_to_service_config_with(&profile, "default", &Defaults::default(), no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "gateway_url"));
    }

    #[test]
    fn config_file_loads_profiles() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
default_profile = "resort"

[defaults]
output = "json"

[profiles.resort]
gateway_url = "https://gw.example.com"
hotel_id = "HOTEL1"
client_secret_env = "RESORT_SECRET"
"#
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.request_timeout, 15);

        let (name, profile) = config.profile(None).unwrap();
        assert_eq!(name, "resort");
        assert_eq!(profile.hotel_id.as_deref(), Some("HOTEL1"));
        assert!(matches!(
            config.profile(Some("staging")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn catalog_defaults_to_builtin_and_loads_files() {
        let builtin = load_catalog(None).unwrap();
        assert!(builtin.room_type("2BMS").is_some());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(r##"
[room_types.PH]
name = { en = "Penthouse", es = "Penthouse" }
bedrooms = 3
max_adults = 6
max_children = 2
view = "ocean"
sort_order = 1

[rate_plans.RO]
package = "basic"
label = { en = "Room Only", es = "Solo Habitación" }
sort_order = 1

[package_types.basic]
label = { en = "Basic", es = "Básico" }
color = "#2babd9"

[views.ocean]
en = "Ocean View"
es = "Vista al Mar"
"##.as_bytes())
        .unwrap();

        let profile = Profile {
            catalog: Some(file.path().to_path_buf()),
            ..Profile::default()
        };
        let catalog = load_catalog(Some(&profile)).unwrap();
        assert_eq!(catalog.room_types.len(), 1);
        assert!(catalog.rate_plan("RO").is_some());

        let missing = Profile {
            catalog: Some(PathBuf::from("/nonexistent/catalog.toml")),
            ..Profile::default()
        };
        assert!(matches!(
            load_catalog(Some(&missing)),
            Err(ConfigError::CatalogFile { .. })
        ));
    }
}
