//! CLI-side configuration: profile selection and flag overrides on top of
//! `pmsgate-config`.

use std::sync::Arc;

use pmsgate_config::{Config, Profile};
use pmsgate_core::{ConfigCatalog, Language, ServiceConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use pmsgate_config::{config_path, load_config};

/// Determine the active profile name: `--profile`, then the config's
/// default, then "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile with `--gateway`, `--hotel`, `--catalog` and timeout
/// flags applied. Without a stored profile, a `--gateway` flag starts an
/// empty one so the remaining fields can come from the environment.
pub fn effective_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.gateway.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(cfg),
                name,
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(gateway) = &global.gateway {
        profile.gateway_url = Some(gateway.clone());
    }
    if let Some(hotel) = &global.hotel {
        profile.hotel_id = Some(hotel.clone());
    }
    if let Some(catalog) = &global.catalog {
        profile.catalog = Some(catalog.clone());
    }
    if let Some(secs) = global.connect_timeout {
        profile.connect_timeout = Some(secs);
    }
    if let Some(secs) = global.timeout {
        profile.request_timeout = Some(secs);
    }
    Ok((name, profile))
}

/// Build the `ServiceConfig` and catalog for commands that talk to the gateway.
pub fn resolve_service(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(ServiceConfig, Arc<ConfigCatalog>), CliError> {
    let (name, profile) = effective_profile(global, cfg)?;
    let service = pmsgate_config::profile_to_service_config(&profile, &name, &cfg.defaults)?;
    let catalog = pmsgate_config::load_catalog(Some(&profile))?;
    tracing::debug!(profile = %name, gateway = %service.gateway_url, "resolved profile");
    Ok((service, Arc::new(catalog)))
}

/// Catalog for offline commands: `--catalog`, then the active profile's
/// catalog file when one exists, then the built-in catalog.
pub fn resolve_catalog(global: &GlobalOpts, cfg: &Config) -> Result<ConfigCatalog, CliError> {
    let name = active_profile_name(global, cfg);
    let mut profile = cfg.profiles.get(&name).cloned().unwrap_or_default();
    if let Some(catalog) = &global.catalog {
        profile.catalog = Some(catalog.clone());
    }
    Ok(pmsgate_config::load_catalog(Some(&profile))?)
}

/// Label language: `--language`, then the config default.
pub fn resolve_language(global: &GlobalOpts, cfg: &Config) -> Result<Language, CliError> {
    if let Some(language) = global.language {
        return Ok(language);
    }
    cfg.defaults
        .language
        .parse()
        .map_err(|_| CliError::Config {
            message: format!(
                "defaults.language must be 'en' or 'es', got '{}'",
                cfg.defaults.language
            ),
        })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
