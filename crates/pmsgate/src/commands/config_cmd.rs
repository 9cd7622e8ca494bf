//! Config subcommand handlers. Work without a reachable gateway.

use pmsgate_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

/// Copy of `cfg` safe to print: plaintext secrets are masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.client_secret.is_some() {
            profile.client_secret = Some(REDACTED.into());
        }
    }
    cfg
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let out = match args.command {
        ConfigCommand::Path => config::config_path().display().to_string(),

        ConfigCommand::Show => {
            let safe = redacted(cfg);
            output::render_single(
                global.output,
                &safe,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |c| c.profiles.keys().cloned().collect::<Vec<_>>().join("\n"),
            )?
        }

        ConfigCommand::Profiles => {
            let active = config::active_profile_name(global, cfg);
            let names: Vec<String> = cfg.profiles.keys().cloned().collect();
            output::render_single(
                global.output,
                &names,
                |names| {
                    names
                        .iter()
                        .map(|n| {
                            let marker = if *n == active { "*" } else { " " };
                            format!("{marker} {n}")
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                },
                |names| names.join("\n"),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use pmsgate_config::Profile;

    use super::*;

    #[test]
    fn plaintext_secret_is_masked() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "resort".into(),
            Profile {
                client_secret: Some("hunter2".into()),
                client_secret_env: Some("RESORT_SECRET".into()),
                ..Profile::default()
            },
        );
        let safe = redacted(&cfg);
        let profile = &safe.profiles["resort"];
        assert_eq!(profile.client_secret.as_deref(), Some(REDACTED));
        assert_eq!(profile.client_secret_env.as_deref(), Some("RESORT_SECRET"));
    }
}
