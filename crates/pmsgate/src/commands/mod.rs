//! Command handlers.

pub mod availability;
pub mod catalog;
pub mod config_cmd;
pub mod guarantee_codes;
pub mod lookup;
pub mod reserve;
pub mod token;

use pmsgate_config::Config;
use pmsgate_core::BookingService;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a command that talks to the gateway.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let (service_config, catalog) = config::resolve_service(global, cfg)?;
    let service = BookingService::new(service_config, catalog)?;

    match cmd {
        Command::Availability(args) => {
            let language = config::resolve_language(global, cfg)?;
            availability::handle(&service, args, language, global).await
        }
        Command::Reserve(args) => reserve::handle(&service, args, global).await,
        Command::Lookup(args) => lookup::handle(&service, args, global).await,
        Command::Token => token::handle(&service, global).await,
        Command::GuaranteeCodes => guarantee_codes::handle(&service, global).await,
        Command::Catalog(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
