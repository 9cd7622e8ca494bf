//! Guarantee-code configuration handler.

use pmsgate_core::BookingService;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::lookup::render_raw;

pub async fn handle(service: &BookingService, global: &GlobalOpts) -> Result<(), CliError> {
    let codes = service.guarantee_codes().await?;
    let out = render_raw(global, &codes)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
