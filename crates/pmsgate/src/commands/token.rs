//! Token status handler.

use pmsgate_core::{BookingService, TokenStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(status: &TokenStatus, hotel: &str) -> String {
    let remaining = status
        .remaining
        .map_or_else(|| "-".into(), |d| format!("{}s", d.as_secs()));
    format!(
        "{:<16} {hotel}\n{:<16} {remaining}\n{:<16} {}",
        "Hotel", "Expires In", "Refresh Due", status.refresh_due
    )
}

pub async fn handle(service: &BookingService, global: &GlobalOpts) -> Result<(), CliError> {
    let status = service.authenticate().await?;
    let out = output::render_single(
        global.output,
        &status,
        |s| detail(s, service.hotel_id()),
        |s| s.remaining.map(|d| d.as_secs().to_string()).unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn detail_never_shows_the_token() {
        let status = TokenStatus {
            remaining: Some(Duration::from_secs(3599)),
            refresh_due: false,
        };
        let text = detail(&status, "HOTEL1");
        assert!(text.contains("3599s"));
        assert!(text.contains("HOTEL1"));
        assert!(text.contains("false"));
    }
}
