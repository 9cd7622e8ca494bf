//! Reservation lookup handler.

use serde_json::Value;

use pmsgate_core::{BookingService, ReservationLookup};

use crate::cli::{GlobalOpts, LookupArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    service: &BookingService,
    args: LookupArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (lookup, resource_type) = if args.confirmation {
        (
            ReservationLookup::ByConfirmationNumber(args.identifier.clone()),
            "Confirmation number",
        )
    } else {
        (ReservationLookup::ById(args.identifier.clone()), "Reservation")
    };

    let record = service.lookup_reservation(&lookup).await.map_err(|e| {
        if e.is_not_found() {
            CliError::NotFound {
                resource_type: resource_type.into(),
                identifier: args.identifier.clone(),
            }
        } else {
            e.into()
        }
    })?;

    let out = render_raw(global, &record)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Raw upstream documents have no stable shape, so the table view is
/// pretty JSON and plain is compact JSON.
pub(super) fn render_raw(global: &GlobalOpts, record: &Value) -> Result<String, CliError> {
    output::render_single(
        global.output,
        record,
        |v| output::render_json_pretty(v).unwrap_or_default(),
        |v| output::render_json_compact(v).unwrap_or_default(),
    )
}
