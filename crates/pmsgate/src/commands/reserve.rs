//! Reservation creation handler.

use std::io::Read;
use std::path::Path;

use pmsgate_core::{BookingService, GuestContact, ReservationConfirmation, ReservationIntent};

use crate::cli::{GlobalOpts, ReserveArgs};
use crate::error::CliError;
use crate::output;

/// Build the intent from `--from-file` JSON or from individual flags.
fn intent_from_args(
    args: ReserveArgs,
    default_rate_plan: &str,
) -> Result<ReservationIntent, CliError> {
    if let Some(path) = &args.from_file {
        return read_intent(path);
    }

    let required = |field: &str, value: Option<String>| {
        value.ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: "required without --from-file".into(),
        })
    };

    Ok(ReservationIntent {
        check_in: required("check-in", args.check_in)?,
        check_out: required("check-out", args.check_out)?,
        room_type_code: required("room-type", args.room_type)?,
        rate_plan_code: args
            .rate_plan
            .unwrap_or_else(|| default_rate_plan.to_owned()),
        adults: args.adults,
        children: args.children,
        guest: GuestContact {
            first_name: required("first-name", args.first_name)?,
            last_name: required("last-name", args.last_name)?,
            email: required("email", args.email)?,
            phone: args.phone.unwrap_or_default(),
        },
        amount_before_tax: args.amount.ok_or_else(|| CliError::Validation {
            field: "amount".into(),
            reason: "required without --from-file".into(),
        })?,
        promo_code: args.promo,
        special_requests: args.special_requests,
    })
}

fn read_intent(path: &Path) -> Result<ReservationIntent, CliError> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Io {
                context: "reading intent from stdin".into(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::Io {
            context: format!("reading {}", path.display()),
            source,
        })?
    };
    Ok(serde_json::from_str(&raw)?)
}

fn detail(confirmation: &ReservationConfirmation) -> String {
    let result = &confirmation.result;
    let key = confirmation.idempotency_key.to_string();
    let lines = [
        ("Reservation ID", result.reservation_id.as_deref().unwrap_or("-")),
        (
            "Confirmation",
            result.confirmation_number.as_deref().unwrap_or("-"),
        ),
        ("Idempotency Key", key.as_str()),
    ]
    .map(|(label, value)| format!("{label:<16} {value}"));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    service: &BookingService,
    args: ReserveArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let idempotency_key = args.idempotency_key;
    let intent = intent_from_args(args, service.default_rate_plan())?;

    let confirmation = service.create_reservation(&intent, idempotency_key).await?;
    output::print_diagnostics(&confirmation.diagnostics, global.quiet, global.color);

    let out = output::render_single(global.output, &confirmation, detail, |c| {
        c.result
            .confirmation_number
            .clone()
            .or_else(|| c.result.reservation_id.clone())
            .unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
