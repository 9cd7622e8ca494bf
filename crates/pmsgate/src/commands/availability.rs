//! Availability search handler.

use tabled::Tabled;

use pmsgate_core::{
    AvailabilityOutcome, AvailabilitySearch, BookingService, EnrichedRate, EnrichedRoom, Language,
};

use crate::cli::{AvailabilityArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

/// One row per room and rate plan.
#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "View")]
    view: String,
    #[tabled(rename = "Rate Plan")]
    rate_plan: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Before Tax")]
    before_tax: String,
    #[tabled(rename = "After Tax")]
    after_tax: String,
    #[tabled(rename = "Currency")]
    currency: String,
}

impl RateRow {
    fn new(room: &EnrichedRoom, rate: Option<&EnrichedRate>, lang: Language) -> Self {
        Self {
            room: room.room_type_code.clone(),
            name: room.room_name.get(lang).to_owned(),
            view: room.view_label.get(lang).to_owned(),
            rate_plan: rate.map(|r| r.rate_plan_code.clone()).unwrap_or_else(|| "-".into()),
            package: rate
                .map(|r| r.package_label.get(lang).to_owned())
                .unwrap_or_default(),
            before_tax: rate
                .map(|r| format!("{:.2}", r.amount_before_tax))
                .unwrap_or_default(),
            after_tax: rate
                .map(|r| format!("{:.2}", r.amount_after_tax))
                .unwrap_or_default(),
            currency: rate.map(|r| r.currency_code.clone()).unwrap_or_default(),
        }
    }
}

fn rows(rooms: &[EnrichedRoom], lang: Language) -> Vec<RateRow> {
    let mut rows = Vec::new();
    for room in rooms {
        if room.rates.is_empty() {
            rows.push(RateRow::new(room, None, lang));
        }
        rows.extend(room.rates.iter().map(|rate| RateRow::new(room, Some(rate), lang)));
    }
    rows
}

fn summary(outcome: &AvailabilityOutcome) -> String {
    format!(
        "{} to {} ({} night{}), {} of {} room type(s) available",
        outcome.check_in,
        outcome.check_out,
        outcome.nights,
        if outcome.nights == 1 { "" } else { "s" },
        outcome.available_rooms().count(),
        outcome.rooms.len(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    service: &BookingService,
    args: AvailabilityArgs,
    language: Language,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let search = AvailabilitySearch {
        check_in: args.check_in,
        check_out: args.check_out,
        adults: args.adults,
        children: args.children,
        rate_plan_code: args.rate_plan,
        promo_code: args.promo,
        language,
    };

    let mut outcome = service.check_availability(&search).await?;
    output::print_diagnostics(&outcome.diagnostics, global.quiet, global.color);
    let headline = summary(&outcome);
    if !args.all {
        outcome.rooms.retain(|room| room.available);
    }

    let out = match global.output {
        OutputFormat::Table => {
            let painted = output::should_color(global.color, &std::io::stdout());
            if outcome.rooms.is_empty() {
                output::paint_muted(&headline, painted)
            } else {
                let table = output::render_table(&rows(&outcome.rooms, language));
                format!("{}\n{table}", output::paint_ok(&headline, painted))
            }
        }
        OutputFormat::Plain => outcome
            .rooms
            .iter()
            .map(|room| room.room_type_code.clone())
            .collect::<Vec<_>>()
            .join("\n"),
        structured => output::render_single(structured, &outcome, |_| String::new(), |_| {
            String::new()
        })?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
