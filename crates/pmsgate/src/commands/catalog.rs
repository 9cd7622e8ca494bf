//! Offline catalog inspection. Never contacts the gateway.

use serde::Serialize;
use tabled::Tabled;

use pmsgate_config::Config;
use pmsgate_core::{ConfigCatalog, Language, RatePlanConfig, RoomTypeConfig};

use crate::cli::{CatalogArgs, CatalogCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Entries ─────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomEntry<'a> {
    code: &'a str,
    #[serde(flatten)]
    room: &'a RoomTypeConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RatePlanEntry<'a> {
    code: &'a str,
    #[serde(flatten)]
    plan: &'a RatePlanConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogSummary {
    room_types: usize,
    rate_plans: usize,
    package_types: usize,
    amenities: usize,
    views: usize,
}

fn room_entries(catalog: &ConfigCatalog) -> Vec<RoomEntry<'_>> {
    let mut entries: Vec<_> = catalog
        .room_types
        .iter()
        .map(|(code, room)| RoomEntry { code, room })
        .collect();
    entries.sort_by_key(|e| e.room.sort_order);
    entries
}

fn rate_plan_entries(catalog: &ConfigCatalog) -> Vec<RatePlanEntry<'_>> {
    let mut entries: Vec<_> = catalog
        .rate_plans
        .iter()
        .map(|(code, plan)| RatePlanEntry { code, plan })
        .collect();
    entries.sort_by_key(|e| e.plan.sort_order);
    entries
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Bedrooms")]
    bedrooms: u32,
    #[tabled(rename = "Max Adults")]
    max_adults: u32,
    #[tabled(rename = "Max Children")]
    max_children: u32,
    #[tabled(rename = "Beds")]
    beds: String,
    #[tabled(rename = "View")]
    view: String,
}

#[derive(Tabled)]
struct RatePlanRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Includes")]
    includes: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: CatalogArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let catalog = config::resolve_catalog(global, cfg)?;
    let lang = config::resolve_language(global, cfg)?;

    let out = match args.command {
        CatalogCommand::Rooms => {
            let entries = room_entries(&catalog);
            output::render_list(
                global.output,
                &entries,
                |e| RoomRow {
                    code: e.code.to_owned(),
                    name: e.room.name.get(lang).to_owned(),
                    bedrooms: e.room.bedrooms,
                    max_adults: e.room.max_adults,
                    max_children: e.room.max_children,
                    beds: e.room.beds.join(", "),
                    view: catalog.view_label(e.room.view).get(lang).to_owned(),
                },
                |e| e.code.to_owned(),
            )?
        }
        CatalogCommand::RatePlans => {
            let entries = rate_plan_entries(&catalog);
            output::render_list(
                global.output,
                &entries,
                |e| rate_plan_row(&catalog, e, lang),
                |e| e.code.to_owned(),
            )?
        }
        CatalogCommand::Check => {
            let summary = CatalogSummary {
                room_types: catalog.room_types.len(),
                rate_plans: catalog.rate_plans.len(),
                package_types: catalog.package_types.len(),
                amenities: catalog.amenities.len(),
                views: catalog.views.len(),
            };
            output::render_single(
                global.output,
                &summary,
                |s| {
                    format!(
                        "Catalog OK: {} room types, {} rate plans, {} package types",
                        s.room_types, s.rate_plans, s.package_types
                    )
                },
                |_| "ok".into(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn rate_plan_row(
    catalog: &ConfigCatalog,
    entry: &RatePlanEntry<'_>,
    lang: Language,
) -> RatePlanRow {
    let package = catalog
        .package_type(entry.plan.package)
        .map_or_else(|| entry.plan.package.to_string(), |p| p.label.get(lang).to_owned());
    RatePlanRow {
        code: entry.code.to_owned(),
        label: entry.plan.label.get(lang).to_owned(),
        package,
        includes: entry
            .plan
            .includes
            .iter()
            .map(|code| catalog.amenity_label(code, lang))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
