// ── Catalog enrichment ──
//
// Joins normalized rates against the catalog. Pure: no I/O, no shared
// state, identical inputs give identical output. Codes missing from the
// catalog are dropped and reported, never defaulted.

use indexmap::IndexMap;

use crate::catalog::ConfigCatalog;
use crate::model::{ConfigMismatch, Diagnostic, EnrichedRate, EnrichedRoom, Language, RawRoomRate};

/// Enricher output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enriched {
    /// Sorted ascending by catalog sort order.
    pub rooms: Vec<EnrichedRoom>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Joins raw rates with one catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityEnricher<'a> {
    catalog: &'a ConfigCatalog,
    default_currency: &'a str,
}

impl<'a> AvailabilityEnricher<'a> {
    /// `default_currency` applies to rates whose upstream record had none.
    pub fn new(catalog: &'a ConfigCatalog, default_currency: &'a str) -> Self {
        Self {
            catalog,
            default_currency,
        }
    }

    pub fn enrich(&self, raw_rates: &[RawRoomRate], language: Language) -> Enriched {
        let mut diagnostics = Vec::new();

        // Group by room type, keeping first-occurrence order.
        let mut groups: IndexMap<&str, Vec<&RawRoomRate>> = IndexMap::new();
        for rate in raw_rates {
            groups.entry(rate.room_type_code.as_str()).or_default().push(rate);
        }

        let mut rooms = Vec::with_capacity(groups.len());
        for (room_type_code, rates) in groups {
            let Some(room) = self.catalog.room_type(room_type_code) else {
                diagnostics.push(
                    ConfigMismatch::RoomTypeUnmapped {
                        room_type_code: room_type_code.to_owned(),
                        dropped_rates: rates.len(),
                    }
                    .into(),
                );
                continue;
            };

            let mut enriched: Vec<EnrichedRate> = rates
                .into_iter()
                .filter_map(|rate| self.enrich_rate(rate, language, &mut diagnostics))
                .collect();
            enriched.sort_by(|a, b| a.amount_after_tax.total_cmp(&b.amount_after_tax));

            rooms.push(EnrichedRoom {
                room_type_code: room_type_code.to_owned(),
                room_name: room.name.clone(),
                bedrooms: room.bedrooms,
                max_adults: room.max_adults,
                max_children: room.max_children,
                beds: room.beds.clone(),
                location: room.location.clone(),
                view: room.view,
                view_label: self.catalog.view_label(room.view),
                available: !enriched.is_empty(),
                rates: enriched,
                sort_order: room.sort_order,
            });
        }

        rooms.sort_by_key(|room| room.sort_order);

        Enriched { rooms, diagnostics }
    }

    fn enrich_rate(
        &self,
        rate: &RawRoomRate,
        language: Language,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<EnrichedRate> {
        let Some(plan) = self.catalog.rate_plan(&rate.rate_plan_code) else {
            diagnostics.push(
                ConfigMismatch::RatePlanUnmapped {
                    room_type_code: rate.room_type_code.clone(),
                    rate_plan_code: rate.rate_plan_code.clone(),
                }
                .into(),
            );
            return None;
        };
        let Some(package) = self.catalog.package_type(plan.package) else {
            diagnostics.push(
                ConfigMismatch::PackageTypeUnmapped {
                    rate_plan_code: rate.rate_plan_code.clone(),
                    package: plan.package.to_string(),
                }
                .into(),
            );
            return None;
        };

        let includes_labels = plan
            .includes
            .iter()
            .map(|code| self.catalog.amenity_label(code, language).to_owned())
            .collect();

        Some(EnrichedRate {
            rate_plan_code: rate.rate_plan_code.clone(),
            rate_plan_name: plan.label.clone(),
            package: plan.package,
            package_label: package.label.clone(),
            package_color: package.color.clone(),
            includes: plan.includes.clone(),
            includes_labels,
            amount_before_tax: rate.amount_before_tax,
            amount_after_tax: rate.amount_after_tax.unwrap_or(rate.amount_before_tax),
            currency_code: rate
                .currency_code
                .clone()
                .unwrap_or_else(|| self.default_currency.to_owned()),
            start: rate.start.clone(),
            end: rate.end.clone(),
            sort_order: plan.sort_order,
        })
    }
}
