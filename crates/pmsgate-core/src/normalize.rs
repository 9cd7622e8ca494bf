// ── Availability normalization ──
//
// The only place that knows upstream availability field names. Every known
// response shape is a variant of `AvailabilityShape`; each reduces to the
// same `RawRoomRate` records. A new upstream revision is a new variant here,
// never a branch inside enrichment.

use serde::Deserialize;
use serde_json::Value;

use pmsgate_api::pms_types::{AmountBlock, AvailabilityDocument, FlatRoomRate, RoomStay};

use crate::error::CoreError;
use crate::model::{Diagnostic, RawRoomRate};

/// Dates used when an upstream rate omits its own `start`/`end`.
#[derive(Debug, Clone, Copy)]
pub struct StayWindow<'a> {
    pub start: &'a str,
    pub end: &'a str,
}

/// Known upstream availability shapes.
#[derive(Debug, Clone)]
pub enum AvailabilityShape {
    /// `roomStays[].roomRates[]`, each record carrying `roomType`,
    /// `ratePlanCode` and a single `total` block.
    FlatRoomRates(Vec<FlatRoomRate>),
    /// `roomStays[]` grouped by `roomType.roomTypeCode`, each with
    /// `ratePlans[].rates[]`.
    NestedRatePlans(Vec<RoomStay>),
}

impl AvailabilityShape {
    /// Classify a decoded document. A `roomRates` key on any room stay
    /// selects the flat shape.
    pub fn detect(document: AvailabilityDocument) -> Self {
        let stays = select_room_stays(document);
        if stays.iter().any(|stay| stay.room_rates.is_some()) {
            Self::FlatRoomRates(
                stays
                    .into_iter()
                    .flat_map(|stay| stay.room_rates.unwrap_or_default())
                    .collect(),
            )
        } else {
            Self::NestedRatePlans(stays)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlatRoomRates(_) => "flat",
            Self::NestedRatePlans(_) => "nested",
        }
    }
}

/// Normalizer output: canonical rates plus anything dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    /// Detected upstream shape; `None` for an empty body.
    pub shape: Option<&'static str>,
    pub rates: Vec<RawRoomRate>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode a raw availability document and reduce it to `RawRoomRate`s.
///
/// `null` (an empty upstream body) is an empty result. A body that is not
/// an availability document at all is a protocol error.
pub fn normalize(raw: &Value, window: StayWindow<'_>) -> Result<Normalized, CoreError> {
    if raw.is_null() {
        return Ok(Normalized::default());
    }
    let document = AvailabilityDocument::deserialize(raw).map_err(|e| CoreError::Protocol {
        message: format!("availability response has an unexpected shape: {e}"),
        body: raw.to_string(),
    })?;
    Ok(normalize_shape(AvailabilityShape::detect(document), window))
}

/// Reduce an already classified shape.
pub fn normalize_shape(shape: AvailabilityShape, window: StayWindow<'_>) -> Normalized {
    let mut out = Normalized {
        shape: Some(shape.name()),
        ..Normalized::default()
    };
    match shape {
        AvailabilityShape::FlatRoomRates(records) => {
            for record in records {
                flat_record(record, window, &mut out);
            }
        }
        AvailabilityShape::NestedRatePlans(stays) => {
            for stay in stays {
                nested_stay(stay, window, &mut out);
            }
        }
    }
    out
}

// ── Shapes ───────────────────────────────────────────────────────────

fn select_room_stays(document: AvailabilityDocument) -> Vec<RoomStay> {
    document
        .hotel_availability
        .into_iter()
        .next()
        .map(|hotel| hotel.room_stays)
        .filter(|stays| !stays.is_empty())
        .unwrap_or(document.room_stays)
}

fn flat_record(record: FlatRoomRate, window: StayWindow<'_>, out: &mut Normalized) {
    let Some(room_type_code) = non_empty(record.room_type) else {
        out.drop_rate("room rate without roomType".to_owned());
        return;
    };
    let Some(rate_plan_code) = non_empty(record.rate_plan_code) else {
        out.drop_rate(format!("room rate for {room_type_code} without ratePlanCode"));
        return;
    };
    let Some(amounts) = Amounts::resolve(record.total.as_ref(), None) else {
        out.drop_rate(format!(
            "room rate {room_type_code}/{rate_plan_code} has no amount"
        ));
        return;
    };

    out.rates.push(RawRoomRate {
        room_type_code,
        rate_plan_code,
        amount_before_tax: amounts.before_tax,
        amount_after_tax: amounts.after_tax,
        currency_code: amounts.currency_code,
        start: record.start.unwrap_or_else(|| window.start.to_owned()),
        end: record.end.unwrap_or_else(|| window.end.to_owned()),
    });
}

fn nested_stay(stay: RoomStay, window: StayWindow<'_>, out: &mut Normalized) {
    let Some(room_type_code) = stay
        .room_type
        .as_ref()
        .and_then(|r| r.code())
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
    else {
        let dropped: usize = stay.rate_plans.iter().map(|p| p.rates.len()).sum();
        out.drop_rate(format!(
            "room stay without roomType.roomTypeCode ({dropped} rate(s))"
        ));
        return;
    };

    let stay_start = stay.arrival_date.as_deref().unwrap_or(window.start);
    let stay_end = stay.departure_date.as_deref().unwrap_or(window.end);

    for plan in stay.rate_plans {
        let Some(rate_plan_code) = non_empty(plan.rate_plan_code) else {
            out.drop_rate(format!("rate plan for {room_type_code} without ratePlanCode"));
            continue;
        };
        for rate in plan.rates {
            let Some(amounts) = Amounts::resolve(rate.total.as_ref(), rate.base.as_ref()) else {
                out.drop_rate(format!(
                    "rate {room_type_code}/{rate_plan_code} has no amount"
                ));
                continue;
            };
            out.rates.push(RawRoomRate {
                room_type_code: room_type_code.clone(),
                rate_plan_code: rate_plan_code.clone(),
                amount_before_tax: amounts.before_tax,
                amount_after_tax: amounts.after_tax,
                currency_code: amounts.currency_code,
                start: rate.start.unwrap_or_else(|| stay_start.to_owned()),
                end: rate.end.unwrap_or_else(|| stay_end.to_owned()),
            });
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

impl Normalized {
    fn drop_rate(&mut self, reason: String) {
        self.diagnostics.push(Diagnostic::RateDropped { reason });
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

struct Amounts {
    before_tax: f64,
    after_tax: Option<f64>,
    currency_code: Option<String>,
}

impl Amounts {
    /// Pre-tax from `primary`, then `fallback`, then the after-tax amount.
    /// `None` when no amount exists at all.
    fn resolve(primary: Option<&AmountBlock>, fallback: Option<&AmountBlock>) -> Option<Self> {
        let pick = |get: fn(&AmountBlock) -> Option<f64>| {
            primary.and_then(get).or_else(|| fallback.and_then(get))
        };
        let after_tax = pick(|b| b.amount_after_tax);
        let before_tax = pick(|b| b.amount_before_tax).or(after_tax)?;
        let currency_code = primary
            .and_then(|b| b.currency_code.clone())
            .or_else(|| fallback.and_then(|b| b.currency_code.clone()));
        Some(Self {
            before_tax,
            after_tax,
            currency_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const WINDOW: StayWindow<'static> = StayWindow {
        start: "2025-06-01",
        end: "2025-06-05",
    };

    fn flat_response() -> Value {
        json!({
            "hotelAvailability": [{
                "hotelId": "HOTEL1",
                "roomStays": [
                    {
                        "roomRates": [
                            {
                                "roomType": "1BBFG",
                                "ratePlanCode": "AIF-2025",
                                "total": { "amountBeforeTax": 500, "amountAfterTax": 560, "currencyCode": "USD" },
                                "start": "2025-06-01",
                                "end": "2025-06-05"
                            },
                            {
                                "roomType": "1BBFG",
                                "ratePlanCode": "BI-2025",
                                "total": { "amountBeforeTax": 300, "currencyCode": "USD" },
                                "start": "2025-06-01",
                                "end": "2025-06-05"
                            }
                        ]
                    },
                    {
                        "roomRates": [{
                            "roomType": "2BMS",
                            "ratePlanCode": "ALLINCPREM",
                            "total": { "amountBeforeTax": "900.50", "amountAfterTax": "1000.25", "currencyCode": "USD" },
                            "start": "2025-06-01",
                            "end": "2025-06-05"
                        }]
                    }
                ]
            }]
        })
    }

    fn nested_response() -> Value {
        json!({
            "hotelAvailability": [{
                "roomStays": [
                    {
                        "roomType": { "roomTypeCode": "1BBFG" },
                        "ratePlans": [
                            {
                                "ratePlanCode": "AIF-2025",
                                "rates": [{
                                    "total": { "amountBeforeTax": 500, "amountAfterTax": 560, "currencyCode": "USD" },
                                    "start": "2025-06-01",
                                    "end": "2025-06-05"
                                }]
                            },
                            {
                                "ratePlanCode": "BI-2025",
                                "rates": [{
                                    "base": { "amountBeforeTax": 300, "currencyCode": "USD" },
                                    "start": "2025-06-01",
                                    "end": "2025-06-05"
                                }]
                            }
                        ]
                    },
                    {
                        "roomType": { "roomTypeCode": "2BMS" },
                        "ratePlans": [{
                            "ratePlanCode": "ALLINCPREM",
                            "rates": [{
                                "total": { "amountBeforeTax": 900.5, "amountAfterTax": 1000.25, "currencyCode": "USD" }
                            }]
                        }]
                    }
                ]
            }]
        })
    }

    fn rate(room: &str, plan: &str, before: f64, after: Option<f64>) -> RawRoomRate {
        RawRoomRate {
            room_type_code: room.into(),
            rate_plan_code: plan.into(),
            amount_before_tax: before,
            amount_after_tax: after,
            currency_code: Some("USD".into()),
            start: "2025-06-01".into(),
            end: "2025-06-05".into(),
        }
    }

    #[test]
    fn flat_shape_is_detected_and_flattened() {
        let normalized = normalize(&flat_response(), WINDOW).unwrap();
        assert_eq!(
            normalized.rates,
            vec![
                rate("1BBFG", "AIF-2025", 500.0, Some(560.0)),
                rate("1BBFG", "BI-2025", 300.0, None),
                rate("2BMS", "ALLINCPREM", 900.5, Some(1000.25)),
            ]
        );
        assert!(normalized.diagnostics.is_empty());
    }

    #[test]
    fn nested_shape_emits_one_record_per_rate_entry() {
        let doc: AvailabilityDocument = serde_json::from_value(nested_response()).unwrap();
        let shape = AvailabilityShape::detect(doc);
        assert_eq!(shape.name(), "nested");

        let normalized = normalize_shape(shape, WINDOW);
        assert_eq!(normalized.rates.len(), 3);
        // Missing start/end fall back to the stay window.
        assert_eq!(normalized.rates[2].start, "2025-06-01");
        assert_eq!(normalized.rates[2].end, "2025-06-05");
    }

    #[test]
    fn both_shapes_normalize_to_the_same_records() {
        let flat = normalize(&flat_response(), WINDOW).unwrap();
        let nested = normalize(&nested_response(), WINDOW).unwrap();
        assert_eq!(flat.shape, Some("flat"));
        assert_eq!(nested.shape, Some("nested"));
        assert_eq!(flat.rates, nested.rates);
        assert_eq!(flat.diagnostics, nested.diagnostics);
    }

    #[test]
    fn top_level_room_stays_are_accepted() {
        let raw = json!({
            "roomStays": [{
                "roomType": { "roomTypeCode": "1BT" },
                "ratePlans": [{ "ratePlanCode": "AIF", "rates": [{ "total": { "amountAfterTax": 410 } }] }]
            }]
        });
        let normalized = normalize(&raw, WINDOW).unwrap();
        assert_eq!(normalized.rates.len(), 1);
        // Pre-tax falls back to the after-tax amount when absent.
        assert_eq!(normalized.rates[0].amount_before_tax, 410.0);
        assert_eq!(normalized.rates[0].amount_after_tax, Some(410.0));
        assert_eq!(normalized.rates[0].currency_code, None);
    }

    #[test]
    fn rates_without_amounts_or_codes_are_dropped_with_diagnostics() {
        let raw = json!({
            "hotelAvailability": [{
                "roomStays": [
                    {
                        "roomType": { "roomTypeCode": "1BT" },
                        "ratePlans": [
                            { "ratePlanCode": "AIF", "rates": [{ "total": {} }, { "total": { "amountBeforeTax": 200 } }] },
                            { "rates": [{ "total": { "amountBeforeTax": 100 } }] }
                        ]
                    },
                    { "ratePlans": [{ "ratePlanCode": "AIF", "rates": [{}, {}] }] }
                ]
            }]
        });
        let normalized = normalize(&raw, WINDOW).unwrap();
        assert_eq!(normalized.rates.len(), 1);
        assert_eq!(normalized.rates[0].amount_before_tax, 200.0);
        assert_eq!(normalized.diagnostics.len(), 3);
        assert!(
            normalized
                .diagnostics
                .iter()
                .all(|d| matches!(d, Diagnostic::RateDropped { .. }))
        );
    }

    #[test]
    fn empty_and_null_documents_yield_nothing() {
        assert_eq!(normalize(&Value::Null, WINDOW).unwrap(), Normalized::default());
        let empty = normalize(&json!({ "hotelAvailability": [] }), WINDOW).unwrap();
        assert!(empty.rates.is_empty());
        assert!(empty.diagnostics.is_empty());
    }

    #[test]
    fn non_document_is_protocol_error() {
        let err = normalize(&json!(["not", "an", "object"]), WINDOW).unwrap_err();
        assert!(matches!(err, CoreError::Protocol { .. }));
    }
}
