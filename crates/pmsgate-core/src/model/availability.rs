// ── Availability domain types ──
//
// `RawRoomRate` is the single shape every upstream availability response
// is reduced to. `EnrichedRoom`/`EnrichedRate` are what the booking
// application consumes.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Display language for resolved labels.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    En,
    Es,
}

/// English/Spanish text pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub en: String,
    pub es: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: es.into(),
        }
    }

    /// Text in `lang`, falling back to the other language when empty.
    pub fn get(&self, lang: Language) -> &str {
        let (primary, secondary) = match lang {
            Language::En => (&self.en, &self.es),
            Language::Es => (&self.es, &self.en),
        };
        if primary.is_empty() { secondary } else { primary }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum View {
    Ocean,
    Garden,
    Pool,
}

/// Rate-plan package classification.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PackageKind {
    Premium,
    Family,
    Basic,
    Promo,
}

// ── Search ───────────────────────────────────────────────────────────

/// Availability request from the booking application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySearch {
    /// `YYYY-MM-DD`
    pub check_in: String,
    /// `YYYY-MM-DD`
    pub check_out: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_plan_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub language: Language,
}

// ── Normalized ───────────────────────────────────────────────────────

/// One room/rate-plan price, independent of the upstream response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoomRate {
    pub room_type_code: String,
    pub rate_plan_code: String,
    pub amount_before_tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_after_tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    pub start: String,
    pub end: String,
}

// ── Enriched ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRate {
    pub rate_plan_code: String,
    pub rate_plan_name: Bilingual,
    pub package: PackageKind,
    pub package_label: Bilingual,
    pub package_color: String,
    /// Amenity codes, in catalog order.
    pub includes: Vec<String>,
    /// Amenity labels in the requested language.
    pub includes_labels: Vec<String>,
    pub amount_before_tax: f64,
    pub amount_after_tax: f64,
    pub currency_code: String,
    pub start: String,
    pub end: String,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRoom {
    pub room_type_code: String,
    pub room_name: Bilingual,
    pub bedrooms: u32,
    pub max_adults: u32,
    pub max_children: u32,
    pub beds: Vec<String>,
    pub location: String,
    pub view: View,
    pub view_label: Bilingual,
    /// Sorted ascending by `amount_after_tax`.
    pub rates: Vec<EnrichedRate>,
    /// True iff at least one rate survived enrichment.
    pub available: bool,
    pub sort_order: u32,
}

impl EnrichedRoom {
    /// Cheapest surviving rate.
    pub fn lowest_rate(&self) -> Option<&EnrichedRate> {
        self.rates.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilingual_falls_back_to_other_language() {
        let text = Bilingual::new("Ocean View", "");
        assert_eq!(text.get(Language::En), "Ocean View");
        assert_eq!(text.get(Language::Es), "Ocean View");
    }

    #[test]
    fn language_parses_case_insensitively() {
        assert_eq!("ES".parse::<Language>().unwrap(), Language::Es);
        assert_eq!(Language::En.to_string(), "en");
    }

    #[test]
    fn raw_rate_serializes_camel_case() {
        let raw = RawRoomRate {
            room_type_code: "1BBFG".into(),
            rate_plan_code: "AIF-2025".into(),
            amount_before_tax: 500.0,
            amount_after_tax: None,
            currency_code: Some("USD".into()),
            start: "2025-06-01".into(),
            end: "2025-06-05".into(),
        };
        let json = serde_json::to_value(&raw).unwrap();
        assert_eq!(json["roomTypeCode"], "1BBFG");
        assert!(json.get("amountAfterTax").is_none());
    }
}
