// ── Static display catalog ──
//
// Maps PMS room-type and rate-plan codes to locally maintained display
// metadata. Loaded and validated once, then shared read-only (`Arc`) for
// the lifetime of the process.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Bilingual, Language, PackageKind, View};

const BUILTIN_CATALOG: &str = include_str!("../catalog/resort.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTypeConfig {
    pub name: Bilingual,
    pub bedrooms: u32,
    pub max_adults: u32,
    pub max_children: u32,
    #[serde(default)]
    pub beds: Vec<String>,
    #[serde(default)]
    pub location: String,
    pub view: View,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePlanConfig {
    pub package: PackageKind,
    pub label: Bilingual,
    /// Amenity codes, in display order.
    #[serde(default)]
    pub includes: Vec<String>,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTypeConfig {
    pub label: Bilingual,
    pub color: String,
}

/// Immutable catalog of room types, rate plans, packages, amenities and views.
///
/// Keys are kept as strings so the catalog round-trips through TOML;
/// [`validate`](Self::validate) checks that package and view keys name
/// known variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigCatalog {
    pub room_types: IndexMap<String, RoomTypeConfig>,
    pub rate_plans: IndexMap<String, RatePlanConfig>,
    pub package_types: IndexMap<String, PackageTypeConfig>,
    #[serde(default)]
    pub amenities: IndexMap<String, Bilingual>,
    #[serde(default)]
    pub views: IndexMap<String, Bilingual>,
}

impl ConfigCatalog {
    /// The resort catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse and validate a TOML catalog.
    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let catalog: Self = toml::from_str(raw).map_err(|e| CoreError::Catalog {
            message: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check cross references. Reports every problem at once.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut problems = Vec::new();

        if self.room_types.is_empty() {
            problems.push("no room types defined".to_owned());
        }
        for key in self.package_types.keys() {
            if PackageKind::from_str(key).is_err() {
                problems.push(format!("unknown package type key {key:?}"));
            }
        }
        for key in self.views.keys() {
            if View::from_str(key).is_err() {
                problems.push(format!("unknown view key {key:?}"));
            }
        }
        for (code, room) in &self.room_types {
            if code.trim().is_empty() {
                problems.push("empty room type code".to_owned());
            }
            if !self.views.contains_key(room.view.as_ref()) {
                problems.push(format!("room type {code}: view {} has no label", room.view));
            }
        }
        for (code, plan) in &self.rate_plans {
            if code.trim().is_empty() {
                problems.push("empty rate plan code".to_owned());
            }
            if !self.package_types.contains_key(plan.package.as_ref()) {
                problems.push(format!(
                    "rate plan {code}: package {} has no package type entry",
                    plan.package
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Catalog {
                message: problems.join("; "),
            })
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn room_type(&self, code: &str) -> Option<&RoomTypeConfig> {
        self.room_types.get(code)
    }

    pub fn rate_plan(&self, code: &str) -> Option<&RatePlanConfig> {
        self.rate_plans.get(code)
    }

    pub fn package_type(&self, kind: PackageKind) -> Option<&PackageTypeConfig> {
        self.package_types.get(kind.as_ref())
    }

    /// View label; falls back to the view code in both languages.
    pub fn view_label(&self, view: View) -> Bilingual {
        self.views
            .get(view.as_ref())
            .cloned()
            .unwrap_or_else(|| Bilingual::new(view.as_ref(), view.as_ref()))
    }

    /// Amenity label in `lang`, then the other language, then the code itself.
    pub fn amenity_label<'a>(&'a self, code: &'a str, lang: Language) -> &'a str {
        match self.amenities.get(code).map(|label| label.get(lang)) {
            Some(label) if !label.is_empty() => label,
            _ => code,
        }
    }
}
