// ── Non-fatal diagnostics ──
//
// Things that went wrong without failing the call: catalog mismatches,
// upstream rows that could not be normalized, identifiers missing from a
// reservation response. Returned alongside results and logged by the
// service layer.

use serde::Serialize;
use thiserror::Error;

/// An upstream code with no local catalog entry. Never returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "mismatch", rename_all = "snake_case")]
pub enum ConfigMismatch {
    #[error("room type {room_type_code} is not in the catalog; {dropped_rates} rate(s) dropped")]
    RoomTypeUnmapped {
        room_type_code: String,
        dropped_rates: usize,
    },

    #[error("rate plan {rate_plan_code} (room type {room_type_code}) is not in the catalog")]
    RatePlanUnmapped {
        room_type_code: String,
        rate_plan_code: String,
    },

    #[error("package type {package} of rate plan {rate_plan_code} is not in the catalog")]
    PackageTypeUnmapped {
        rate_plan_code: String,
        package: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error(transparent)]
    ConfigMismatch(ConfigMismatch),

    /// An upstream rate entry lacked data needed to normalize it.
    #[error("upstream rate dropped: {reason}")]
    RateDropped { reason: String },

    #[error("reservation id not found in response links")]
    ReservationIdMissing,

    #[error("confirmation number not found in response links")]
    ConfirmationNumberMissing,

    /// A response link entry that is not a link object.
    #[error("reservation response link skipped: {reason}")]
    LinkSkipped { reason: String },
}

impl From<ConfigMismatch> for Diagnostic {
    fn from(mismatch: ConfigMismatch) -> Self {
        Self::ConfigMismatch(mismatch)
    }
}

impl Diagnostic {
    pub fn is_config_mismatch(&self) -> bool {
        matches!(self, Self::ConfigMismatch(_))
    }
}
