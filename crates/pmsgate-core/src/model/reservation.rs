// ── Reservation domain types ──

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::diagnostics::Diagnostic;

/// Primary guest contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// What the booking application asks to reserve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationIntent {
    /// `YYYY-MM-DD`
    pub check_in: String,
    /// `YYYY-MM-DD`
    pub check_out: String,
    pub room_type_code: String,
    pub rate_plan_code: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    pub guest: GuestContact,
    /// Pre-tax total for the stay.
    pub amount_before_tax: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

/// Identifiers parsed from a reservation response. Either may be absent
/// without the call failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<String>,
}

/// Outcome of a successful reservation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationConfirmation {
    #[serde(flatten)]
    pub result: ReservationResult,
    /// Key sent as `Idempotency-Key`; reuse it when deliberately retrying.
    pub idempotency_key: Uuid,
    /// Upstream response body, unmodified.
    pub raw: Value,
    pub diagnostics: Vec<Diagnostic>,
}

/// How to find an existing reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationLookup {
    ById(String),
    ByConfirmationNumber(String),
}
