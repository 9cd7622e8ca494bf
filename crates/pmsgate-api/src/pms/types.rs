// Wire types for the PMS reservation and availability surfaces.
//
// Availability types are lenient: every field is optional and
// amounts accept either JSON numbers or numeric strings, so one document
// type can carry both known response shapes. The reservation payload is
// strict and serializes in the exact field order the PMS expects.

use serde::{Deserialize, Deserializer, Serialize};

// ── Availability (response) ──────────────────────────────────────────

/// Top-level availability document.
///
/// Room stays usually sit under `hotelAvailability[0].roomStays`; some
/// revisions return them at the top level instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDocument {
    #[serde(default)]
    pub hotel_availability: Vec<HotelAvailability>,
    #[serde(default)]
    pub room_stays: Vec<RoomStay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelAvailability {
    #[serde(default)]
    pub hotel_id: Option<String>,
    #[serde(default)]
    pub room_stays: Vec<RoomStay>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

/// One room stay. Flat responses carry `roomRates`; nested responses carry
/// `roomType` plus `ratePlans`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStay {
    #[serde(default)]
    pub room_rates: Option<Vec<FlatRoomRate>>,
    #[serde(default)]
    pub room_type: Option<RoomTypeRef>,
    #[serde(default)]
    pub rate_plans: Vec<NestedRatePlan>,
    #[serde(default)]
    pub arrival_date: Option<String>,
    #[serde(default)]
    pub departure_date: Option<String>,
}

/// Room type reference: a bare code, or an object with `roomTypeCode`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoomTypeRef {
    Code(String),
    Object {
        #[serde(default, rename = "roomTypeCode")]
        room_type_code: Option<String>,
    },
}

impl RoomTypeRef {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Code(code) => Some(code),
            Self::Object { room_type_code } => room_type_code.as_deref(),
        }
    }
}

/// Flat room-rate record with a single `total` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRoomRate {
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub rate_plan_code: Option<String>,
    #[serde(default)]
    pub total: Option<AmountBlock>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedRatePlan {
    #[serde(default)]
    pub rate_plan_code: Option<String>,
    #[serde(default)]
    pub rates: Vec<NestedRate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedRate {
    #[serde(default)]
    pub base: Option<AmountBlock>,
    #[serde(default)]
    pub total: Option<AmountBlock>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountBlock {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount_before_tax: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount_after_tax: Option<f64>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// Accept `500`, `500.5`, `"500.50"` or `null`. Unparsable or non-finite
/// values become `None`.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Amount>::deserialize(deserializer)? {
        Some(Amount::Number(n)) => Some(n),
        Some(Amount::Text(s)) => s.trim().parse().ok(),
        None => None,
    }
    .filter(|n: &f64| n.is_finite()))
}

// ── Hypermedia ───────────────────────────────────────────────────────

/// A hypermedia link as returned by the reservation endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default)]
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

/// Only the part of a reservation-creation response this layer reads.
/// Entries stay raw so one malformed link does not poison its siblings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationLinks {
    #[serde(default)]
    pub links: Option<Vec<serde_json::Value>>,
}

// ── Reservation (request) ────────────────────────────────────────────

/// Body of `POST /rsv/v1/hotels/{hotelId}/reservations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationPayload {
    pub reservations: ReservationList,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationList {
    pub reservation: Vec<Reservation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Reservation {
    pub source_of_sale: SourceOfSale,
    pub room_stay: RoomStayRequest,
    pub reservation_guests: Vec<ReservationGuest>,
    pub reservation_communication: ReservationCommunication,
    pub reservation_payment_methods: Vec<PaymentMethod>,
    pub comments: Vec<CommentEntry>,
    pub hotel_id: String,
    pub room_stay_reservation: bool,
    pub reservation_status: String,
    pub computed_reservation_status: String,
    pub walk_in: bool,
    pub print_rate: bool,
    pub pre_registered: bool,
    pub upgrade_eligible: bool,
    pub allow_auto_checkin: bool,
    pub has_open_folio: bool,
    pub allow_mobile_checkout: bool,
    pub allow_mobile_view_folio: bool,
    pub allow_pre_registration: bool,
    pub opted_for_communication: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOfSale {
    pub source_type: String,
    pub source_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStayRequest {
    pub room_rates: Vec<RoomRateRequest>,
    pub guest_counts: GuestCounts,
    pub arrival_date: String,
    pub departure_date: String,
    pub guarantee: Guarantee,
    pub room_number_locked: bool,
    pub print_rate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct RoomRateRequest {
    pub room_type: String,
    pub rate_plan_code: String,
    pub start: String,
    pub end: String,
    pub suppress_rate: bool,
    pub market_code: String,
    pub source_code: String,
    pub number_of_units: String,
    pub pseudo_room: bool,
    pub room_type_charged: String,
    pub house_use_only: bool,
    pub complimentary: bool,
    pub fixed_rate: bool,
    pub discount_allowed: bool,
    pub bogo_discount: bool,
    pub room_number_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_code: Option<String>,
    pub guest_counts: GuestCounts,
    pub rates: RateList,
    pub total: RateAmount,
}

/// Guest counts, serialized as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestCounts {
    pub adults: String,
    pub children: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateList {
    pub rate: Vec<RateEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub base: RateAmount,
    pub total: RateAmount,
    pub start: String,
    pub end: String,
    pub share_distribution_instruction: String,
}

/// Amount block with decimal-string amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateAmount {
    pub amount_before_tax: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guarantee {
    pub guarantee_code: String,
    pub short_description: String,
    pub on_hold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationGuest {
    pub profile_info: ProfileInfo,
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileInfo {
    pub profile: Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub customer: Customer,
    pub profile_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub person_name: Vec<PersonName>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonName {
    pub given_name: String,
    pub surname: String,
    pub name_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationCommunication {
    pub emails: Emails,
    pub telephones: Telephones,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Emails {
    pub email_info: Vec<EmailInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailInfo {
    pub email: Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub email_address: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub primary_ind: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telephones {
    pub telephone_info: Vec<TelephoneInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelephoneInfo {
    pub telephone: Telephone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telephone {
    pub phone_number: String,
    pub phone_use_type: String,
    pub primary_ind: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub payment_method: String,
    pub folio_view: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentEntry {
    pub comment: Comment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: CommentText,
    pub comment_title: String,
    pub notification_location: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub internal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentText {
    pub value: String,
}
