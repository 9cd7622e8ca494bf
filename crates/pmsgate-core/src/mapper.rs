// ── Reservation mapping ──
//
// Builds the nested reservation-creation body from a `ReservationIntent`
// and pulls identifiers back out of the hypermedia links in the response.
// The body layout is fixed by the upstream contract: field order, string
// encoded counts and amounts, and the constant flags all matter.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use pmsgate_api::pms_types::{
    Comment, CommentEntry, CommentText, Customer, Email, EmailInfo, Emails, Guarantee,
    GuestCounts, Link, PaymentMethod, PersonName, Profile, ProfileInfo, RateAmount, RateEntry,
    RateList, Reservation, ReservationCommunication, ReservationGuest, ReservationLinks,
    ReservationList, ReservationPayload, RoomRateRequest, RoomStayRequest, SourceOfSale,
    Telephone, TelephoneInfo, Telephones,
};

use crate::error::CoreError;
use crate::model::{Diagnostic, ReservationIntent, ReservationResult};

const GET_RESERVATION_OPERATION: &str = "getReservation";
const CONFIRMATION_PARAM: &str = "confirmationNumberList";
const WEBSITE_COMMENT: &str = "Booking from website";
const RESERVED: &str = "Reserved";

static RESERVATION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/reservations/(\d+)").expect("reservation id pattern is a valid literal")
});
static CONFIRMATION_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"confirmationNumberList=(\d+)").expect("confirmation pattern is a valid literal")
});

/// Property-level constants stamped onto every reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDefaults {
    pub currency_code: String,
    pub guarantee_code: String,
    pub guarantee_description: String,
    pub market_code: String,
    pub source_code: String,
    pub payment_method: String,
}

impl Default for ReservationDefaults {
    fn default() -> Self {
        Self {
            currency_code: "USD".into(),
            guarantee_code: "PROP".into(),
            guarantee_description: "Property Guaranteed".into(),
            market_code: "INTERNET".into(),
            source_code: "WEB".into(),
            payment_method: "CA".into(),
        }
    }
}

/// Identifiers parsed from a reservation response, plus what could not be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedIdentifiers {
    pub result: ReservationResult,
    pub diagnostics: Vec<Diagnostic>,
}

/// Stateless mapper between booking intents and the upstream reservation schema.
#[derive(Debug, Clone)]
pub struct ReservationMapper {
    hotel_id: String,
    defaults: ReservationDefaults,
}

impl ReservationMapper {
    pub fn new(hotel_id: impl Into<String>, defaults: ReservationDefaults) -> Self {
        Self {
            hotel_id: hotel_id.into(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &ReservationDefaults {
        &self.defaults
    }

    /// Build the reservation-creation body. Dates pass through unmodified;
    /// counts and amounts are encoded as decimal strings.
    pub fn to_payload(&self, intent: &ReservationIntent) -> ReservationPayload {
        let d = &self.defaults;
        let amount = intent.amount_before_tax.to_string();
        let counts = GuestCounts {
            adults: intent.adults.to_string(),
            children: intent.children.to_string(),
        };

        let room_rate = RoomRateRequest {
            room_type: intent.room_type_code.clone(),
            rate_plan_code: intent.rate_plan_code.clone(),
            start: intent.check_in.clone(),
            end: intent.check_out.clone(),
            suppress_rate: false,
            market_code: d.market_code.clone(),
            source_code: d.source_code.clone(),
            number_of_units: "1".into(),
            pseudo_room: false,
            room_type_charged: intent.room_type_code.clone(),
            house_use_only: false,
            complimentary: false,
            fixed_rate: true,
            discount_allowed: false,
            bogo_discount: false,
            room_number_locked: false,
            promotion_code: non_empty(intent.promo_code.as_deref()).map(str::to_owned),
            guest_counts: counts.clone(),
            rates: RateList {
                rate: vec![RateEntry {
                    base: RateAmount {
                        amount_before_tax: amount.clone(),
                        currency_code: Some(d.currency_code.clone()),
                    },
                    total: RateAmount {
                        amount_before_tax: amount.clone(),
                        currency_code: None,
                    },
                    start: intent.check_in.clone(),
                    end: intent.check_out.clone(),
                    share_distribution_instruction: "Full".into(),
                }],
            },
            total: RateAmount {
                amount_before_tax: amount,
                currency_code: Some(d.currency_code.clone()),
            },
        };

        let room_stay = RoomStayRequest {
            room_rates: vec![room_rate],
            guest_counts: counts,
            arrival_date: intent.check_in.clone(),
            departure_date: intent.check_out.clone(),
            guarantee: Guarantee {
                guarantee_code: d.guarantee_code.clone(),
                short_description: d.guarantee_description.clone(),
                on_hold: false,
            },
            room_number_locked: false,
            print_rate: false,
        };

        let reservation = Reservation {
            source_of_sale: SourceOfSale {
                source_type: "PMS".into(),
                source_code: self.hotel_id.clone(),
            },
            room_stay,
            reservation_guests: vec![primary_guest(intent)],
            reservation_communication: communication(intent),
            reservation_payment_methods: vec![PaymentMethod {
                payment_method: d.payment_method.clone(),
                folio_view: 1,
            }],
            comments: comments(intent),
            hotel_id: self.hotel_id.clone(),
            room_stay_reservation: true,
            reservation_status: RESERVED.into(),
            computed_reservation_status: RESERVED.into(),
            walk_in: false,
            print_rate: false,
            pre_registered: false,
            upgrade_eligible: false,
            allow_auto_checkin: false,
            has_open_folio: false,
            allow_mobile_checkout: false,
            allow_mobile_view_folio: false,
            allow_pre_registration: false,
            opted_for_communication: false,
        };

        ReservationPayload {
            reservations: ReservationList {
                reservation: vec![reservation],
            },
        }
    }
}

fn primary_guest(intent: &ReservationIntent) -> ReservationGuest {
    ReservationGuest {
        profile_info: ProfileInfo {
            profile: Profile {
                customer: Customer {
                    person_name: vec![PersonName {
                        given_name: intent.guest.first_name.clone(),
                        surname: intent.guest.last_name.clone(),
                        name_type: "Primary".into(),
                    }],
                    language: "E".into(),
                },
                profile_type: "Guest".into(),
            },
        },
        primary: true,
    }
}

fn communication(intent: &ReservationIntent) -> ReservationCommunication {
    let email_info = non_empty(Some(intent.guest.email.as_str()))
        .map(|address| EmailInfo {
            email: Email {
                email_address: address.to_owned(),
                kind: "HOME".into(),
                primary_ind: true,
            },
        })
        .into_iter()
        .collect();
    let telephone_info = non_empty(Some(intent.guest.phone.as_str()))
        .map(|number| TelephoneInfo {
            telephone: Telephone {
                phone_number: number.to_owned(),
                phone_use_type: "HOME".into(),
                primary_ind: true,
            },
        })
        .into_iter()
        .collect();

    ReservationCommunication {
        emails: Emails { email_info },
        telephones: Telephones { telephone_info },
    }
}

fn comments(intent: &ReservationIntent) -> Vec<CommentEntry> {
    let mut comments = vec![general_note(WEBSITE_COMMENT, "General Notes")];
    if let Some(requests) = non_empty(intent.special_requests.as_deref()) {
        comments.push(general_note(requests, "Special Requests"));
    }
    comments
}

fn general_note(text: &str, title: &str) -> CommentEntry {
    CommentEntry {
        comment: Comment {
            text: CommentText {
                value: text.to_owned(),
            },
            comment_title: title.to_owned(),
            notification_location: "RESERVATION".into(),
            kind: "GEN".into(),
            internal: false,
        },
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ── Response parsing ─────────────────────────────────────────────────

/// Extract the reservation id and confirmation number from the response's
/// `links`. A missing or unmatched link leaves the field unset and a link
/// entry that is not a link object is skipped; both record a diagnostic.
/// Only a `links` value that is not an array at all is an error.
pub fn parse_identifiers(response: &Value) -> Result<ParsedIdentifiers, CoreError> {
    let entries = match response {
        Value::Object(_) => ReservationLinks::deserialize(response)
            .map_err(|e| CoreError::Protocol {
                message: format!("malformed reservation links: {e}"),
                body: response.to_string(),
            })?
            .links
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut diagnostics = Vec::new();
    let links: Vec<Link> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            Link::deserialize(entry)
                .inspect_err(|e| {
                    diagnostics.push(Diagnostic::LinkSkipped {
                        reason: format!("entry {index}: {e}"),
                    });
                })
                .ok()
        })
        .collect();

    let reservation_id = find_capture(
        &links,
        |link| link.operation_id.as_deref() == Some(GET_RESERVATION_OPERATION),
        &RESERVATION_ID,
    );
    let confirmation_number = find_capture(
        &links,
        |link| link.href.contains(CONFIRMATION_PARAM),
        &CONFIRMATION_NUMBER,
    );

    if reservation_id.is_none() {
        diagnostics.push(Diagnostic::ReservationIdMissing);
    }
    if confirmation_number.is_none() {
        diagnostics.push(Diagnostic::ConfirmationNumberMissing);
    }

    Ok(ParsedIdentifiers {
        result: ReservationResult {
            reservation_id,
            confirmation_number,
        },
        diagnostics,
    })
}

fn find_capture(
    links: &[Link],
    select: impl Fn(&Link) -> bool,
    pattern: &Regex,
) -> Option<String> {
    let link = links.iter().find(|link| select(link))?;
    pattern
        .captures(&link.href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}
