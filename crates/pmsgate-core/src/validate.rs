// ── Request validation ──
//
// Checks applied before any upstream call. "Today" is always supplied by
// the caller so results do not depend on the wall clock.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::CoreError;
use crate::model::{AvailabilitySearch, ReservationIntent};

pub const MIN_ADULTS: u32 = 1;
pub const MAX_ADULTS: u32 = 12;
pub const MAX_CHILDREN: u32 = 8;

const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid literal")
});

/// A validated check-in/check-out pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    /// Number of nights; always at least one.
    pub fn nights(&self) -> u32 {
        let days = (self.check_out - self.check_in).num_days();
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, CoreError> {
    if value.len() != 10 {
        return Err(CoreError::validation(field, format!("{value:?} is not YYYY-MM-DD")));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| CoreError::validation(field, format!("{value:?} is not YYYY-MM-DD")))
}

/// Check-in must not be before `today`; check-out must be strictly after check-in.
pub fn validate_stay(
    check_in: &str,
    check_out: &str,
    today: NaiveDate,
) -> Result<StayDates, CoreError> {
    let check_in = parse_date("check-in", check_in)?;
    let check_out = parse_date("check-out", check_out)?;

    if check_in < today {
        return Err(CoreError::validation(
            "check-in",
            format!("{check_in} is in the past"),
        ));
    }
    if check_out <= check_in {
        return Err(CoreError::validation(
            "check-out",
            format!("{check_out} must be after check-in {check_in}"),
        ));
    }
    Ok(StayDates {
        check_in,
        check_out,
    })
}

fn validate_occupancy(adults: u32, children: u32) -> Result<(), CoreError> {
    if !(MIN_ADULTS..=MAX_ADULTS).contains(&adults) {
        return Err(CoreError::validation(
            "adults",
            format!("{adults} is outside {MIN_ADULTS}..={MAX_ADULTS}"),
        ));
    }
    if children > MAX_CHILDREN {
        return Err(CoreError::validation(
            "children",
            format!("{children} exceeds {MAX_CHILDREN}"),
        ));
    }
    Ok(())
}

pub fn validate_search(
    search: &AvailabilitySearch,
    today: NaiveDate,
) -> Result<StayDates, CoreError> {
    let stay = validate_stay(&search.check_in, &search.check_out, today)?;
    validate_occupancy(search.adults, search.children)?;
    Ok(stay)
}

/// Search rules plus codes, guest identity and amount.
pub fn validate_intent(
    intent: &ReservationIntent,
    today: NaiveDate,
) -> Result<StayDates, CoreError> {
    let stay = validate_stay(&intent.check_in, &intent.check_out, today)?;
    validate_occupancy(intent.adults, intent.children)?;

    require("room type code", &intent.room_type_code)?;
    require("rate plan code", &intent.rate_plan_code)?;
    require("first name", &intent.guest.first_name)?;
    require("last name", &intent.guest.last_name)?;

    let email = intent.guest.email.trim();
    if !EMAIL.is_match(email) {
        return Err(CoreError::validation(
            "email",
            format!("{email:?} is not a valid address"),
        ));
    }

    let amount = intent.amount_before_tax;
    if !amount.is_finite() || amount < 0.0 {
        return Err(CoreError::validation(
            "amount",
            format!("{amount} is not a non-negative amount"),
        ));
    }

    Ok(stay)
}

fn require(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Nights between two `YYYY-MM-DD` dates; zero when check-out is not after check-in.
pub fn nights(check_in: &str, check_out: &str) -> Result<u32, CoreError> {
    let check_in = parse_date("check-in", check_in)?;
    let check_out = parse_date("check-out", check_out)?;
    let days = (check_out - check_in).num_days().max(0);
    Ok(u32::try_from(days).unwrap_or(u32::MAX))
}
