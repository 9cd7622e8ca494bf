// ── Booking service facade ──
//
// The interface the booking application consumes. Composes the PMS
// client, normalizer, enricher and mapper; owns the only shared mutable
// state (the token cache, inside the client). Cheap to clone.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use pmsgate_api::{AvailabilityQuery, PmsClient};

use crate::catalog::ConfigCatalog;
use crate::config::ServiceConfig;
use crate::enrich::AvailabilityEnricher;
use crate::error::CoreError;
use crate::mapper::{ReservationMapper, parse_identifiers};
use crate::model::{
    AvailabilitySearch, Diagnostic, EnrichedRoom, ReservationConfirmation,
    ReservationIntent, ReservationLookup,
};
use crate::normalize::{Normalized, StayWindow, normalize};
use crate::validate::{validate_intent, validate_search};

/// Result of an availability search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityOutcome {
    pub check_in: String,
    pub check_out: String,
    pub nights: u32,
    pub rooms: Vec<EnrichedRoom>,
    /// Everything dropped along the way. Empty when upstream and catalog agree.
    pub diagnostics: Vec<Diagnostic>,
}

impl AvailabilityOutcome {
    pub fn available_rooms(&self) -> impl Iterator<Item = &EnrichedRoom> {
        self.rooms.iter().filter(|room| room.available)
    }
}

/// Cached token state. Never carries the token value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    /// Remaining lifetime of the cached token, if any.
    #[serde(with = "duration_secs")]
    pub remaining: Option<Duration>,
    /// True when the next call will trigger a grant exchange.
    pub refresh_due: bool,
}

/// Booking-facing entry point. Construct once at startup and clone freely.
#[derive(Clone)]
pub struct BookingService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    client: PmsClient,
    catalog: Arc<ConfigCatalog>,
    mapper: ReservationMapper,
    availability_limit: u32,
    default_rate_plan: String,
}

impl BookingService {
    /// Build the PMS client and token cache. Does not contact the gateway.
    pub fn new(config: ServiceConfig, catalog: Arc<ConfigCatalog>) -> Result<Self, CoreError> {
        let ServiceConfig {
            gateway_url,
            hotel_id,
            credentials,
            transport,
            refresh,
            availability_limit,
            reservation_defaults,
            default_rate_plan,
        } = config;

        let client = PmsClient::new(
            &gateway_url,
            hotel_id.clone(),
            credentials,
            refresh,
            &transport,
        )?;
        debug!(gateway = %client.base_url(), hotel = %hotel_id, "booking service ready");

        Ok(Self {
            inner: Arc::new(ServiceInner {
                client,
                catalog,
                mapper: ReservationMapper::new(hotel_id, reservation_defaults),
                availability_limit,
                default_rate_plan,
            }),
        })
    }

    pub fn catalog(&self) -> &Arc<ConfigCatalog> {
        &self.inner.catalog
    }

    pub fn hotel_id(&self) -> &str {
        self.inner.client.hotel_id()
    }

    /// Rate plan the booking application preselects. Never injected into
    /// searches on its own.
    pub fn default_rate_plan(&self) -> &str {
        &self.inner.default_rate_plan
    }

    pub fn mapper(&self) -> &ReservationMapper {
        &self.inner.mapper
    }

    // ── Availability ─────────────────────────────────────────────────

    /// Validate, query upstream, normalize and enrich.
    pub async fn check_availability(
        &self,
        search: &AvailabilitySearch,
    ) -> Result<AvailabilityOutcome, CoreError> {
        self.check_availability_on(search, today()).await
    }

    /// [`check_availability`](Self::check_availability) with an explicit "today".
    pub async fn check_availability_on(
        &self,
        search: &AvailabilitySearch,
        today: NaiveDate,
    ) -> Result<AvailabilityOutcome, CoreError> {
        let stay = validate_search(search, today)?;

        let query = AvailabilityQuery {
            start_date: search.check_in.clone(),
            end_date: search.check_out.clone(),
            adults: search.adults,
            children: search.children,
            limit: self.inner.availability_limit,
            rate_plan_code: search.rate_plan_code.clone(),
            promotion_code: search.promo_code.clone(),
        };
        let raw = self.inner.client.check_availability(&query).await?;

        let window = StayWindow {
            start: &search.check_in,
            end: &search.check_out,
        };
        let normalized = normalize(&raw, window).inspect_err(|e| {
            error!(error = %e, body = %raw, "unrecognized availability response");
        })?;
        log_upstream_summary(&normalized);

        let enriched = AvailabilityEnricher::new(
            &self.inner.catalog,
            &self.inner.mapper.defaults().currency_code,
        )
        .enrich(&normalized.rates, search.language);

        let mut diagnostics = normalized.diagnostics;
        diagnostics.extend(enriched.diagnostics);
        log_diagnostics(&diagnostics);

        let outcome = AvailabilityOutcome {
            check_in: search.check_in.clone(),
            check_out: search.check_out.clone(),
            nights: stay.nights(),
            rooms: enriched.rooms,
            diagnostics,
        };
        info!(
            rooms = outcome.rooms.len(),
            available = outcome.available_rooms().count(),
            diagnostics = outcome.diagnostics.len(),
            "availability search complete"
        );
        Ok(outcome)
    }

    // ── Reservations ─────────────────────────────────────────────────

    /// Validate, map and submit a reservation. A fresh idempotency key is
    /// generated unless the caller passes the key of an earlier attempt.
    ///
    /// Never retried here, whatever the failure. Anything that goes wrong
    /// once the request is built comes back as
    /// [`CoreError::ReservationFailed`] carrying the key to retry with.
    pub async fn create_reservation(
        &self,
        intent: &ReservationIntent,
        idempotency_key: Option<Uuid>,
    ) -> Result<ReservationConfirmation, CoreError> {
        self.create_reservation_on(intent, idempotency_key, today()).await
    }

    /// [`create_reservation`](Self::create_reservation) with an explicit "today".
    pub async fn create_reservation_on(
        &self,
        intent: &ReservationIntent,
        idempotency_key: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<ReservationConfirmation, CoreError> {
        validate_intent(intent, today)?;

        let idempotency_key = idempotency_key.unwrap_or_else(Uuid::new_v4);
        let payload = self.inner.mapper.to_payload(intent);
        debug!(
            %idempotency_key,
            room_type = %intent.room_type_code,
            rate_plan = %intent.rate_plan_code,
            "submitting reservation"
        );

        let failed = |source: CoreError| CoreError::ReservationFailed {
            idempotency_key,
            source: Box::new(source),
        };

        let raw = self
            .inner
            .client
            .create_reservation(&payload, idempotency_key)
            .await
            .map_err(|e| failed(e.into()))
            .inspect_err(|e| warn!(error = %e, "reservation failed"))?;

        let parsed = parse_identifiers(&raw).map_err(failed).inspect_err(|e| {
            error!(error = %e, body = %raw, "unparsable reservation response");
        })?;
        log_diagnostics(&parsed.diagnostics);
        info!(
            reservation_id = parsed.result.reservation_id.as_deref().unwrap_or("-"),
            confirmation_number = parsed.result.confirmation_number.as_deref().unwrap_or("-"),
            "reservation created"
        );

        Ok(ReservationConfirmation {
            result: parsed.result,
            idempotency_key,
            raw,
            diagnostics: parsed.diagnostics,
        })
    }

    /// Raw upstream record for an existing reservation.
    pub async fn lookup_reservation(&self, lookup: &ReservationLookup) -> Result<Value, CoreError> {
        let client = &self.inner.client;
        let record = match lookup {
            ReservationLookup::ById(id) => client.get_reservation_by_id(id).await?,
            ReservationLookup::ByConfirmationNumber(number) => {
                client.get_reservation_by_confirmation_number(number).await?
            }
        };
        Ok(record)
    }

    /// Raw guarantee-code configuration for the hotel.
    pub async fn guarantee_codes(&self) -> Result<Value, CoreError> {
        Ok(self.inner.client.guarantee_codes().await?)
    }

    // ── Token ────────────────────────────────────────────────────────

    /// State of the cached token, without contacting the gateway.
    pub fn token_status(&self) -> TokenStatus {
        let tokens = self.inner.client.tokens();
        let remaining = tokens.remaining_lifetime();
        TokenStatus {
            remaining,
            refresh_due: remaining.is_none_or(|left| left <= tokens.policy().margin),
        }
    }

    /// Make sure a fresh token is cached and report its status.
    pub async fn authenticate(&self) -> Result<TokenStatus, CoreError> {
        self.inner.client.tokens().get_token().await?;
        Ok(self.token_status())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn log_upstream_summary(normalized: &Normalized) {
    let rates = &normalized.rates;
    let room_types: BTreeSet<&str> = rates.iter().map(|r| r.room_type_code.as_str()).collect();
    let rate_plans: BTreeSet<&str> = rates.iter().map(|r| r.rate_plan_code.as_str()).collect();
    debug!(
        shape = normalized.shape.unwrap_or("empty"),
        rates = rates.len(),
        room_types = room_types.len(),
        rate_plans = rate_plans.len(),
        codes = ?room_types,
        "upstream availability"
    );
}

fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        warn!(%diagnostic, "diagnostic recorded");
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }
}
