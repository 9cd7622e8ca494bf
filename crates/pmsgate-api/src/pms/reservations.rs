// Reservation creation and lookup under /rsv/v1/hotels/{hotelId}/reservations,
// plus the guarantee-code configuration lookup.

use reqwest::header::{HeaderMap, HeaderName};
use serde_json::Value;
use uuid::Uuid;

use super::client::{PmsClient, encode_segment};
use super::types::ReservationPayload;
use crate::auth::{TokenSource, header_value};
use crate::error::Error;

/// Header carrying the client-supplied idempotency token.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

impl<S: TokenSource> PmsClient<S> {
    /// Create a reservation. Returns the upstream body unmodified (`Null`
    /// when the gateway answers with an empty body).
    ///
    /// Never retried here: a timeout leaves the outcome unknown, and the
    /// caller must reuse `idempotency_key` on any deliberate retry.
    pub async fn create_reservation(
        &self,
        payload: &ReservationPayload,
        idempotency_key: Uuid,
    ) -> Result<Value, Error> {
        let path = format!("rsv/v1/hotels/{}/reservations", self.hotel_segment());
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(IDEMPOTENCY_KEY_HEADER),
            header_value(IDEMPOTENCY_KEY_HEADER, &idempotency_key.to_string())?,
        );
        self.post(&path, payload, headers).await
    }

    /// `GET /rsv/v1/hotels/{hotelId}/reservations/{id}`
    pub async fn get_reservation_by_id(&self, reservation_id: &str) -> Result<Value, Error> {
        let path = format!(
            "rsv/v1/hotels/{}/reservations/{}",
            self.hotel_segment(),
            encode_segment(reservation_id)
        );
        self.get(&path, &[]).await
    }

    /// `GET /rsv/v1/hotels/{hotelId}/reservations?confirmationNumberList={n}`
    pub async fn get_reservation_by_confirmation_number(
        &self,
        confirmation_number: &str,
    ) -> Result<Value, Error> {
        let path = format!("rsv/v1/hotels/{}/reservations", self.hotel_segment());
        self.get(
            &path,
            &[("confirmationNumberList", confirmation_number.to_owned())],
        )
        .await
    }

    /// `GET /rsv/config/v1/guaranteeCodes?hotelIds={hotelId}`
    pub async fn guarantee_codes(&self) -> Result<Value, Error> {
        self.get(
            "rsv/config/v1/guaranteeCodes",
            &[("hotelIds", self.hotel_id().to_owned())],
        )
        .await
    }
}
