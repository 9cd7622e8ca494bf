// ── Runtime service configuration ──
//
// Describes *which* PMS to talk to and how. Carries credentials and
// tuning but never touches disk or the environment: the config crate (or
// a test) builds a `ServiceConfig` and hands it to `BookingService`.

use pmsgate_api::{ClientCredentials, RefreshPolicy, TransportConfig};

use crate::mapper::ReservationDefaults;

pub const DEFAULT_AVAILABILITY_LIMIT: u32 = 50;
pub const DEFAULT_RATE_PLAN: &str = "AIF-2025";

/// Configuration for one hotel behind one PMS gateway.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Gateway base URL, e.g. `https://gateway.example.com`.
    pub gateway_url: String,
    pub hotel_id: String,
    /// Client credentials plus enterprise id and application key.
    pub credentials: ClientCredentials,
    /// Connect/request timeouts and TLS.
    pub transport: TransportConfig,
    /// Token refresh margin and grant retry policy.
    pub refresh: RefreshPolicy,
    /// Availability page size.
    pub availability_limit: u32,
    pub reservation_defaults: ReservationDefaults,
    /// Rate plan the booking application preselects.
    pub default_rate_plan: String,
}

impl ServiceConfig {
    /// Config with default tuning for the given gateway, hotel and credentials.
    pub fn new(
        gateway_url: impl Into<String>,
        hotel_id: impl Into<String>,
        credentials: ClientCredentials,
    ) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            hotel_id: hotel_id.into(),
            credentials,
            transport: TransportConfig::default(),
            refresh: RefreshPolicy::default(),
            availability_limit: DEFAULT_AVAILABILITY_LIMIT,
            reservation_defaults: ReservationDefaults::default(),
            default_rate_plan: DEFAULT_RATE_PLAN.to_owned(),
        }
    }
}
