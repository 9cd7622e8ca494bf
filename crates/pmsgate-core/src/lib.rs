// pmsgate-core: Domain layer between pmsgate-api and consumers (booking
// application, CLI). Normalizes upstream availability, enriches it from the
// catalog, and maps reservations to and from the upstream schema.

pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
pub mod mapper;
pub mod model;
pub mod normalize;
pub mod service;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{ConfigCatalog, PackageTypeConfig, RatePlanConfig, RoomTypeConfig};
pub use config::ServiceConfig;
pub use enrich::{AvailabilityEnricher, Enriched};
pub use error::CoreError;
pub use mapper::{ParsedIdentifiers, ReservationDefaults, ReservationMapper, parse_identifiers};
pub use normalize::{AvailabilityShape, Normalized, StayWindow, normalize};
pub use service::{AvailabilityOutcome, BookingService, TokenStatus};

pub use model::{
    AvailabilitySearch, Bilingual, ConfigMismatch, Diagnostic, EnrichedRate, EnrichedRoom,
    GuestContact, Language, PackageKind, RawRoomRate, ReservationConfirmation, ReservationIntent,
    ReservationLookup, ReservationResult, View,
};

// Transport-level types callers need to build a `ServiceConfig`.
pub use pmsgate_api::error::excerpt;
pub use pmsgate_api::{ClientCredentials, RefreshPolicy, RetryPolicy, TlsMode, TransportConfig};
