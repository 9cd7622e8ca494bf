// ── Domain model ──
//
// Canonical types shared by the normalizer, enricher, mapper and service.
// Upstream wire types never leak past `normalize`/`mapper`.

pub mod availability;
pub mod diagnostics;
pub mod reservation;

pub use availability::{
    AvailabilitySearch, Bilingual, EnrichedRate, EnrichedRoom, Language, PackageKind, RawRoomRate,
    View,
};
pub use diagnostics::{ConfigMismatch, Diagnostic};
pub use reservation::{
    GuestContact, ReservationConfirmation, ReservationIntent, ReservationLookup,
    ReservationResult,
};
