// PMS gateway REST surface: availability, reservations, lookups.

pub mod availability;
pub mod client;
pub mod reservations;
pub mod types;

pub use availability::AvailabilityQuery;
pub use client::{PmsClient, PmsIdentity, normalize_base_url};
pub use reservations::IDEMPOTENCY_KEY_HEADER;
