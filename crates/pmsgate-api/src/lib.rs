// pmsgate-api: Async Rust client for a hotel PMS gateway
// (OAuth2 client-credentials tokens, availability, reservations)

pub mod auth;
pub mod error;
pub mod pms;
pub mod token_cache;
pub mod transport;

pub use auth::{AccessToken, ClientCredentials, OAuthTokenSource, TokenSource};
pub use error::{Error, TimeoutPhase};
pub use pms::types as pms_types;
pub use pms::{AvailabilityQuery, PmsClient, PmsIdentity};
pub use token_cache::{RefreshPolicy, RetryPolicy, TokenCache};
pub use transport::{TlsMode, TransportConfig};
