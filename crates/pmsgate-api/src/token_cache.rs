// Process-wide access token cache with single-flight refresh.
//
// The cache holds at most one token. A caller that finds the token stale
// or absent starts one grant exchange; callers arriving while it is in
// flight await the same exchange and receive its result or its failure.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::auth::{AccessToken, TokenSource};
use crate::error::Error;

// ── Policy ───────────────────────────────────────────────────────────

/// Bounded exponential backoff for the token exchange.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Default: 2.
    pub max_retries: u32,
    /// Delay before the first retry. Default: 250ms.
    pub initial_backoff: Duration,
    /// Upper bound on a single delay. Default: 5s.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// `delay = min(initial * 2^attempt, max)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// When a cached token counts as fresh, and how refreshes are retried.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    /// A token is reused only while `now + margin < expires_at`. Default: 5 min.
    pub margin: Duration,
    pub retry: RetryPolicy,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            margin: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

impl RefreshPolicy {
    pub fn is_fresh(&self, token: &AccessToken, now: Instant) -> bool {
        now + self.margin < token.expires_at()
    }
}

// ── Cache ────────────────────────────────────────────────────────────

type SharedGrant = Shared<BoxFuture<'static, Result<AccessToken, Error>>>;

enum Slot {
    Empty,
    Ready(AccessToken),
    Pending { generation: u64, grant: SharedGrant },
}

struct State {
    slot: Slot,
    generation: u64,
}

/// Holds the current access token for one set of client credentials.
///
/// Construct once at service start and share by reference (`Arc`).
pub struct TokenCache<S> {
    source: Arc<S>,
    policy: RefreshPolicy,
    state: Mutex<State>,
}

impl<S: TokenSource> TokenCache<S> {
    pub fn new(source: S, policy: RefreshPolicy) -> Self {
        Self {
            source: Arc::new(source),
            policy,
            state: Mutex::new(State {
                slot: Slot::Empty,
                generation: 0,
            }),
        }
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Return a fresh token, refreshing it at most once across all
    /// concurrent callers.
    pub async fn get_token(&self) -> Result<AccessToken, Error> {
        let (generation, grant) = {
            let mut state = self.lock();
            match &state.slot {
                Slot::Ready(token) if self.policy.is_fresh(token, Instant::now()) => {
                    return Ok(token.clone());
                }
                Slot::Pending { generation, grant } => {
                    debug!("awaiting in-flight token grant");
                    (*generation, grant.clone())
                }
                Slot::Ready(_) | Slot::Empty => {
                    state.generation += 1;
                    let generation = state.generation;
                    let grant = self.start_grant();
                    state.slot = Slot::Pending {
                        generation,
                        grant: grant.clone(),
                    };
                    (generation, grant)
                }
            }
        };

        let result = grant.await;

        let mut state = self.lock();
        let settles = matches!(
            &state.slot,
            Slot::Pending { generation: g, .. } if *g == generation
        );
        if settles {
            state.slot = match &result {
                Ok(token) => Slot::Ready(token.clone()),
                Err(_) => Slot::Empty,
            };
        }
        drop(state);

        result
    }

    /// Remaining lifetime of the cached token, without triggering a refresh.
    pub fn remaining_lifetime(&self) -> Option<Duration> {
        match &self.lock().slot {
            Slot::Ready(token) => Some(token.remaining(Instant::now())),
            Slot::Empty | Slot::Pending { .. } => None,
        }
    }

    fn start_grant(&self) -> SharedGrant {
        let source = Arc::clone(&self.source);
        let retry = self.policy.retry.clone();
        async move { fetch_with_retry(source.as_ref(), &retry).await }
            .boxed()
            .shared()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn fetch_with_retry<S: TokenSource>(
    source: &S,
    retry: &RetryPolicy,
) -> Result<AccessToken, Error> {
    let mut attempt = 0;
    loop {
        match source.fetch_token().await {
            Ok(token) => return Ok(token),
            Err(err) if err.is_transient() && attempt < retry.max_retries => {
                let delay = retry.backoff(attempt);
                warn!(attempt, ?delay, error = %err, "token grant failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let retry = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(1),
        };
        assert_eq!(retry.backoff(0), Duration::from_millis(250));
        assert_eq!(retry.backoff(1), Duration::from_millis(500));
        assert_eq!(retry.backoff(2), Duration::from_secs(1));
        assert_eq!(retry.backoff(40), Duration::from_secs(1));
    }

    #[test]
    fn freshness_uses_margin() {
        let policy = RefreshPolicy::default();
        let now = Instant::now();
        let token = AccessToken::new("t", Duration::from_secs(3600), now);

        assert!(policy.is_fresh(&token, now));
        assert!(policy.is_fresh(&token, now + Duration::from_secs(3600 - 400)));
        assert!(!policy.is_fresh(&token, now + Duration::from_secs(3600 - 300)));
        assert!(!policy.is_fresh(&token, now + Duration::from_secs(3600 - 200)));
    }
}
