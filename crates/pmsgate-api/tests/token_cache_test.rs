// Token cache behaviour under tokio's paused clock, driven by an
// in-process token source.
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::join_all;
use secrecy::ExposeSecret;
use tokio::time::{Instant, advance};

use pmsgate_api::{AccessToken, Error, RefreshPolicy, RetryPolicy, TimeoutPhase, TokenCache, TokenSource};

const LIFETIME: Duration = Duration::from_secs(3600);

// ── Helpers ─────────────────────────────────────────────────────────

struct ScriptedSource {
    grants: Arc<AtomicUsize>,
    delay: Duration,
    failures: Mutex<VecDeque<Error>>,
}

impl ScriptedSource {
    fn new(grants: Arc<AtomicUsize>) -> Self {
        Self {
            grants,
            delay: Duration::ZERO,
            failures: Mutex::new(VecDeque::new()),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing_with(self, errors: Vec<Error>) -> Self {
        *self.failures.lock().unwrap() = errors.into();
        self
    }
}

impl TokenSource for ScriptedSource {
    async fn fetch_token(&self) -> Result<AccessToken, Error> {
        let n = self.grants.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        let failure = self.failures.lock().unwrap().pop_front();
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(AccessToken::new(format!("token-{n}"), LIFETIME, Instant::now()))
    }
}

fn cache(source: ScriptedSource) -> Arc<TokenCache<ScriptedSource>> {
    Arc::new(TokenCache::new(source, RefreshPolicy::default()))
}

fn value(token: &AccessToken) -> String {
    token.secret().expose_secret().to_owned()
}

// ── Freshness ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_cached_token_reused_until_refresh_margin() {
    let grants = Arc::new(AtomicUsize::new(0));
    let cache = cache(ScriptedSource::new(Arc::clone(&grants)));

    let first = cache.get_token().await.unwrap();
    assert_eq!(grants.load(Ordering::SeqCst), 1);

    advance(LIFETIME - Duration::from_secs(400)).await;
    let second = cache.get_token().await.unwrap();
    assert_eq!(value(&second), value(&first));
    assert_eq!(grants.load(Ordering::SeqCst), 1);

    advance(Duration::from_secs(200)).await;
    let third = cache.get_token().await.unwrap();
    assert_eq!(grants.load(Ordering::SeqCst), 2);
    assert_eq!(value(&third), "token-2");

    // The refreshed token is cached in turn.
    let fourth = cache.get_token().await.unwrap();
    assert_eq!(value(&fourth), "token-2");
    assert_eq!(grants.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_lifetime_reports_without_refreshing() {
    let grants = Arc::new(AtomicUsize::new(0));
    let cache = cache(ScriptedSource::new(Arc::clone(&grants)));

    assert_eq!(cache.remaining_lifetime(), None);

    cache.get_token().await.unwrap();
    assert_eq!(cache.remaining_lifetime(), Some(LIFETIME));

    advance(Duration::from_secs(100)).await;
    assert_eq!(
        cache.remaining_lifetime(),
        Some(LIFETIME - Duration::from_secs(100))
    );
    assert_eq!(grants.load(Ordering::SeqCst), 1);
}

// ── Single-flight ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_share_one_grant() {
    let grants = Arc::new(AtomicUsize::new(0));
    let cache = cache(ScriptedSource::new(Arc::clone(&grants)).with_delay(Duration::from_millis(100)));

    let results = join_all((0..16).map(|_| {
        let cache = Arc::clone(&cache);
        async move { cache.get_token().await }
    }))
    .await;

    assert_eq!(grants.load(Ordering::SeqCst), 1);
    for result in results {
        assert_eq!(value(&result.unwrap()), "token-1");
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_waiters_share_the_failure() {
    let grants = Arc::new(AtomicUsize::new(0));
    let source = ScriptedSource::new(Arc::clone(&grants))
        .with_delay(Duration::from_millis(50))
        .failing_with(vec![Error::Authentication {
            status: 401,
            body: "invalid_client".into(),
        }]);
    let cache = cache(source);

    let results = join_all((0..8).map(|_| {
        let cache = Arc::clone(&cache);
        async move { cache.get_token().await }
    }))
    .await;

    assert_eq!(grants.load(Ordering::SeqCst), 1);
    for result in results {
        match result {
            Err(Error::Authentication { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected authentication error, got {other:?}"),
        }
    }

    // A failed grant is not cached; the next caller starts a new exchange.
    let token = cache.get_token().await.unwrap();
    assert_eq!(value(&token), "token-2");
    assert_eq!(grants.load(Ordering::SeqCst), 2);
}

// ── Retry ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_transient_grant_failures_are_retried() {
    let grants = Arc::new(AtomicUsize::new(0));
    let source = ScriptedSource::new(Arc::clone(&grants)).failing_with(vec![
        Error::Timeout {
            phase: TimeoutPhase::Connect,
        },
        Error::Connect {
            url: "https://gateway.example.com".into(),
            message: "connection refused".into(),
        },
    ]);
    let cache = cache(source);

    let started = Instant::now();
    let token = cache.get_token().await.unwrap();

    assert_eq!(grants.load(Ordering::SeqCst), 3);
    assert_eq!(value(&token), "token-3");
    // 250ms + 500ms of backoff elapsed on the paused clock.
    assert!(started.elapsed() >= Duration::from_millis(750));
}

#[tokio::test(start_paused = true)]
async fn test_retries_are_bounded() {
    let grants = Arc::new(AtomicUsize::new(0));
    let transient = || Error::Timeout {
        phase: TimeoutPhase::Request,
    };
    let source = ScriptedSource::new(Arc::clone(&grants))
        .failing_with(vec![transient(), transient(), transient(), transient()]);
    let cache = Arc::new(TokenCache::new(
        source,
        RefreshPolicy {
            margin: Duration::from_secs(300),
            retry: RetryPolicy {
                max_retries: 2,
                ..RetryPolicy::default()
            },
        },
    ));

    let err = cache.get_token().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }));
    assert_eq!(grants.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_protocol_errors_are_not_retried() {
    let grants = Arc::new(AtomicUsize::new(0));
    let source = ScriptedSource::new(Arc::clone(&grants)).failing_with(vec![Error::Protocol {
        message: "token grant lacks access_token".into(),
        body: "{}".into(),
    }]);
    let cache = cache(source);

    let err = cache.get_token().await.unwrap_err();
    assert!(matches!(err, Error::Protocol { .. }));
    assert_eq!(grants.load(Ordering::SeqCst), 1);
}
