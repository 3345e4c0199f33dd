use crate::error::AppError;
use crate::models::messages;
use crate::state::AppState;
use crate::store::StoreError;
use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Counter state of one client's current window after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub count: u32,
    pub resets_in: Duration,
}

/// Fixed-window counters keyed by client.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Count one request, opening a fresh window if the old one elapsed.
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowSnapshot, StoreError>;

    /// Drop windows that have fully elapsed. Returns how many were removed.
    async fn purge_expired(&self, window: Duration) -> Result<usize, StoreError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: DashMap<String, Window>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowSnapshot, StoreError> {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count = entry.count.saturating_add(1);

        Ok(WindowSnapshot {
            count: entry.count,
            resets_in: window.saturating_sub(now.duration_since(entry.started)),
        })
    }

    async fn purge_expired(&self, window: Duration) -> Result<usize, StoreError> {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < window);
        Ok(before.saturating_sub(self.windows.len()))
    }
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub retry_after_secs: u64,
}

impl RateLimitDecision {
    fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(self.limit));
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(self.remaining));
    }
}

pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, max_requests: u32, window: Duration) -> Self {
        Self {
            store,
            max_requests,
            window,
        }
    }

    pub fn in_memory(max_requests: u32, window: Duration) -> Self {
        Self::new(Arc::new(InMemoryRateLimitStore::new()), max_requests, window)
    }

    pub async fn check(&self, key: &str) -> Result<RateLimitDecision, StoreError> {
        let snapshot = self.store.hit(key, self.window).await?;
        let allowed = snapshot.count <= self.max_requests;

        // Round up so a client never retries a fraction of a second too early.
        let retry_after_secs = snapshot.resets_in.as_secs()
            + u64::from(snapshot.resets_in.subsec_nanos() > 0);

        Ok(RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(snapshot.count),
            retry_after_secs: retry_after_secs.max(1),
        })
    }

    pub async fn sweep(&self) -> Result<usize, StoreError> {
        self.store.purge_expired(self.window).await
    }
}

/// Client identity: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// peer address, then `"unknown"`.
pub fn client_key(request: &Request) -> String {
    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    if let Some(first) = header(request, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header(request, "x-real-ip") {
        return real_ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware counting every `/api` request against the caller's window.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !request.uri().path().starts_with("/api") {
        return next.run(request).await;
    }

    let key = client_key(&request);
    let decision = match state.rate_limiter.check(&key).await {
        Ok(decision) => decision,
        Err(e) => return AppError::InternalError(e.into()).into_response(),
    };

    if !decision.allowed {
        tracing::warn!(
            client = %key,
            retry_after = decision.retry_after_secs,
            "Rate limit exceeded"
        );
        let mut response = AppError::RateLimitExceeded {
            message: messages::TOO_MANY_REQUESTS.to_string(),
            retry_after_secs: decision.retry_after_secs,
        }
        .into_response();
        decision.apply_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    decision.apply_headers(response.headers_mut());
    response
}

/// Periodically purge elapsed windows so idle clients do not accumulate.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match limiter.sweep().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Purged expired rate-limit windows"),
                Err(e) => tracing::error!(error = %e, "Rate-limit sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    fn request_with(headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::builder().uri("/api/calculate");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_then_reset() {
        let limiter = RateLimiter::in_memory(3, Duration::from_secs(60));

        for expected_remaining in [2, 1, 0] {
            let d = limiter.check("1.2.3.4").await.unwrap();
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }

        let blocked = limiter.check("1.2.3.4").await.unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert_eq!(blocked.retry_after_secs, 60);

        // Other clients are unaffected.
        assert!(limiter.check("5.6.7.8").await.unwrap().allowed);

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(limiter.check("1.2.3.4").await.unwrap().retry_after_secs, 40);

        tokio::time::advance(Duration::from_secs(40)).await;
        let fresh = limiter.check("1.2.3.4").await.unwrap();
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::from_secs(60);
        store.hit("a", window).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        store.hit("b", window).await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;

        assert_eq!(store.purge_expired(window).await.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_periodically() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let limiter = Arc::new(RateLimiter::new(store.clone(), 10, Duration::from_secs(5)));
        limiter.check("idle").await.unwrap();

        let handle = spawn_sweeper(limiter, Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(store.is_empty());
        handle.abort();
    }

    #[test]
    fn test_client_key_precedence() {
        let req = request_with(&[
            ("x-forwarded-for", " 10.0.0.1 , 172.16.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(client_key(&req), "10.0.0.1");

        let req = request_with(&[("x-real-ip", "10.0.0.2")]);
        assert_eq!(client_key(&req), "10.0.0.2");

        let mut req = request_with(&[]);
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 9], 5555))));
        assert_eq!(client_key(&req), "192.168.1.9");

        assert_eq!(client_key(&request_with(&[])), "unknown");
    }
}
