//! Rate limiting — fixed-window request counting per client IP.
//!
//! Window state sits behind [`RateLimitStore`] so a shared backend can replace the
//! in-memory map without touching the middleware. Blocked requests are not counted.
//!
//! ```ignore
//! .route(
//!     "/api/v1/resumes/generate",
//!     post(handle_generate).layer(middleware::from_fn_with_state(limiter, enforce_rate_limit)),
//! )
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Request count inside one live window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub count: u32,
    pub resets_at: Instant,
}

// ────────────────────────────────────────────────────────────────────────────
// Store
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Current window for `key`, or `None` when there is no live window.
    async fn get(&self, key: &str) -> Option<WindowCount>;

    /// Counts one request, opening a fresh `window` if none is live.
    async fn increment(&self, key: &str, window: Duration) -> WindowCount;

    /// Drops every elapsed window and returns how many were removed.
    async fn expire(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, WindowCount>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> Option<WindowCount> {
        let windows = self.windows.lock().await;
        windows
            .get(key)
            .copied()
            .filter(|w| w.resets_at > Instant::now())
    }

    async fn increment(&self, key: &str, window: Duration) -> WindowCount {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let entry = windows.entry(key.to_string()).or_insert(WindowCount {
            count: 0,
            resets_at: now + window,
        });
        if entry.resets_at <= now {
            *entry = WindowCount {
                count: 0,
                resets_at: now + window,
            };
        }
        entry.count += 1;
        *entry
    }

    async fn expire(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|_, w| w.resets_at > now);
        before - windows.len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Limiter
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
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

    /// Admits one request for `key`, or returns `AppError::RateLimited` with the
    /// seconds left in the current window.
    pub async fn check(&self, key: &str) -> Result<(), AppError> {
        if let Some(current) = self.store.get(key).await {
            if current.count >= self.max_requests {
                let remaining = current.resets_at.saturating_duration_since(Instant::now());
                return Err(AppError::RateLimited {
                    retry_after_secs: ceil_secs(remaining),
                });
            }
        }

        let counted = self.store.increment(key, self.window).await;
        debug!("Rate limit {}/{} for {key}", counted.count, self.max_requests);
        Ok(())
    }

    /// Removes elapsed windows from the store.
    pub async fn sweep(&self) -> usize {
        self.store.expire().await
    }
}

/// Whole seconds, rounded up, never below one.
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

// ────────────────────────────────────────────────────────────────────────────
// Middleware
// ────────────────────────────────────────────────────────────────────────────

pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(request.headers(), connect_info.as_ref().map(|ci| &ci.0));

    if let Err(e) = limiter.check(&ip).await {
        warn!("Rate limit exceeded for {ip}");
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Client address for rate limiting: first `x-forwarded-for` entry, then
/// `x-real-ip`, then the socket peer, else `"unknown"`.
pub fn client_ip(headers: &HeaderMap, peer: Option<&SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header("x-forwarded-for")
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }
    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_string();
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(
            Arc::new(InMemoryRateLimitStore::new()),
            max_requests,
            Duration::from_secs(window_secs),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocks_after_limit_with_retry_after() {
        let limiter = limiter(2, 60);
        assert!(limiter.check("1.2.3.4").await.is_ok());
        assert!(limiter.check("1.2.3.4").await.is_ok());

        tokio::time::advance(Duration::from_millis(10_500)).await;
        match limiter.check("1.2.3.4").await {
            Err(AppError::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 50),
            other => panic!("expected rate limit, got {other:?}"),
        }

        // Other clients are unaffected.
        assert!(limiter.check("5.6.7.8").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = limiter(1, 60);
        assert!(limiter.check("ip").await.is_ok());
        assert!(limiter.check("ip").await.is_err());

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(limiter.check("ip").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_requests_are_not_counted() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let limiter = RateLimiter::new(store.clone(), 1, Duration::from_secs(60));
        limiter.check("ip").await.unwrap();
        for _ in 0..3 {
            assert!(limiter.check("ip").await.is_err());
        }
        assert_eq!(store.get("ip").await.map(|w| w.count), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_drops_elapsed_windows() {
        let store = InMemoryRateLimitStore::new();
        store.increment("a", Duration::from_secs(10)).await;
        store.increment("b", Duration::from_secs(100)).await;

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.expire().await, 1);
        assert!(store.get("a").await.is_none());
        assert!(store.get("b").await.is_some());
    }

    #[test]
    fn test_client_ip_precedence() {
        let peer: SocketAddr = "10.0.0.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, None), "unknown");
        assert_eq!(client_ip(&headers, Some(&peer)), "10.0.0.9");

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.7"));
        assert_eq!(client_ip(&headers, Some(&peer)), "198.51.100.7");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.5 , 70.41.3.18"),
        );
        assert_eq!(client_ip(&headers, Some(&peer)), "203.0.113.5");
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::from_millis(49_500)), 50);
        assert_eq!(ceil_secs(Duration::from_secs(3)), 3);
        assert_eq!(ceil_secs(Duration::ZERO), 1);
    }
}
