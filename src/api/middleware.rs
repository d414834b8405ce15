//! API Middleware (Auth, Rate Limiting, Logging)

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::types::{ApiError, ApiResponse};
use crate::utils::constants::DEFAULT_RATE_LIMIT_PER_MINUTE;

/// One caller's request window
struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window request limiter keyed by API key or caller IP.
/// In-process only; a multi-node deployment needs a shared store.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
}

/// Limiter verdict for a single request
pub struct Quota {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_secs: u64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Limit from RATE_LIMIT_PER_MINUTE over a fixed one-minute window
    pub fn from_env() -> Self {
        let max_requests = std::env::var("RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_PER_MINUTE);
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn check(&self, key: &str) -> Quota {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                count: 0,
                started: now,
            });

        if now.duration_since(entry.started) >= self.window {
            entry.count = 0;
            entry.started = now;
        }

        let reset_secs = self
            .window
            .saturating_sub(now.duration_since(entry.started))
            .as_secs();

        if entry.count >= self.max_requests {
            return Quota {
                allowed: false,
                remaining: 0,
                reset_secs,
            };
        }

        entry.count += 1;
        Quota {
            allowed: true,
            remaining: self.max_requests - entry.count,
            reset_secs,
        }
    }

    /// Drop windows idle for more than two full periods
    pub fn evict_stale(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window * 2);
    }
}

lazy_static::lazy_static! {
    pub static ref RATE_LIMITER: Arc<RateLimiter> = Arc::new(RateLimiter::from_env());
}

/// Routes that stay open for load balancer health checks
fn is_public_path(path: &str) -> bool {
    path == "/health" || path == "/api/health"
}

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("X-API-Key").and_then(|v| v.to_str().ok())
}

/// Issued keys are "pw_" followed by at least 16 characters;
/// "demo" works for evaluation.
fn key_is_acceptable(key: &str) -> bool {
    key == "demo" || (key.starts_with("pw_") && key.len() >= 19)
}

/// API key authentication. Anonymous requests pass through and share the
/// per-IP quota; a key that is present but malformed is rejected.
pub async fn auth_middleware(headers: HeaderMap, request: Request, next: Next) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    match api_key(&headers) {
        Some(key) if key_is_acceptable(key) => next.run(request).await,
        Some(_) => {
            warn!("🔒 Rejected request with malformed API key");
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::error(ApiError::unauthorized(), 0.0)),
            )
                .into_response()
        }
        None => next.run(request).await,
    }
}

/// Rate limiting per API key, falling back to the caller IP
pub async fn rate_limit_middleware(headers: HeaderMap, request: Request, next: Next) -> Response {
    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let quota_key = api_key(&headers)
        .map(str::to_string)
        .unwrap_or_else(|| caller_ip(&headers));

    let quota = RATE_LIMITER.check(&quota_key);

    if !quota.allowed {
        // Keys may be credentials, so only a prefix goes in the log
        let key_hint: String = quota_key.chars().take(6).collect();
        warn!(key_prefix = %key_hint, "Rate limit exceeded");

        let body = Json(ApiResponse::error(
            ApiError::rate_limited(quota.reset_secs),
            0.0,
        ));
        let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
        let headers = response.headers_mut();
        headers.insert("Retry-After", quota.reset_secs.into());
        headers.insert("X-RateLimit-Remaining", 0u32.into());
        headers.insert("X-RateLimit-Reset", quota.reset_secs.into());
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", quota.remaining.into());
    headers.insert("X-RateLimit-Reset", quota.reset_secs.into());
    response
}

/// Leftmost X-Forwarded-For hop, then x-real-ip plus "unknown" fallback
fn caller_ip(headers: &HeaderMap) -> String {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        warn!("💥 {} {} -> {} ({}ms)", method, path, status.as_u16(), latency_ms);
    } else {
        info!("{} {} -> {} ({}ms)", method, path, status.as_u16(), latency_ms);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_counts_down_within_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        let quota = limiter.check("client-a");
        assert!(quota.allowed);
        assert_eq!(quota.remaining, 2);
        assert!(quota.reset_secs <= 60);
    }

    #[test]
    fn test_quota_exhausts() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.check("client-b").allowed);
        assert!(limiter.check("client-b").allowed);
        let quota = limiter.check("client-b");
        assert!(!quota.allowed);
        assert_eq!(quota.remaining, 0);
    }

    #[test]
    fn test_quota_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check("client-c").allowed);
        assert!(!limiter.check("client-c").allowed);
        assert!(limiter.check("client-d").allowed);
    }

    #[test]
    fn test_evict_stale_keeps_live_windows() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        limiter.check("client-e");
        limiter.evict_stale();
        // Window is fresh, so the count survives eviction
        assert_eq!(limiter.check("client-e").remaining, 3);
    }

    #[test]
    fn test_key_shapes() {
        assert!(key_is_acceptable("pw_live_0123456789abcdef"));
        assert!(key_is_acceptable("demo"));
        assert!(!key_is_acceptable("pw_short"));
        assert!(!key_is_acceptable("sk_live_abc123"));
        assert!(!key_is_acceptable(""));
    }

    #[test]
    fn test_caller_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            "203.0.113.7, 10.0.0.2".parse().expect("header value"),
        );
        assert_eq!(caller_ip(&headers), "203.0.113.7");

        assert_eq!(caller_ip(&HeaderMap::new()), "unknown");
    }
}
