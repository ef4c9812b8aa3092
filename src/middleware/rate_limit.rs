use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::{net::SocketAddr, sync::Arc};
use tracing::warn;

use crate::drafts::dtos::ErrorResponse;

/// Fixed-window request counter per client IP.
#[derive(Clone)]
pub struct RateLimit {
    store: Arc<DashMap<String, RateLimitData>>,
    max_requests: u32,
    window_seconds: i64,
}

#[derive(Debug, Clone)]
struct RateLimitData {
    count: u32,
    window_start: DateTime<Utc>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            max_requests,
            window_seconds,
        }
    }

    /// Count one request for `key`; false once the window's budget is spent.
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> bool {
        let mut entry = self
            .store
            .entry(key.to_string())
            .or_insert_with(|| RateLimitData {
                count: 0,
                window_start: now,
            });
        let data = entry.value_mut();

        if now.signed_duration_since(data.window_start) >= Duration::seconds(self.window_seconds) {
            data.count = 0;
            data.window_start = now;
        }

        data.count += 1;
        data.count <= self.max_requests
    }
}

/// IP-based rate limiting middleware. Requests without connection info share
/// one bucket.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimit>,
    req: Request,
    next: Next,
) -> Response {
    let key = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !rate_limit.check(&key, Utc::now()) {
        warn!(client = %key, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Rate limit exceeded".to_string(),
            }),
        )
            .into_response();
    }

    next.run(req).await
}
