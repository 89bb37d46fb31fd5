//! # Rate Limiting
//!
//! Per-IP token bucket in front of every route. Connections carry their peer
//! address via [`ConnectInfo`]; transports without one (in-process test
//! clients) fall back to loopback so they share a single bucket.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

use super::error::ApiError;
use super::AppState;

/// Keyed limiter shared by all connections.
pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

const FALLBACK_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Build a limiter allowing `per_minute` requests per client IP.
pub fn build_limiter(per_minute: u32) -> IpRateLimiter {
    let quota = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    RateLimiter::keyed(Quota::per_minute(quota))
}

/// Middleware rejecting callers that exhausted their bucket.
pub async fn require_within_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(FALLBACK_IP, |info| info.0.ip());

    if state.limiter.check_key(&ip).is_err() {
        return ApiError::RateLimited.into_response();
    }
    next.run(req).await
}
