//! # HTTP API
//!
//! The axum server around the progression engine. State is one shared
//! [`AppState`]: the profile repository behind an async mutex (serializing
//! read-modify-write sequences), the static catalog, the reward policy, the
//! session table, and the per-IP rate limiter.

pub mod auth;
pub mod error;
pub mod limit;
pub mod routes;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::Router;
use chrono::Utc;
use finlearn_core::{Catalog, ProfileRepository, RewardPolicy, UserId};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use error::ApiError;
use limit::IpRateLimiter;

// =============================================================================
// STATE
// =============================================================================

/// Everything the handlers share.
pub struct AppState {
    pub repo: Mutex<Box<dyn ProfileRepository>>,
    pub catalog: Catalog,
    pub policy: RewardPolicy,
    pub sessions: Mutex<BTreeMap<String, UserId>>,
    pub limiter: IpRateLimiter,
    pub started: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(repo: Box<dyn ProfileRepository>, config: &ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            repo: Mutex::new(repo),
            catalog: Catalog::default(),
            policy: RewardPolicy::default(),
            sessions: Mutex::new(BTreeMap::new()),
            limiter: limit::build_limiter(config.rate_limit_per_minute),
            started: Instant::now(),
        })
    }
}

/// Wall-clock entry point. Time never originates in the core crate.
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// =============================================================================
// ROUTER
// =============================================================================

/// Assemble the full application router.
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(auth::auth_routes())
        .merge(routes::world_routes())
        .merge(routes::user_routes())
        .merge(routes::gamification_routes())
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    limit::require_within_limit,
                )),
        )
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route")
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

// =============================================================================
// SERVER LIFECYCLE
// =============================================================================

/// Bind and run the server until ctrl-c.
///
/// The repository is owned by the server state and dropped (closing any
/// database handle) when the last request finishes after shutdown.
pub async fn serve(
    addr: SocketAddr,
    repo: Box<dyn ProfileRepository>,
    config: &ServerConfig,
) -> std::io::Result<()> {
    let state = AppState::new(repo, config);
    let app = router(state, config);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "finlearn server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped, repository closed");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => error!(%err, "failed to listen for shutdown signal"),
    }
}
