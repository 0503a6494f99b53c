//! HTTP routing configuration with optional per-client rate limiting.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderName, HeaderValue, Request, Response, StatusCode, header},
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
};
use governor::{Quota, RateLimiter};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, warn};

use crate::app::{AppConfig, AppState};
use crate::domain::{ConfigError, ErrorDetail, RateLimitResponse};

use super::handlers::{
    create_item_handler, delete_item_handler, get_item_handler, health_check_handler,
    list_items_handler, metrics_handler, root_handler, update_item_handler,
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second for item endpoints
    pub general_rps: u32,
    /// Burst size for item endpoints
    pub general_burst: u32,
    /// Requests per second for `/`, `/health` and `/metrics`
    pub health_rps: u32,
    /// Burst size for `/`, `/health` and `/metrics`
    pub health_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general_rps: 10,
            general_burst: 20,
            health_rps: 100,
            health_burst: 100,
        }
    }
}

impl RateLimitConfig {
    /// Every quota must be non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("RATE_LIMIT_RPS", self.general_rps),
            ("RATE_LIMIT_BURST", self.general_burst),
            ("RATE_LIMIT_HEALTH_RPS", self.health_rps),
            ("RATE_LIMIT_HEALTH_BURST", self.health_burst),
        ];
        match checks.iter().find(|(_, value)| *value == 0) {
            Some((key, _)) => Err(ConfigError::InvalidValue {
                key: (*key).to_string(),
                message: "must be greater than 0".to_string(),
            }),
            None => Ok(()),
        }
    }
}

type KeyedLimiter = RateLimiter<
    IpAddr,
    governor::state::keyed::DashMapStateStore<IpAddr>,
    governor::clock::DefaultClock,
>;

/// Shared rate limiter state (keyed by client IP so one client cannot starve the rest)
pub struct RateLimitState {
    items_limiter: KeyedLimiter,
    health_limiter: KeyedLimiter,
    config: RateLimitConfig,
}

impl RateLimitState {
    /// Zero quotas are clamped to 1; call [`RateLimitConfig::validate`] to reject them instead.
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = |rps: u32, burst: u32| {
            Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN))
                .allow_burst(NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN))
        };

        Self {
            items_limiter: RateLimiter::dashmap(quota(config.general_rps, config.general_burst)),
            health_limiter: RateLimiter::dashmap(quota(config.health_rps, config.health_burst)),
            config,
        }
    }
}

/// Extract client IP from request (X-Forwarded-For, X-Real-IP, or ConnectInfo).
/// Falls back to 0.0.0.0 when unknown; unknown clients share one bucket.
fn client_ip_from_request<B>(request: &Request<B>) -> IpAddr {
    let header_ip = |name: &str, first_only: bool| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| if first_only { s.split(',').next() } else { Some(s) })
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for", true)
        .or_else(|| header_ip("x-real-ip", false))
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Whole seconds to advertise in `Retry-After`, rounded up so clients never
/// retry before the bucket refills.
fn retry_after_secs(wait_time: Duration) -> u64 {
    wait_time.as_secs() + u64::from(wait_time.subsec_nanos() > 0)
}

/// Rate limit middleware for item endpoints
async fn rate_limit_items_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    enforce(
        &rate_limit.items_limiter,
        rate_limit.config.general_rps,
        request,
        next,
    )
    .await
}

/// Rate limit middleware for the meta endpoints (`/`, `/health`, `/metrics`)
async fn rate_limit_health_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    enforce(
        &rate_limit.health_limiter,
        rate_limit.config.health_rps,
        request,
        next,
    )
    .await
}

async fn enforce(
    limiter: &KeyedLimiter,
    limit: u32,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);

    match limiter.check_key(&client_ip) {
        Ok(_) => {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
            response
        }
        Err(not_until) => {
            let retry_after = retry_after_secs(not_until.wait_time_from(
                governor::clock::Clock::now(&governor::clock::DefaultClock::default()),
            ));
            warn!(client_ip = %client_ip, retry_after, "Rate limit exceeded");
            too_many_requests(limit, retry_after)
        }
    }
}

fn too_many_requests(limit: u32, retry_after: u64) -> Response<Body> {
    let body = RateLimitResponse {
        error: ErrorDetail {
            r#type: "rate_limited".to_string(),
            message: "Rate limit exceeded. Please slow down your requests.".to_string(),
            fields: Vec::new(),
        },
        retry_after,
    };

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u32));
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

fn build_router(
    app_state: Arc<AppState>,
    request_timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
) -> Router {
    let layers = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    let mut items_routes = Router::new()
        .route("/items", get(list_items_handler).post(create_item_handler))
        .route(
            "/items/{id}",
            get(get_item_handler)
                .put(update_item_handler)
                .delete(delete_item_handler),
        );

    let mut meta_routes = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check_handler))
        .route("/metrics", get(metrics_handler));

    if let Some(config) = rate_limit {
        let rate_limit_state = Arc::new(RateLimitState::new(config));
        items_routes = items_routes.layer(middleware::from_fn_with_state(
            Arc::clone(&rate_limit_state),
            rate_limit_items_middleware,
        ));
        meta_routes = meta_routes.layer(middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_health_middleware,
        ));
    }

    Router::new()
        .merge(items_routes)
        .merge(meta_routes)
        .layer(layers)
        .with_state(app_state)
}

/// Create router without rate limiting
pub fn create_router(app_state: Arc<AppState>) -> Router {
    build_router(app_state, DEFAULT_REQUEST_TIMEOUT, None)
}

/// Create router with rate limiting enabled
pub fn create_router_with_rate_limit(app_state: Arc<AppState>, config: RateLimitConfig) -> Router {
    build_router(app_state, DEFAULT_REQUEST_TIMEOUT, Some(config))
}

/// Create router with the timeout and rate limiting from process configuration
pub fn create_router_from_config(app_state: Arc<AppState>, config: &AppConfig) -> Router {
    build_router(
        app_state,
        config.request_timeout,
        config.rate_limit.clone(),
    )
}
