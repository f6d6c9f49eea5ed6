//! API Handlers
//!
//! HTTP request handlers for the cache and quota endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::TtlCache;
use crate::clock::{duration_ms, SharedClock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::limiter::RateLimiter;
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, LimitResponse, SetRequest,
    SetResponse, StatsResponse,
};

/// Cache of JSON payloads served by the API.
pub type JsonCache = TtlCache<Value, SharedClock>;

/// Limiter guarding the API routes.
pub type ApiLimiter = RateLimiter<SharedClock>;

/// Application state shared across all handlers.
///
/// Holds one cache and one limiter, each behind its own lock. Both are built
/// once at startup and handed to the router; nothing is global.
#[derive(Clone)]
pub struct AppState {
    /// Memoized JSON payloads
    pub cache: Arc<RwLock<JsonCache>>,
    /// Per-client, per-route admission control
    pub limiter: Arc<RwLock<ApiLimiter>>,
}

impl AppState {
    /// Creates a new AppState from already built components.
    pub fn new(cache: JsonCache, limiter: ApiLimiter) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            limiter: Arc::new(RwLock::new(limiter)),
        }
    }

    /// Creates a new AppState from configuration on the system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a new AppState from configuration, reading time from `clock`.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the rate limit settings are zero.
    pub fn with_clock(config: &Config, clock: SharedClock) -> Result<Self> {
        let cache = TtlCache::with_clock(config.default_ttl(), clock.clone());
        let limiter = RateLimiter::with_clock(
            config.rate_limit_max_requests,
            config.rate_limit_window(),
            clock,
        )?;
        Ok(Self::new(cache, limiter))
    }
}

/// Handler for PUT /cache
///
/// Stores a JSON value under a key with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(Error::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), req.value, req.ttl_ms.map(Duration::from_millis));

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
///
/// Returns the live value for a key; an expired entry is evicted and reported
/// as not found.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: reads may evict and always update counters
    let mut cache = state.cache.write().await;
    let (value, ttl_remaining) = cache
        .get_with_ttl(&key)
        .map(|(value, ttl)| (value.clone(), ttl))
        .ok_or_else(|| Error::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value, duration_ms(ttl_remaining))))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.write().await.delete(&key);
    Json(DeleteResponse { key, deleted })
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.write().await.clear();
    Json(ClearResponse::cleared())
}

/// Handler for GET /stats
///
/// Sweeps expired entries, then reports the cache contents and counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.write().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /limits/:key
///
/// Reports the quota state of a limiter key without consuming an admission.
pub async fn limit_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<LimitResponse> {
    let mut limiter = state.limiter.write().await;
    let remaining = limiter.remaining_requests(&key);

    Json(LimitResponse {
        limit: limiter.max_requests(),
        remaining,
        reset_time: limiter.reset_time(&key),
        retry_after_ms: duration_ms(limiter.retry_after(&key)),
        key,
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
