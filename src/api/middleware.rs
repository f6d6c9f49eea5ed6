//! Rate Limit Middleware
//!
//! Admission check run before every limited route.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::handlers::AppState;
use crate::error::Error;
use crate::limiter::scoped_key;

/// Header carrying the caller's identity.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Identity used when a request carries no client id.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// Response header with the quota per window.
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Response header with the admissions left after this request.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Returns the first path segment, which names the quota a route draws from.
pub fn route_category(path: &str) -> &str {
    path.split('/').find(|segment| !segment.is_empty()).unwrap_or("root")
}

/// Admits or rejects a request based on its client id and route category.
///
/// Rejected requests never reach the handler and receive a 429 with a
/// `Retry-After` header. Admitted responses carry the quota headers.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = request
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS_CLIENT);
    let key = scoped_key(client, route_category(request.uri().path()));

    let (limit, remaining) = {
        let mut limiter = state.limiter.write().await;
        if !limiter.is_allowed(&key) {
            let retry_after = limiter.retry_after(&key);
            debug!(key = %key, ?retry_after, "request rejected by rate limiter");
            return Error::RateLimited { retry_after }.into_response();
        }
        (limiter.max_requests(), limiter.remaining_requests(&key))
    };

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(HeaderName::from_static(LIMIT_HEADER), HeaderValue::from(limit));
    headers.insert(
        HeaderName::from_static(REMAINING_HEADER),
        HeaderValue::from(remaining),
    );
    response
}
