//! Error types
//!
//! Construction-time configuration errors and HTTP-facing errors, using thiserror.
//! The cache and limiter operations themselves never fail.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

// == Error Enum ==
/// Unified error type for the crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid construction parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key not found (or expired) in the cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Caller exhausted its quota
    #[error("Rate limit exceeded, retry after {} seconds", display_secs(.retry_after))]
    RateLimited {
        /// Time until the oldest admission leaves the window
        retry_after: Duration,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rounds a wait up to whole seconds, never below one.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

fn display_secs(retry_after: &Duration) -> u64 {
    retry_after_secs(*retry_after)
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::InvalidConfig(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let Error::RateLimited { retry_after } = &self {
            let secs = retry_after_secs(*retry_after);
            let body = Json(json!({
                "error": self.to_string(),
                "retry_after_secs": secs,
            }));
            let mut response = (status, body).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            return response;
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;
