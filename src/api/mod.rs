//! API Module
//!
//! HTTP handlers, routing and rate limiting for the cache service.
//!
//! # Endpoints
//! - `PUT /cache` - Store a JSON value
//! - `DELETE /cache` - Clear the cache
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `GET /stats` - Get cache statistics
//! - `GET /limits/:key` - Inspect a quota
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
