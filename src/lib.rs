//! Quota Cache - in-memory TTL cache and sliding-window rate limiter
//!
//! Two independent, process-local components:
//! - [`TtlCache`]: memoization with lazy per-key expiry and an explicit sweep
//! - [`RateLimiter`]: per-key admission over a rolling time window
//!
//! The `api` module wires both into a small HTTP service.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use limiter::{scoped_key, RateLimiter};
pub use tasks::spawn_sweep_task;
