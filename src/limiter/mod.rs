//! Rate Limiter Module
//!
//! Sliding-window admission control keyed by opaque strings.

mod key;
mod sliding_window;


pub use key::{scoped_key, KEY_SEPARATOR};
pub use sliding_window::RateLimiter;
