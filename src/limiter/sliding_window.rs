//! Sliding Window Limiter
//!
//! Per-key admission control over a rolling time window.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::clock::{duration_ms, Clock, SystemClock};
use crate::error::{Error, Result};

// == Rate Limiter ==
/// Admits at most `max_requests` actions per key within any trailing window.
///
/// Only admitted requests are recorded. A rejected attempt leaves the key's
/// quota untouched, so a client that keeps retrying while blocked is not
/// pushed further into the future.
#[derive(Debug)]
pub struct RateLimiter<C = SystemClock> {
    /// Admission timestamps per key (Unix milliseconds, oldest first)
    records: HashMap<String, Vec<u64>>,
    /// Quota per window
    max_requests: u32,
    /// Window length in milliseconds
    window_ms: u64,
    /// Time source
    clock: C,
}

impl RateLimiter<SystemClock> {
    // == Constructor ==
    /// Creates a limiter on the system clock.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if `max_requests` is zero or `window`
    /// is shorter than one millisecond.
    pub fn new(max_requests: u32, window: Duration) -> Result<Self> {
        Self::with_clock(max_requests, window, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Creates a limiter reading time from `clock`.
    pub fn with_clock(max_requests: u32, window: Duration, clock: C) -> Result<Self> {
        if max_requests == 0 {
            return Err(Error::InvalidConfig(
                "max_requests must be greater than zero".to_string(),
            ));
        }

        let window_ms = duration_ms(window);
        if window_ms == 0 {
            return Err(Error::InvalidConfig(
                "window must be at least one millisecond".to_string(),
            ));
        }

        Ok(Self {
            records: HashMap::new(),
            max_requests,
            window_ms,
            clock,
        })
    }

    /// Returns the quota per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Returns the window length.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    // == Is Allowed ==
    /// Decides whether an action for `key` may proceed now.
    ///
    /// Prunes timestamps that have left the window; if the remaining count
    /// has reached the quota the call is rejected and nothing is recorded,
    /// otherwise the current time is appended.
    pub fn is_allowed(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let window_ms = self.window_ms;
        let max_requests = self.max_requests as usize;

        let timestamps = self.records.entry(key.to_string()).or_default();
        prune(timestamps, now, window_ms);

        // max_requests >= 1, so an emptied record always admits and never
        // stays stored empty
        if timestamps.len() >= max_requests {
            debug!(key, limit = max_requests, "rate limit exceeded");
            return false;
        }

        timestamps.push(now);
        true
    }

    // == Remaining Requests ==
    /// Returns how many more admissions `key` has in the current window.
    ///
    /// The pruned record is written back, and a key whose admissions have
    /// all aged out is dropped; admission state is unchanged.
    pub fn remaining_requests(&mut self, key: &str) -> u32 {
        let now = self.clock.now_ms();
        let window_ms = self.window_ms;

        let used = match self.records.get_mut(key) {
            Some(timestamps) => {
                prune(timestamps, now, window_ms);
                timestamps.len()
            }
            None => 0,
        };
        if used == 0 {
            self.records.remove(key);
        }

        let used = u32::try_from(used).unwrap_or(u32::MAX);
        self.max_requests.saturating_sub(used)
    }

    // == Reset Time ==
    /// Returns when the oldest recorded admission for `key` leaves the
    /// window, in Unix milliseconds, or 0 if nothing is recorded.
    ///
    /// Computed over the stored record as is. Timestamps that have aged out
    /// but were not yet pruned by `is_allowed` or `remaining_requests` still
    /// count, so the result can lie in the past.
    pub fn reset_time(&self, key: &str) -> u64 {
        self.records
            .get(key)
            .and_then(|timestamps| timestamps.iter().min())
            .map_or(0, |oldest| oldest.saturating_add(self.window_ms))
    }

    // == Retry After ==
    /// Returns how long until `key` gains a slot, zero if the reset time has
    /// already passed or nothing is recorded.
    pub fn retry_after(&self, key: &str) -> Duration {
        let reset = self.reset_time(key);
        Duration::from_millis(reset.saturating_sub(self.clock.now_ms()))
    }

    // == Reset ==
    /// Forgets every admission recorded for `key`.
    pub fn reset(&mut self, key: &str) -> bool {
        self.records.remove(key).is_some()
    }

    /// Forgets every admission for every key.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns the number of keys with a stored record.
    pub fn tracked_keys(&self) -> usize {
        self.records.len()
    }
}

/// Drops timestamps with `now - t >= window_ms`.
fn prune(timestamps: &mut Vec<u64>, now: u64, window_ms: u64) {
    timestamps.retain(|&t| now.saturating_sub(t) < window_ms);
}
