//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.
//! The cache and limiter take their parameters as constructor arguments; only
//! the binary reads the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default cache TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Admissions allowed per client and route within one window
    pub rate_limit_max_requests: u32,
    /// Rate limit window in milliseconds
    pub rate_limit_window_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds, 0 disables the task
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default cache TTL in milliseconds (default: 300000)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Requests per window (default: 60)
    /// - `RATE_LIMIT_WINDOW_MS` - Window length in milliseconds (default: 60000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL_SECS` - Cache sweep frequency in seconds (default: 0, disabled)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            sweep_interval: env_or("SWEEP_INTERVAL_SECS", defaults.sweep_interval),
        }
    }

    /// Default cache TTL as a duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Rate limit window as a duration.
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

/// Reads and parses `name`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,
            rate_limit_max_requests: 60,
            rate_limit_window_ms: 60_000,
            server_port: 3000,
            sweep_interval: 0,
        }
    }
}
