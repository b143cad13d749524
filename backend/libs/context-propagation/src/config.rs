//! Context propagation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout used when resetting the breaker runtime, in seconds
pub const DEFAULT_RESET_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Register the concurrency strategy automatically at startup
    pub auto: bool,

    /// Upper bound on waiting for the runtime to reset
    pub reset_timeout_secs: u64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            auto: true,
            reset_timeout_secs: DEFAULT_RESET_TIMEOUT_SECS,
        }
    }
}

impl PropagationConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `CORE_HYSTRIX_AUTO`: register the strategy at startup (default: true)
    /// - `CORE_HYSTRIX_RESET_TIMEOUT_SECS`: reset timeout (default: 10)
    pub fn from_env() -> Self {
        let auto = std::env::var("CORE_HYSTRIX_AUTO")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);

        let reset_timeout_secs = std::env::var("CORE_HYSTRIX_RESET_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_RESET_TIMEOUT_SECS);

        Self {
            auto,
            reset_timeout_secs,
        }
    }

    pub fn reset_timeout(&self) -> Duration {
        Duration::from_secs(self.reset_timeout_secs)
    }
}
