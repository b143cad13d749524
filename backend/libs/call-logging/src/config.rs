//! Call logging configuration

use crate::policy::InterceptionPolicy;
use crate::redaction::RedactionPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Install call logging at startup
    pub auto: bool,

    /// Log intercepted calls even when the target's logger is below debug
    pub override_log_config: bool,

    /// Names redacted on top of the built-in sensitive names
    pub additional_sensitive_fields: Vec<String>,

    /// Type path prefixes whose loggers are active; empty means all
    pub debug_prefixes: Vec<String>,

    /// Type path prefixes to intercept; empty means all
    pub include_prefixes: Vec<String>,

    /// Type path prefixes never intercepted
    pub exclude_prefixes: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            auto: true,
            override_log_config: true,
            additional_sensitive_fields: Vec::new(),
            debug_prefixes: Vec::new(),
            include_prefixes: Vec::new(),
            exclude_prefixes: Vec::new(),
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl LoggingConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `CORE_LOGGING_AUTO`: install call logging (default: true)
    /// - `CORE_LOGGING_OVERRIDE`: log regardless of logger level (default: true)
    /// - `CORE_LOGGING_SENSITIVE_FIELDS`: extra sensitive names, comma separated
    /// - `CORE_LOGGING_DEBUG_PREFIXES`: active logger prefixes, comma separated
    /// - `CORE_LOGGING_INCLUDE`: intercepted type prefixes, comma separated
    /// - `CORE_LOGGING_EXCLUDE`: excluded type prefixes, comma separated
    pub fn from_env() -> Self {
        Self {
            auto: env_flag("CORE_LOGGING_AUTO", true),
            override_log_config: env_flag("CORE_LOGGING_OVERRIDE", true),
            additional_sensitive_fields: env_list("CORE_LOGGING_SENSITIVE_FIELDS"),
            debug_prefixes: env_list("CORE_LOGGING_DEBUG_PREFIXES"),
            include_prefixes: env_list("CORE_LOGGING_INCLUDE"),
            exclude_prefixes: env_list("CORE_LOGGING_EXCLUDE"),
        }
    }

    pub fn interception_policy(&self) -> InterceptionPolicy {
        InterceptionPolicy::new()
            .include(self.include_prefixes.iter().cloned())
            .exclude(self.exclude_prefixes.iter().cloned())
    }

    pub fn redaction_policy(&self) -> RedactionPolicy {
        RedactionPolicy::with_additional(self.additional_sensitive_fields.iter().cloned())
    }
}
