//! Per-type loggers
//!
//! Call logs are attributed to the concrete type of the call's target. The
//! advice asks a [`LoggerFactory`] for the logger of that type and checks
//! whether it is active before rendering anything.

use std::sync::Arc;
use tracing::Level;

pub trait CallLogger: Send + Sync {
    fn is_debug_enabled(&self) -> bool;

    fn debug(&self, message: &str);
}

pub trait LoggerFactory: Send + Sync {
    fn logger(&self, type_name: &str) -> Arc<dyn CallLogger>;
}

/// Emits call logs as `tracing` debug events carrying the type name in the
/// `logger` field.
///
/// The level check runs against this crate's own callsite, so subscriber
/// directives see the `call_logging` target, never the logged type. Per-type
/// selection comes only from [`TracingLoggerFactory::with_debug_prefixes`].
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
    enabled: bool,
}

impl TracingLogger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CallLogger for TracingLogger {
    fn is_debug_enabled(&self) -> bool {
        self.enabled && tracing::enabled!(Level::DEBUG)
    }

    fn debug(&self, message: &str) {
        tracing::debug!(logger = %self.name, "{}", message);
    }
}

/// Hands out [`TracingLogger`]s. With a non-empty prefix list only types whose
/// name starts with one of the prefixes are active.
#[derive(Debug, Clone, Default)]
pub struct TracingLoggerFactory {
    debug_prefixes: Vec<String>,
}

impl TracingLoggerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            debug_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    fn is_enabled_for(&self, type_name: &str) -> bool {
        self.debug_prefixes.is_empty()
            || self
                .debug_prefixes
                .iter()
                .any(|prefix| type_name.starts_with(prefix.as_str()))
    }
}

impl LoggerFactory for TracingLoggerFactory {
    fn logger(&self, type_name: &str) -> Arc<dyn CallLogger> {
        Arc::new(TracingLogger {
            name: type_name.to_string(),
            enabled: self.is_enabled_for(type_name),
        })
    }
}
