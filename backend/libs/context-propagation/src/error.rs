use std::time::Duration;

/// Failures of the breaker-runtime plugin registry.
///
/// These indicate miswiring of the process and are meant to be propagated to
/// the caller, not logged and ignored.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Concurrency strategy {existing} is already registered, refusing {attempted}")]
    AlreadyRegistered {
        existing: &'static str,
        attempted: &'static str,
    },
    #[error("Timed out after {0:?} waiting to reset plugins")]
    ResetTimedOut(Duration),
}
