use thiserror::Error;

/// Failure while producing or emitting a log line.
///
/// Never reaches the caller of an intercepted call; the advice downgrades it
/// to a warning.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to render {0}")]
    Format(&'static str),

    #[error("Logging failed: {0}")]
    Other(String),
}

/// Miss while looking up a concretely-declared method
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("No method {type_name}.{method} with parameter types ({parameter_types})")]
    NoSuchMethod {
        type_name: String,
        method: String,
        parameter_types: String,
    },

    #[error("No parameter names recorded for {0}")]
    NoParameterNames(String),
}
