/// Call logging with redaction of sensitive values
///
/// Wraps a call boundary so that entry, exit and failure are written to the
/// logger of the call's concrete target type, with every argument and return
/// value passed through a redactor first. Logging is strictly a side effect:
/// whatever goes wrong while producing a log line is reported as a warning
/// and the caller sees exactly what the call produced.
///
/// - **CoreLoggerAdvice**: the around-advice for sync, async and deferred calls
/// - **CallLoggingLayer**: the same advice as Tower middleware
/// - **StandardJoinPointLogger**: the `>>>` / `<<<` line layout
/// - **RedactionPolicy**: sensitive field names and embedded `name=value` pairs
/// - **Loggable / LogValue**: how a type describes itself in a log line
/// - **InterceptionPolicy**: which target types get wrapped
///
/// # Example: logging a call
///
/// ```rust
/// use call_logging::{
///     CoreLoggerAdvice, JoinPoint, Loggable, LoggingConfig, MethodSignature, MethodTable,
/// };
/// use std::sync::Arc;
///
/// let methods = Arc::new(MethodTable::new());
/// let advice = CoreLoggerAdvice::from_config(&LoggingConfig::default(), methods)
///     .expect("automatic logging is on by default");
/// let signature = MethodSignature::new("AuthService", "login", ["String", "String"])
///     .with_parameter_names(["username", "password"]);
///
/// let args: [&dyn Loggable; 2] = [&"bob", &"hunter2"];
/// let join_point = JoinPoint::new(&signature, "AuthServiceImpl", &args);
///
/// // Logs ` >>> AuthService.login(` with `password=[<*protected*>]`
/// let token: Result<String, std::convert::Infallible> =
///     advice.around(&join_point, || Ok("token".to_string()));
/// assert_eq!(token.unwrap(), "token");
/// ```
///
/// # Example: redacting query-string content
///
/// ```rust
/// use call_logging::RedactionPolicy;
///
/// let policy = RedactionPolicy::default();
/// assert_eq!(
///     policy.exclude_field_names(Some("user=bob&password=abc")).as_deref(),
///     Some("user=bob&password=<*protected*>")
/// );
/// assert_eq!(policy.exclude_field_names(None), None);
/// ```

pub mod advice;
pub mod config;
pub mod constants;
pub mod deferred;
pub mod error;
pub mod format;
pub mod join_point;
pub mod join_point_logger;
pub mod layer;
pub mod logger;
pub mod params;
pub mod policy;
pub mod redaction;
pub mod signature;
pub mod value;

// Re-export main types for convenience
pub use advice::CoreLoggerAdvice;
pub use config::LoggingConfig;
pub use deferred::Deferred;
pub use error::{LoggingError, LookupError};
pub use join_point::{JoinPoint, TargetType};
pub use join_point_logger::{JoinPointLogger, StandardJoinPointLogger};
pub use layer::{CallLoggingLayer, CallLoggingService};
pub use logger::{CallLogger, LoggerFactory, TracingLogger, TracingLoggerFactory};
pub use params::{CoreParameterNameResolver, ParameterNameResolver};
pub use policy::InterceptionPolicy;
pub use redaction::RedactionPolicy;
pub use signature::{MethodLookup, MethodSignature, MethodTable};
pub use value::{LogValue, Loggable, StructuredBuilder};
