/// Entry, exit and failure logging around intercepted calls
///
/// Logging never changes what the caller sees: the call's value, error or
/// panic is passed through untouched, and anything that goes wrong while
/// logging is downgraded to a warning.
use crate::config::LoggingConfig;
use crate::deferred::Deferred;
use crate::error::LoggingError;
use crate::join_point::JoinPoint;
use crate::join_point_logger::{JoinPointLogger, StandardJoinPointLogger};
use crate::logger::{CallLogger, LoggerFactory, TracingLoggerFactory};
use crate::params::CoreParameterNameResolver;
use crate::policy::InterceptionPolicy;
use crate::redaction::RedactionPolicy;
use crate::signature::MethodLookup;
use crate::value::{short_type_name, Loggable};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

const ENTRY_FAILED: &str = "Failed to log method entry.";
const EXIT_FAILED: &str = "Failed to log method exit.";
const EXCEPTION_FAILED: &str = "Failed to log method exception";

/// Failure kind reported for calls that panicked
const PANIC_KIND: &str = "panic";

pub struct CoreLoggerAdvice {
    join_point_logger: Arc<dyn JoinPointLogger>,
    loggers: Arc<dyn LoggerFactory>,
    policy: InterceptionPolicy,
    override_log_config: AtomicBool,
}

impl CoreLoggerAdvice {
    /// Advice with the default policy and the level override switched on
    pub fn new(
        join_point_logger: Arc<dyn JoinPointLogger>,
        loggers: Arc<dyn LoggerFactory>,
    ) -> Self {
        debug!("Initialised CoreLoggerAdvice");
        Self {
            join_point_logger,
            loggers,
            policy: InterceptionPolicy::default(),
            override_log_config: AtomicBool::new(true),
        }
    }

    /// Standard rendering, tracing-backed loggers and the policy and override
    /// settings from `config`, or `None` when call logging is disabled.
    ///
    /// Redaction uses the process-wide [`RedactionPolicy`]. The policy built
    /// from `config` becomes the process-wide one unless another was already
    /// installed, in which case the installed one stays in force.
    pub fn from_config(config: &LoggingConfig, methods: Arc<dyn MethodLookup>) -> Option<Self> {
        if !config.auto {
            info!("Automatic call logging disabled");
            return None;
        }

        let join_point_logger = StandardJoinPointLogger::new(
            Arc::new(CoreParameterNameResolver::new(methods)),
            process_redaction_policy(config),
        );
        let loggers =
            TracingLoggerFactory::with_debug_prefixes(config.debug_prefixes.iter().cloned());

        let advice = Self::new(Arc::new(join_point_logger), Arc::new(loggers))
            .with_policy(config.interception_policy());
        advice.set_override_log_config(config.override_log_config);
        Some(advice)
    }

    /// Replace the source of per-type loggers
    pub fn with_loggers(mut self, loggers: Arc<dyn LoggerFactory>) -> Self {
        self.loggers = loggers;
        self
    }

    pub fn with_policy(mut self, policy: InterceptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &InterceptionPolicy {
        &self.policy
    }

    /// Whether calls on `type_name` should be wrapped at all
    pub fn intercepts(&self, type_name: &str) -> bool {
        self.policy.matches(type_name)
    }

    /// When set, calls are logged whatever level the target's logger has
    pub fn set_override_log_config(&self, enabled: bool) {
        self.override_log_config.store(enabled, Ordering::Relaxed);
    }

    pub fn override_log_config(&self) -> bool {
        self.override_log_config.load(Ordering::Relaxed)
    }

    fn is_debug_enabled(&self, logger: &dyn CallLogger) -> bool {
        if self.override_log_config() {
            trace!("Debug over-ride enabled");
            return true;
        }
        trace!("Debug over-ride disabled");
        logger.is_debug_enabled()
    }

    /// Logger for calls on `target_type`, if logging is active for it
    pub fn active_logger(&self, target_type: &str) -> Option<Arc<dyn CallLogger>> {
        let logger = self.loggers.logger(target_type);
        if self.is_debug_enabled(logger.as_ref()) {
            Some(logger)
        } else {
            None
        }
    }

    /// Run a synchronous call with logging.
    ///
    /// A panic inside `proceed` is logged as a failure and then resumed.
    pub fn around<T, E, F>(&self, join_point: &JoinPoint<'_>, proceed: F) -> Result<T, E>
    where
        T: Loggable,
        E: fmt::Display,
        F: FnOnce() -> Result<T, E>,
    {
        let Some(logger) = self.active_logger(join_point.target_type()) else {
            return proceed();
        };

        self.log_entry(logger.as_ref(), join_point);
        let outcome = panic::catch_unwind(AssertUnwindSafe(proceed));
        self.finish(logger.as_ref(), join_point, outcome)
    }

    /// Async counterpart of [`CoreLoggerAdvice::around`]
    pub async fn around_async<T, E, Fut>(
        &self,
        join_point: JoinPoint<'_>,
        proceed: Fut,
    ) -> Result<T, E>
    where
        T: Loggable,
        E: fmt::Display,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.active_logger(join_point.target_type()) {
            Some(logger) => self.logged_async(logger, join_point, proceed).await,
            None => proceed.await,
        }
    }

    /// Log an async call against a logger already found active with
    /// [`CoreLoggerAdvice::active_logger`]
    pub async fn logged_async<T, E, Fut>(
        &self,
        logger: Arc<dyn CallLogger>,
        join_point: JoinPoint<'_>,
        proceed: Fut,
    ) -> Result<T, E>
    where
        T: Loggable,
        E: fmt::Display,
        Fut: Future<Output = Result<T, E>>,
    {
        self.log_entry(logger.as_ref(), &join_point);
        let outcome = AssertUnwindSafe(proceed).catch_unwind().await;
        self.finish(logger.as_ref(), &join_point, outcome)
    }

    /// Run a call whose value is delivered later.
    ///
    /// The exit line is written once, when the value is first delivered to
    /// whoever awaits the returned handle; nothing is evaluated on the
    /// caller's behalf.
    pub fn around_deferred<T, E, F>(
        &self,
        join_point: &JoinPoint<'_>,
        proceed: F,
    ) -> Result<Deferred<T>, E>
    where
        T: Loggable + Clone + Send + Sync + 'static,
        E: fmt::Display,
        F: FnOnce() -> Result<Deferred<T>, E>,
    {
        let Some(logger) = self.active_logger(join_point.target_type()) else {
            return proceed();
        };

        self.log_entry(logger.as_ref(), join_point);
        match panic::catch_unwind(AssertUnwindSafe(proceed)) {
            Ok(Ok(deferred)) => {
                let join_point_logger = self.join_point_logger.clone();
                let declaring_type = join_point.declaring_type().to_string();
                let member = join_point.member().to_string();

                Ok(deferred.observe(move |value| {
                    try_log(EXIT_FAILED, || {
                        join_point_logger.log_deferred_exit(
                            logger.as_ref(),
                            &declaring_type,
                            &member,
                            value,
                        )
                    })
                }))
            }
            Ok(Err(error)) => {
                self.log_failure(logger.as_ref(), join_point, &error, error_kind::<E>());
                Err(error)
            }
            Err(payload) => self.log_panic_and_resume(logger.as_ref(), join_point, payload),
        }
    }

    fn finish<T, E>(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
        outcome: Result<Result<T, E>, Box<dyn Any + Send>>,
    ) -> Result<T, E>
    where
        T: Loggable,
        E: fmt::Display,
    {
        match outcome {
            Ok(Ok(value)) => {
                try_log(EXIT_FAILED, || {
                    self.join_point_logger.log_method_exit(logger, join_point, &value)
                });
                Ok(value)
            }
            Ok(Err(error)) => {
                self.log_failure(logger, join_point, &error, error_kind::<E>());
                Err(error)
            }
            Err(payload) => self.log_panic_and_resume(logger, join_point, payload),
        }
    }

    fn log_entry(&self, logger: &dyn CallLogger, join_point: &JoinPoint<'_>) {
        try_log(ENTRY_FAILED, || {
            self.join_point_logger.log_method_entry(logger, join_point)
        });
    }

    fn log_failure(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
        error: &dyn fmt::Display,
        error_type: &str,
    ) {
        try_log(EXCEPTION_FAILED, || {
            self.join_point_logger
                .log_exception(logger, join_point, error, error_type)
        });
    }

    fn log_panic_and_resume(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
        payload: Box<dyn Any + Send>,
    ) -> ! {
        let message = panic_message(&*payload);
        self.log_failure(logger, join_point, &message, PANIC_KIND);
        panic::resume_unwind(payload)
    }
}

fn process_redaction_policy(config: &LoggingConfig) -> Arc<RedactionPolicy> {
    if let Err(rejected) = RedactionPolicy::install_global(config.redaction_policy()) {
        let installed = RedactionPolicy::global();
        if installed.names() != rejected.names() {
            warn!(
                installed = ?installed.names(),
                "Redaction policy already installed; configured sensitive fields ignored"
            );
        }
    }
    RedactionPolicy::global()
}

/// Run one logging step, turning an error or a panic into a warning
fn try_log<F>(warning: &'static str, log: F)
where
    F: FnOnce() -> Result<(), LoggingError>,
{
    match panic::catch_unwind(AssertUnwindSafe(log)) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => warn!(%error, "{}", warning),
        Err(payload) => warn!(error = %panic_message(&*payload), "{}", warning),
    }
}

fn error_kind<E>() -> &'static str {
    short_type_name(std::any::type_name::<E>())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::new()
    }
}
