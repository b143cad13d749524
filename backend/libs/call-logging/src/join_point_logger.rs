/// Renders entry, exit and exception lines for an intercepted call
use crate::constants::{INDENT, NEW_LINE};
use crate::error::LoggingError;
use crate::format::{append_named_parameters, return_value_as_string};
use crate::join_point::JoinPoint;
use crate::logger::CallLogger;
use crate::params::ParameterNameResolver;
use crate::redaction::RedactionPolicy;
use crate::value::{LogValue, Loggable};
use std::fmt::{self, Write};
use std::sync::Arc;

pub trait JoinPointLogger: Send + Sync {
    /// Log a failure raised by the call
    fn log_exception(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
        error: &dyn fmt::Display,
        error_type: &str,
    ) -> Result<(), LoggingError>;

    /// Log the call with its named arguments
    fn log_method_entry(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
    ) -> Result<(), LoggingError>;

    /// Log an immediately available return value
    fn log_method_exit(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
        result: &dyn Loggable,
    ) -> Result<(), LoggingError>;

    /// Log the value a deferred result delivered. Runs after the call has
    /// returned, so only the names of the call are available.
    fn log_deferred_exit(
        &self,
        logger: &dyn CallLogger,
        declaring_type: &str,
        member: &str,
        result: &dyn Loggable,
    ) -> Result<(), LoggingError>;
}

/// Line layout consumed by downstream log scraping:
///
/// ```text
///  >>> Type.member(
///     name=[value]
/// )
///  <<< Type.member
///     result=<value>
///  <<< Exception in method: Type.member Error Message: message
/// ```
pub struct StandardJoinPointLogger {
    names: Arc<dyn ParameterNameResolver>,
    redaction: Arc<RedactionPolicy>,
}

impl StandardJoinPointLogger {
    pub fn new(names: Arc<dyn ParameterNameResolver>, redaction: Arc<RedactionPolicy>) -> Self {
        Self { names, redaction }
    }

    fn parameters(&self, names: &[String], arguments: &[LogValue]) -> String {
        let mut sb = String::from("(");
        sb.push_str(NEW_LINE);
        append_named_parameters(&mut sb, &self.redaction, names, arguments, 1);
        sb.push(')');
        sb
    }

    fn exit_line(
        &self,
        declaring_type: &str,
        member: &str,
        label: &str,
        result: &dyn Loggable,
    ) -> String {
        let rendered = return_value_as_string(&self.redaction, &result.to_log_value());
        format!(
            "{NEW_LINE} <<< {declaring_type}.{member}{NEW_LINE}{INDENT}{label}={rendered}{NEW_LINE}"
        )
    }
}

impl JoinPointLogger for StandardJoinPointLogger {
    fn log_exception(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
        error: &dyn fmt::Display,
        error_type: &str,
    ) -> Result<(), LoggingError> {
        let mut message = String::new();
        write!(message, "{error}").map_err(|_| LoggingError::Format("exception message"))?;
        if message.trim().is_empty() {
            message = format!("Blank message on exception type {error_type}");
        }

        logger.debug(&format!(
            "{NEW_LINE} <<< Exception in method: {}.{} Error Message: {}{NEW_LINE}",
            join_point.declaring_type(),
            join_point.member(),
            message
        ));
        Ok(())
    }

    fn log_method_entry(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
    ) -> Result<(), LoggingError> {
        let names = self.names.param_names(join_point);
        let arguments: Vec<LogValue> = join_point.args().iter().map(|a| a.to_log_value()).collect();

        logger.debug(&format!(
            "{NEW_LINE} >>> {}.{}{}{NEW_LINE}",
            join_point.declaring_type(),
            join_point.member(),
            self.parameters(&names, &arguments)
        ));
        Ok(())
    }

    fn log_method_exit(
        &self,
        logger: &dyn CallLogger,
        join_point: &JoinPoint<'_>,
        result: &dyn Loggable,
    ) -> Result<(), LoggingError> {
        logger.debug(&self.exit_line(
            join_point.declaring_type(),
            join_point.member(),
            "result",
            result,
        ));
        Ok(())
    }

    fn log_deferred_exit(
        &self,
        logger: &dyn CallLogger,
        declaring_type: &str,
        member: &str,
        result: &dyn Loggable,
    ) -> Result<(), LoggingError> {
        logger.debug(&self.exit_line(declaring_type, member, "observableResult", result));
        Ok(())
    }
}
