//! Rendering helpers for call log lines

use crate::constants::{INDENT, NEW_LINE};
use crate::redaction::RedactionPolicy;
use crate::value::LogValue;

/// Append `name=[value]` on its own line at the given indent level
pub fn append_key_value(
    builder: &mut String,
    policy: &RedactionPolicy,
    key: &str,
    value: &LogValue,
    indent_level: usize,
) {
    for _ in 0..indent_level {
        builder.push_str(INDENT);
    }
    builder.push_str(key);
    builder.push_str("=[");
    match policy.param_value_to_string(key, value) {
        Some(rendered) => builder.push_str(&rendered),
        None => builder.push_str("null"),
    }
    builder.push(']');
    builder.push_str(NEW_LINE);
}

/// Append every argument under its resolved name, `argN` (1-based) where no
/// name is known
pub fn append_named_parameters(
    builder: &mut String,
    policy: &RedactionPolicy,
    names: &[String],
    arguments: &[LogValue],
    indent_level: usize,
) {
    for (i, value) in arguments.iter().enumerate() {
        match names.get(i) {
            Some(name) => append_key_value(builder, policy, name, value, indent_level),
            None => append_key_value(builder, policy, &positional_name(i), value, indent_level),
        }
    }
}

/// `argN` name of the zero-based argument position `index`
pub fn positional_name(index: usize) -> String {
    format!("arg{}", index + 1)
}

/// Render a return value: `<void>` when absent, otherwise bracketed
pub fn return_value_as_string(policy: &RedactionPolicy, value: &LogValue) -> String {
    match value {
        LogValue::Null => "<void>".to_string(),
        LogValue::Primitive(p) => format!("<{p}>"),
        other => {
            let rendered = policy
                .sensitive_object_to_string(other)
                .unwrap_or_else(|| "null".to_string());
            format!("<{rendered}>")
        }
    }
}
