/// Redaction of sensitive values before they reach a log line
use crate::constants::{DEFAULT_SENSITIVE_FIELDS, PROTECTED};
use crate::value::LogValue;
use once_cell::sync::OnceCell;
use regex::{NoExpand, Regex};
use std::sync::Arc;
use tracing::warn;

static GLOBAL: OnceCell<Arc<RedactionPolicy>> = OnceCell::new();

/// Case-sensitive set of field names whose values are never logged
#[derive(Debug, Clone)]
pub struct RedactionPolicy {
    names: Vec<String>,
    /// `<name>=<value up to the next & or end>` per sensitive name
    embedded: Vec<(String, Regex)>,
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_FIELDS)
    }
}

impl RedactionPolicy {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut policy = Self {
            names: Vec::new(),
            embedded: Vec::new(),
        };
        for name in names {
            policy.push(name.into());
        }
        policy
    }

    /// Default names plus `extra`
    pub fn with_additional<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut policy = Self::default();
        for name in extra {
            policy.push(name.into());
        }
        policy
    }

    fn push(&mut self, name: String) {
        if name.is_empty() || self.names.contains(&name) {
            return;
        }
        let pattern = format!("{}=[^&]*", regex::escape(&name));
        match Regex::new(&pattern) {
            Ok(regex) => self.embedded.push((name.clone(), regex)),
            Err(error) => warn!(%error, field = %name, "Cannot build redaction pattern"),
        }
        self.names.push(name);
    }

    /// Process-wide policy; the defaults unless [`RedactionPolicy::install_global`]
    /// ran first
    pub fn global() -> Arc<RedactionPolicy> {
        GLOBAL
            .get_or_init(|| Arc::new(RedactionPolicy::default()))
            .clone()
    }

    /// Fix the process-wide policy. Fails, returning the policy, once the
    /// global policy has been read or installed.
    pub fn install_global(policy: RedactionPolicy) -> Result<(), RedactionPolicy> {
        GLOBAL
            .set(Arc::new(policy))
            .map_err(|rejected| Arc::try_unwrap(rejected).unwrap_or_else(|arc| (*arc).clone()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Render a named parameter or field. Sensitive names always yield the
    /// placeholder; `None` means the value is absent.
    pub fn param_value_to_string(&self, name: &str, value: &LogValue) -> Option<String> {
        if self.is_sensitive(name) {
            return Some(PROTECTED.to_string());
        }
        self.sensitive_object_to_string(value)
    }

    /// Render a value whose own name is unknown or not sensitive
    pub fn sensitive_object_to_string(&self, value: &LogValue) -> Option<String> {
        match value {
            LogValue::Null => None,
            LogValue::Primitive(s) | LogValue::Custom(s) => Some(s.clone()),
            LogValue::Text(s) => Some(self.redact_embedded(s)),
            LogValue::Structured(_) | LogValue::List(_) => {
                Some(self.redact_embedded(&self.structural_to_string(value)))
            }
        }
    }

    /// Replace the value part of every embedded `<sensitive>=<value>` pair
    pub fn exclude_field_names(&self, content: Option<&str>) -> Option<String> {
        content.map(|c| self.redact_embedded(c))
    }

    fn redact_embedded(&self, content: &str) -> String {
        let mut result = content.to_string();
        if result.is_empty() {
            return result;
        }
        for (name, regex) in &self.embedded {
            if regex.is_match(&result) {
                let replacement = format!("{name}={PROTECTED}");
                result = regex
                    .replace_all(&result, NoExpand(&replacement))
                    .into_owned();
            }
        }
        result
    }

    /// `Type[field=value,...]` with sensitive fields omitted
    fn structural_to_string(&self, value: &LogValue) -> String {
        match value {
            LogValue::Null => "<null>".to_string(),
            LogValue::Primitive(s) | LogValue::Text(s) | LogValue::Custom(s) => s.clone(),
            LogValue::List(items) => {
                let rendered: Vec<String> =
                    items.iter().map(|item| self.structural_to_string(item)).collect();
                format!("[{}]", rendered.join(","))
            }
            LogValue::Structured(structured) => {
                let rendered: Vec<String> = structured
                    .fields
                    .iter()
                    .filter(|(name, _)| !self.is_sensitive(name))
                    .map(|(name, field)| format!("{}={}", name, self.structural_to_string(field)))
                    .collect();
                format!("{}[{}]", structured.type_name, rendered.join(","))
            }
        }
    }
}
