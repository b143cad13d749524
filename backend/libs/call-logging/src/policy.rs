/// Which targets get call logging
///
/// Decided once, when the advice or layer is composed, from type paths as
/// reported by [`std::any::type_name`].

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptionPolicy {
    include: Vec<String>,
    exclude: Vec<String>,
}

/// Path prefix of this crate's own types
const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

impl Default for InterceptionPolicy {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: vec![CRATE_PREFIX.to_string()],
        }
    }
}

impl InterceptionPolicy {
    /// Policy intercepting everything outside this crate
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy intercepting every target, this crate's own types included
    pub fn unrestricted() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Restrict interception to targets under one of `prefixes`. Calling it
    /// repeatedly widens the set.
    pub fn include<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Never intercept targets under one of `prefixes`
    pub fn exclude<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn matches(&self, type_name: &str) -> bool {
        let included = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|prefix| type_name.starts_with(prefix.as_str()));

        included
            && !self
                .exclude
                .iter()
                .any(|prefix| type_name.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skips_own_crate() {
        let policy = InterceptionPolicy::default();
        assert_eq!(CRATE_PREFIX, "call_logging::");
        assert!(!policy.matches(std::any::type_name::<crate::advice::CoreLoggerAdvice>()));
        assert!(policy.matches("orders::OrderService"));
        let unrestricted = InterceptionPolicy::unrestricted();
        assert!(unrestricted.matches("call_logging::advice::CoreLoggerAdvice"));
    }

    #[test]
    fn test_include_and_exclude() {
        let policy = InterceptionPolicy::new()
            .include(["orders::", "billing::"])
            .exclude(["orders::internal::"]);

        assert!(policy.matches("orders::api::OrderService"));
        assert!(policy.matches("billing::Invoicer"));
        assert!(!policy.matches("orders::internal::Cache"));
        assert!(!policy.matches("shipping::Tracker"));
    }
}
