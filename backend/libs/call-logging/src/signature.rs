/// Method signatures and the lookup service standing in for runtime
/// reflection
use crate::error::LookupError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Static description of one callable member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    declaring_type: String,
    name: String,
    parameter_types: Vec<String>,
    parameter_names: Option<Vec<String>>,
    abstract_declaration: bool,
}

impl MethodSignature {
    pub fn new<I, S>(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameter_types: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
            parameter_names: None,
            abstract_declaration: false,
        }
    }

    /// Source-level parameter names, in order
    pub fn with_parameter_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Mark the member as declared on a trait rather than a concrete type
    pub fn declared_on_trait(mut self) -> Self {
        self.abstract_declaration = true;
        self
    }

    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_types(&self) -> &[String] {
        &self.parameter_types
    }

    pub fn parameter_names(&self) -> Option<&[String]> {
        self.parameter_names.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.abstract_declaration
    }
}

/// Finds the member a concrete type declares for a given name and parameter
/// types
pub trait MethodLookup: Send + Sync {
    fn declared_method(
        &self,
        type_name: &str,
        name: &str,
        parameter_types: &[String],
    ) -> Result<Arc<MethodSignature>, LookupError>;
}

type MethodKey = (String, String, Vec<String>);

/// In-memory registry of concrete method signatures
#[derive(Default)]
pub struct MethodTable {
    methods: RwLock<HashMap<MethodKey, Arc<MethodSignature>>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a concrete member, replacing any previous entry with the same
    /// type, name and parameter types
    pub fn register(&self, signature: MethodSignature) -> Arc<MethodSignature> {
        let key = (
            signature.declaring_type.clone(),
            signature.name.clone(),
            signature.parameter_types.clone(),
        );
        let signature = Arc::new(signature);
        self.methods.write().insert(key, signature.clone());
        signature
    }

    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }
}

impl MethodLookup for MethodTable {
    fn declared_method(
        &self,
        type_name: &str,
        name: &str,
        parameter_types: &[String],
    ) -> Result<Arc<MethodSignature>, LookupError> {
        let key = (type_name.to_string(), name.to_string(), parameter_types.to_vec());
        self.methods
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| LookupError::NoSuchMethod {
                type_name: type_name.to_string(),
                method: name.to_string(),
                parameter_types: parameter_types.join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_types() {
        let table = MethodTable::new();
        table.register(
            MethodSignature::new("UserRepoImpl", "find", ["u64"]).with_parameter_names(["user_id"]),
        );
        table.register(
            MethodSignature::new("UserRepoImpl", "find", ["String"])
                .with_parameter_names(["email"]),
        );
        assert_eq!(table.len(), 2);

        let found = table
            .declared_method("UserRepoImpl", "find", &["String".to_string()])
            .unwrap();
        assert_eq!(found.parameter_names(), Some(&["email".to_string()][..]));
    }

    #[test]
    fn test_lookup_miss() {
        let table = MethodTable::new();
        let err = table
            .declared_method("Missing", "call", &["T".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "No method Missing.call with parameter types (T)");
    }
}
