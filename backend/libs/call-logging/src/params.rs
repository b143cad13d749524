/// Resolution of human-meaningful argument names for a call
use crate::error::LookupError;
use crate::format::positional_name;
use crate::join_point::JoinPoint;
use crate::signature::MethodLookup;
use std::sync::Arc;
use tracing::trace;

pub trait ParameterNameResolver: Send + Sync {
    /// Names in argument order. Never fails: positions stand in for names
    /// that cannot be determined.
    fn param_names(&self, join_point: &JoinPoint<'_>) -> Vec<String>;
}

/// Prefers the names declared on the target's concrete method over the ones
/// on the trait the call went through
pub struct CoreParameterNameResolver {
    methods: Arc<dyn MethodLookup>,
}

impl CoreParameterNameResolver {
    pub fn new(methods: Arc<dyn MethodLookup>) -> Self {
        Self { methods }
    }

    fn declared_names(&self, join_point: &JoinPoint<'_>) -> Result<Vec<String>, LookupError> {
        let signature = join_point.signature();

        if signature.is_abstract() {
            let concrete = self.methods.declared_method(
                join_point.target_type(),
                signature.name(),
                signature.parameter_types(),
            )?;
            return concrete
                .parameter_names()
                .map(<[String]>::to_vec)
                .ok_or_else(|| LookupError::NoParameterNames(join_point.target_type().to_string()));
        }

        signature
            .parameter_names()
            .map(<[String]>::to_vec)
            .ok_or_else(|| LookupError::NoParameterNames(signature.declaring_type().to_string()))
    }
}

impl ParameterNameResolver for CoreParameterNameResolver {
    fn param_names(&self, join_point: &JoinPoint<'_>) -> Vec<String> {
        let count = join_point.args().len();

        match self.declared_names(join_point) {
            Ok(names) if names.len() == count => names,
            Ok(names) => {
                trace!(
                    expected = count,
                    found = names.len(),
                    method = join_point.signature().name(),
                    "Parameter name count mismatch"
                );
                (0..count).map(positional_name).collect()
            }
            Err(error) => {
                trace!(%error, "Failed to get param names");
                (0..count).map(positional_name).collect()
            }
        }
    }
}
