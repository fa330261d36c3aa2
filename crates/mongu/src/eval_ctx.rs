use crate::error::EvalError;
use crate::operators::default_operators;
use crate::types::OperatorMap;
use crate::vars::Vars;
use serde_json::Value;
use std::sync::Arc;

/// What happens when a variable path cannot be followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariablePolicy {
    /// The reference evaluates to `null`.
    #[default]
    Lenient,
    /// The reference fails with [`EvalError::VariableResolutionFailure`].
    Strict,
}

/// The execution context passed to every operator eval function.
pub struct EvalCtx<'a> {
    /// The variable scope visible to the expression being evaluated.
    pub vars: &'a Vars<'a>,
    /// The operator map used for recursive evaluation.
    pub operators: Arc<OperatorMap>,
    /// Missing-variable policy.
    pub policy: VariablePolicy,
}

impl<'a> EvalCtx<'a> {
    pub fn new(vars: &'a Vars<'a>, operators: Arc<OperatorMap>) -> Self {
        EvalCtx {
            vars,
            operators,
            policy: VariablePolicy::default(),
        }
    }

    /// Context over `vars` using the built-in operator registry.
    pub fn with_defaults(vars: &'a Vars<'a>) -> Self {
        EvalCtx::new(vars, Arc::clone(default_operators()))
    }

    pub fn with_policy(mut self, policy: VariablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Same configuration, different scope.
    pub fn scoped<'b>(&self, vars: &'b Vars<'b>) -> EvalCtx<'b> {
        EvalCtx {
            vars,
            operators: Arc::clone(&self.operators),
            policy: self.policy,
        }
    }

    /// Resolves a `$`-prefixed variable reference according to the policy.
    pub fn resolve(&self, reference: &str) -> Result<Value, EvalError> {
        match self.vars.find(reference) {
            Some(value) => Ok(value.clone()),
            None => match self.policy {
                VariablePolicy::Lenient => Ok(Value::Null),
                VariablePolicy::Strict => {
                    tracing::debug!(reference, "unresolved variable");
                    Err(EvalError::VariableResolutionFailure {
                        path: reference.to_string(),
                    })
                }
            },
        }
    }
}
