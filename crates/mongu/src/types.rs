use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Runtime kind of a [`Value`], used by type assertions and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    pub fn of(value: &Value) -> Kind {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    pub(crate) fn join(kinds: &[Kind]) -> String {
        kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The type of an operator evaluation function.
///
/// `args` is the raw, unevaluated value that followed the operator key. The
/// operator decides which parts of it to evaluate and in which scope.
pub type EvalFn = for<'a> fn(&Value, &EvalCtx<'a>) -> Result<Value, EvalError>;

/// An operator definition: its `$`-prefixed name, any aliases and the
/// function implementing it.
pub struct OperatorDefinition {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub eval_fn: EvalFn,
}

impl fmt::Debug for OperatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDefinition")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Map of operator name/alias -> definition.
pub type OperatorMap = HashMap<String, Arc<OperatorDefinition>>;

/// Builds an `OperatorMap` from a list of operator definitions.
pub fn operators_to_map(operators: Vec<Arc<OperatorDefinition>>) -> OperatorMap {
    let mut map = HashMap::new();
    for op in operators {
        map.insert(op.name.to_string(), Arc::clone(&op));
        for alias in op.aliases {
            map.insert(alias.to_string(), Arc::clone(&op));
        }
    }
    map
}
