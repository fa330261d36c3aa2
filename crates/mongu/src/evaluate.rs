//! The recursive dispatcher and the host entry points.

use crate::error::EvalError;
use crate::eval_ctx::{EvalCtx, VariablePolicy};
use crate::vars::Vars;
use serde_json::{Map, Value};

/// Evaluates an expression against an execution context.
///
/// - Arrays evaluate element-wise.
/// - An object with exactly one key that starts with `$` is an operator
///   invocation; the operator receives the raw value under that key.
/// - Any other object evaluates each value; keys lose one leading `_`.
/// - Strings starting with `$` are variable references; other strings lose
///   one leading `_`.
/// - Numbers, booleans and `null` are returned as they are.
pub fn evaluate(expr: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    match expr {
        Value::Array(items) => items
            .iter()
            .map(|item| evaluate(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => match operator_key(map) {
            Some(key) => {
                let def = ctx.operators.get(key).cloned().ok_or_else(|| {
                    tracing::debug!(operator = key, "unknown operator");
                    EvalError::OperatorNotFound(key.to_string())
                })?;
                tracing::trace!(operator = def.name, "dispatch");
                (def.eval_fn)(&map[key], ctx)
            }
            None => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(unescape(key).to_string(), evaluate(value, ctx)?);
                }
                Ok(Value::Object(out))
            }
        },
        Value::String(s) if s.starts_with('$') => ctx.resolve(s),
        Value::String(s) => Ok(Value::String(unescape(s).to_string())),
        other => Ok(other.clone()),
    }
}

/// Returns the operator key when `map` is an operator invocation.
pub fn operator_key(map: &Map<String, Value>) -> Option<&str> {
    if map.len() != 1 {
        return None;
    }
    map.keys().next().map(String::as_str).filter(|k| k.starts_with('$'))
}

/// Strips one leading `_`.
pub fn unescape(s: &str) -> &str {
    s.strip_prefix('_').unwrap_or(s)
}

/// Evaluates `expr` with `variables` as the outermost scope, using the
/// built-in operators and lenient variable resolution.
///
/// ```
/// use serde_json::json;
///
/// let expr = json!({ "$add": [1, "$n"] });
/// let vars = json!({ "n": 2 });
/// let result = mongu::eval(&expr, vars.as_object().unwrap()).unwrap();
/// assert_eq!(result, json!(3));
/// ```
pub fn eval(expr: &Value, variables: &Map<String, Value>) -> Result<Value, EvalError> {
    eval_with(expr, variables, VariablePolicy::Lenient)
}

/// Like [`eval`], with an explicit missing-variable policy.
pub fn eval_with(
    expr: &Value,
    variables: &Map<String, Value>,
    policy: VariablePolicy,
) -> Result<Value, EvalError> {
    let vars = Vars::new(variables.clone());
    let ctx = EvalCtx::with_defaults(&vars).with_policy(policy);
    evaluate(expr, &ctx)
}
