//! Built-in operator catalog and the static registry.

pub mod arithmetic;
pub mod array;
pub mod boolean;
pub mod comparison;
pub mod conditional;
pub mod object;
pub mod string;
pub mod type_ops;
pub mod variable;

use crate::assert;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::{operators_to_map, OperatorDefinition, OperatorMap};
use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

/// All built-in operators.
pub fn all_operators() -> Vec<Arc<OperatorDefinition>> {
    let mut ops = Vec::new();
    ops.extend(arithmetic::operators());
    ops.extend(array::operators());
    ops.extend(boolean::operators());
    ops.extend(comparison::operators());
    ops.extend(conditional::operators());
    ops.extend(object::operators());
    ops.extend(string::operators());
    ops.extend(type_ops::operators());
    ops.extend(variable::operators());
    ops
}

/// Builds a fresh operator map from all built-in operators.
///
/// Hosts that want to add or remove operators start from this map and hand
/// the result to [`EvalCtx::new`].
pub fn operators_map() -> OperatorMap {
    operators_to_map(all_operators())
}

/// The process-wide registry of built-in operators, built on first use and
/// never modified afterwards.
pub fn default_operators() -> &'static Arc<OperatorMap> {
    static REGISTRY: OnceLock<Arc<OperatorMap>> = OnceLock::new();
    REGISTRY.get_or_init(|| Arc::new(operators_map()))
}

/// Names and aliases of every built-in operator, sorted.
pub fn operator_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = all_operators()
        .iter()
        .flat_map(|op| std::iter::once(op.name).chain(op.aliases.iter().copied()))
        .collect();
    names.sort_unstable();
    names
}

// ------------------------------------------------------ Typed operand helpers

pub(crate) fn eval_number(expr: &Value, ctx: &EvalCtx<'_>) -> Result<f64, EvalError> {
    assert::as_number(&evaluate(expr, ctx)?)
}

pub(crate) fn eval_bool(expr: &Value, ctx: &EvalCtx<'_>) -> Result<bool, EvalError> {
    assert::as_bool(&evaluate(expr, ctx)?)
}

pub(crate) fn eval_string(expr: &Value, ctx: &EvalCtx<'_>) -> Result<String, EvalError> {
    assert::into_string(evaluate(expr, ctx)?)
}

pub(crate) fn eval_array(expr: &Value, ctx: &EvalCtx<'_>) -> Result<Vec<Value>, EvalError> {
    assert::into_arr(evaluate(expr, ctx)?)
}

pub(crate) fn eval_object(expr: &Value, ctx: &EvalCtx<'_>) -> Result<Map<String, Value>, EvalError> {
    assert::into_obj(evaluate(expr, ctx)?)
}
