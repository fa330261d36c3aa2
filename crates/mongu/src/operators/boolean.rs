//! Boolean operators. `$and` and `$or` stop at the first operand that
//! decides the result.

use super::eval_bool;
use crate::args::{parse, List};
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::types::OperatorDefinition;
use serde_json::Value;
use std::sync::Arc;

fn and_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$and", args)?;
    for e in operands {
        if !eval_bool(e, ctx)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn or_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$or", args)?;
    for e in operands {
        if eval_bool(e, ctx)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

/// Accepts `expr` or `[expr]`.
fn not_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let operand = match args {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    };
    Ok(Value::Bool(!eval_bool(operand, ctx)?))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$and", aliases: &[], eval_fn: and_eval }),
        Arc::new(OperatorDefinition { name: "$not", aliases: &[], eval_fn: not_eval }),
        Arc::new(OperatorDefinition { name: "$or", aliases: &[], eval_fn: or_eval }),
    ]
}
