//! Comparison operators.

use crate::args::parse;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::OperatorDefinition;
use crate::util;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

fn operands(
    operator: &'static str,
    args: &Value,
    ctx: &EvalCtx<'_>,
) -> Result<(Value, Value), EvalError> {
    let [a, b]: [&Value; 2] = parse(operator, args)?;
    Ok((evaluate(a, ctx)?, evaluate(b, ctx)?))
}

fn ordering(
    operator: &'static str,
    args: &Value,
    ctx: &EvalCtx<'_>,
) -> Result<Ordering, EvalError> {
    let (a, b) = operands(operator, args, ctx)?;
    util::compare(&a, &b)
}

fn cmp_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let n = match ordering("$cmp", args, ctx)? {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    };
    Ok(util::i64_to_value(n))
}

fn eq_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let (a, b) = operands("$eq", args, ctx)?;
    Ok(Value::Bool(util::values_equal(&a, &b)))
}

fn ne_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let (a, b) = operands("$ne", args, ctx)?;
    Ok(Value::Bool(!util::values_equal(&a, &b)))
}

fn gt_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(ordering("$gt", args, ctx)?.is_gt()))
}

fn gte_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(ordering("$gte", args, ctx)?.is_ge()))
}

fn lt_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(ordering("$lt", args, ctx)?.is_lt()))
}

fn lte_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(ordering("$lte", args, ctx)?.is_le()))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$cmp", aliases: &[], eval_fn: cmp_eval }),
        Arc::new(OperatorDefinition { name: "$eq", aliases: &[], eval_fn: eq_eval }),
        Arc::new(OperatorDefinition { name: "$gt", aliases: &[], eval_fn: gt_eval }),
        Arc::new(OperatorDefinition { name: "$gte", aliases: &[], eval_fn: gte_eval }),
        Arc::new(OperatorDefinition { name: "$lt", aliases: &[], eval_fn: lt_eval }),
        Arc::new(OperatorDefinition { name: "$lte", aliases: &[], eval_fn: lte_eval }),
        Arc::new(OperatorDefinition { name: "$ne", aliases: &[], eval_fn: ne_eval }),
    ]
}
