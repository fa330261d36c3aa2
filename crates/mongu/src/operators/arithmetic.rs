//! Arithmetic operators.

use super::eval_number;
use crate::args::{parse, List};
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::types::OperatorDefinition;
use crate::util;
use serde_json::Value;
use std::sync::Arc;

fn unary(
    operator: &'static str,
    args: &Value,
    ctx: &EvalCtx<'_>,
    f: fn(f64) -> f64,
) -> Result<Value, EvalError> {
    let operand: &Value = parse(operator, args)?;
    Ok(util::f64_to_value(f(eval_number(operand, ctx)?)))
}

fn binary(
    operator: &'static str,
    args: &Value,
    ctx: &EvalCtx<'_>,
    f: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let [a, b]: [&Value; 2] = parse(operator, args)?;
    let a = eval_number(a, ctx)?;
    let b = eval_number(b, ctx)?;
    Ok(util::f64_to_value(f(a, b)))
}

/// `[value]` or `[value, places]`, places defaulting to 0.
fn scaled(
    operator: &'static str,
    args: &Value,
    ctx: &EvalCtx<'_>,
    f: fn(f64) -> f64,
) -> Result<Value, EvalError> {
    let List(operands) = parse(operator, args)?;
    let (value, places) = match operands {
        [value] => (eval_number(value, ctx)?, 0.0),
        [value, places] => (eval_number(value, ctx)?, eval_number(places, ctx)?),
        _ => return Err(EvalError::args(operator, "one or two operands")),
    };
    Ok(util::f64_to_value(util::at_places(value, places, f)))
}

fn abs_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    unary("$abs", args, ctx, f64::abs)
}

fn add_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$add", args)?;
    operands
        .iter()
        .try_fold(0.0f64, |acc, e| Ok(acc + eval_number(e, ctx)?))
        .map(util::f64_to_value)
}

fn ceil_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    unary("$ceil", args, ctx, f64::ceil)
}

fn divide_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    binary("$divide", args, ctx, |a, b| a / b)
}

fn exp_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    unary("$exp", args, ctx, f64::exp)
}

fn floor_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    unary("$floor", args, ctx, f64::floor)
}

fn ln_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    unary("$ln", args, ctx, f64::ln)
}

fn log_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    binary("$log", args, ctx, |n, base| n.ln() / base.ln())
}

fn log10_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    unary("$log10", args, ctx, f64::log10)
}

fn mod_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    binary("$mod", args, ctx, |a, b| a % b)
}

fn multiply_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$multiply", args)?;
    operands
        .iter()
        .try_fold(1.0f64, |acc, e| Ok(acc * eval_number(e, ctx)?))
        .map(util::f64_to_value)
}

fn pow_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    binary("$pow", args, ctx, f64::powf)
}

fn round_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    scaled("$round", args, ctx, util::round_half_up)
}

fn sqrt_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    unary("$sqrt", args, ctx, f64::sqrt)
}

fn subtract_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    binary("$subtract", args, ctx, |a, b| a - b)
}

fn trunc_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    scaled("$trunc", args, ctx, f64::trunc)
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$abs", aliases: &[], eval_fn: abs_eval }),
        Arc::new(OperatorDefinition { name: "$add", aliases: &[], eval_fn: add_eval }),
        Arc::new(OperatorDefinition { name: "$ceil", aliases: &[], eval_fn: ceil_eval }),
        Arc::new(OperatorDefinition { name: "$divide", aliases: &[], eval_fn: divide_eval }),
        Arc::new(OperatorDefinition { name: "$exp", aliases: &[], eval_fn: exp_eval }),
        Arc::new(OperatorDefinition { name: "$floor", aliases: &[], eval_fn: floor_eval }),
        Arc::new(OperatorDefinition { name: "$ln", aliases: &[], eval_fn: ln_eval }),
        Arc::new(OperatorDefinition { name: "$log", aliases: &[], eval_fn: log_eval }),
        Arc::new(OperatorDefinition { name: "$log10", aliases: &[], eval_fn: log10_eval }),
        Arc::new(OperatorDefinition { name: "$mod", aliases: &[], eval_fn: mod_eval }),
        Arc::new(OperatorDefinition { name: "$multiply", aliases: &[], eval_fn: multiply_eval }),
        Arc::new(OperatorDefinition { name: "$pow", aliases: &[], eval_fn: pow_eval }),
        Arc::new(OperatorDefinition { name: "$round", aliases: &[], eval_fn: round_eval }),
        Arc::new(OperatorDefinition { name: "$sqrt", aliases: &[], eval_fn: sqrt_eval }),
        Arc::new(OperatorDefinition { name: "$subtract", aliases: &[], eval_fn: subtract_eval }),
        Arc::new(OperatorDefinition { name: "$trunc", aliases: &[], eval_fn: trunc_eval }),
    ]
}
