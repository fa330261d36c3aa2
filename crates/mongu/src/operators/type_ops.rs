//! Type predicates and conversions.

use super::eval_string;
use crate::args::{parse, FromArgs, Record};
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::{Kind, OperatorDefinition};
use crate::util;
use serde_json::Value;
use std::sync::Arc;

/// `{input, to, onNull?}`
struct ConvertArgs<'v> {
    input: &'v Value,
    to: &'v Value,
    on_null: Option<&'v Value>,
}

impl<'v> FromArgs<'v> for ConvertArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        Ok(ConvertArgs {
            input: record.required("input")?,
            to: record.required("to")?,
            on_null: record.optional("onNull"),
        })
    }
}

fn operand(operator: &'static str, args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let input: &Value = parse(operator, args)?;
    evaluate(input, ctx)
}

fn is_kind(operator: &'static str, args: &Value, ctx: &EvalCtx<'_>, kind: Kind) -> Result<Value, EvalError> {
    Ok(Value::Bool(Kind::of(&operand(operator, args, ctx)?) == kind))
}

fn convert_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: ConvertArgs = parse("$convert", args)?;
    let input = evaluate(args.input, ctx)?;
    let to = eval_string(args.to, ctx)?;
    if input.is_null() {
        if let Some(on_null) = args.on_null {
            return evaluate(on_null, ctx);
        }
    }
    match to.as_str() {
        "bool" => Ok(Value::Bool(util::is_truthy(&input))),
        "number" => Ok(util::to_number(&input)),
        "string" => Ok(Value::String(util::str_val(&input))),
        _ => Err(EvalError::InvalidConversion(to)),
    }
}

fn is_boolean_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    is_kind("$isBoolean", args, ctx, Kind::Boolean)
}

fn is_number_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    is_kind("$isNumber", args, ctx, Kind::Number)
}

fn is_string_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    is_kind("$isString", args, ctx, Kind::String)
}

fn to_boolean_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::Bool(util::is_truthy(&operand("$toBoolean", args, ctx)?)))
}

fn to_number_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(util::to_number(&operand("$toNumber", args, ctx)?))
}

fn to_string_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    Ok(Value::String(util::str_val(&operand("$toString", args, ctx)?)))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$convert", aliases: &[], eval_fn: convert_eval }),
        Arc::new(OperatorDefinition { name: "$isBoolean", aliases: &[], eval_fn: is_boolean_eval }),
        Arc::new(OperatorDefinition { name: "$isNumber", aliases: &[], eval_fn: is_number_eval }),
        Arc::new(OperatorDefinition { name: "$isString", aliases: &[], eval_fn: is_string_eval }),
        Arc::new(OperatorDefinition { name: "$toBoolean", aliases: &[], eval_fn: to_boolean_eval }),
        Arc::new(OperatorDefinition { name: "$toNumber", aliases: &[], eval_fn: to_number_eval }),
        Arc::new(OperatorDefinition { name: "$toString", aliases: &[], eval_fn: to_string_eval }),
    ]
}
