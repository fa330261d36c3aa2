//! Object operators. None of them modify their input.

use super::{eval_object, eval_string};
use crate::args::{parse, FromArgs, List, Record};
use crate::assert;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::OperatorDefinition;
use serde_json::{Map, Value};
use std::sync::Arc;

/// `{field, input}` plus `value` for `$setField`.
struct FieldArgs<'v> {
    field: &'v Value,
    input: &'v Value,
    value: Option<&'v Value>,
}

impl<'v> FromArgs<'v> for FieldArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        Ok(FieldArgs {
            field: record.required("field")?,
            input: record.required("input")?,
            value: record.optional("value"),
        })
    }
}

/// A `null` input reads as an empty object.
fn eval_input(expr: &Value, ctx: &EvalCtx<'_>) -> Result<Map<String, Value>, EvalError> {
    match evaluate(expr, ctx)? {
        Value::Null => Ok(Map::new()),
        other => assert::into_obj(other),
    }
}

fn get_field_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: FieldArgs = parse("$getField", args)?;
    let field = eval_string(args.field, ctx)?;
    let mut input = eval_input(args.input, ctx)?;
    Ok(input.remove(&field).unwrap_or(Value::Null))
}

fn merge_objects_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let operands = match args {
        Value::Array(_) => parse::<List>("$mergeObjects", args)?.0,
        single => std::slice::from_ref(single),
    };
    let mut merged = Map::new();
    for e in operands {
        merged.extend(eval_object(e, ctx)?);
    }
    Ok(Value::Object(merged))
}

fn set_field_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: FieldArgs = parse("$setField", args)?;
    let value = args.value.ok_or(EvalError::MissingField {
        operator: "$setField",
        field: "value",
    })?;
    let field = eval_string(args.field, ctx)?;
    let mut input = eval_input(args.input, ctx)?;
    input.insert(field, evaluate(value, ctx)?);
    Ok(Value::Object(input))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$getField", aliases: &[], eval_fn: get_field_eval }),
        Arc::new(OperatorDefinition { name: "$mergeObjects", aliases: &[], eval_fn: merge_objects_eval }),
        Arc::new(OperatorDefinition { name: "$setField", aliases: &[], eval_fn: set_field_eval }),
    ]
}
