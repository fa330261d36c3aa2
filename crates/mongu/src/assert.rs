//! Runtime type guards applied to evaluated operands.

use crate::error::EvalError;
use crate::types::Kind;
use serde_json::{Map, Value};

fn mismatch(expected: &'static [Kind], value: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected,
        actual: Kind::of(value),
    }
}

pub fn as_number(value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(f64::NAN)),
        other => Err(mismatch(&[Kind::Number], other)),
    }
}

pub fn as_str(value: &Value) -> Result<&str, EvalError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch(&[Kind::String], other)),
    }
}

pub fn as_bool(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch(&[Kind::Boolean], other)),
    }
}

pub fn as_arr(value: &Value) -> Result<&Vec<Value>, EvalError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(mismatch(&[Kind::Array], other)),
    }
}

pub fn into_arr(value: Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(mismatch(&[Kind::Array], &other)),
    }
}

pub fn into_obj(value: Value) -> Result<Map<String, Value>, EvalError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(mismatch(&[Kind::Object], &other)),
    }
}

pub fn into_string(value: Value) -> Result<String, EvalError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch(&[Kind::String], &other)),
    }
}
