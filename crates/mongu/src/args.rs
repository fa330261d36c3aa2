//! Argument shapes.
//!
//! Every operator receives the raw value that followed its key. Each
//! operator names the shape it expects by parsing that value into a type
//! implementing [`FromArgs`]: a bare expression, a variadic [`List`], a
//! fixed-size tuple `[&Value; N]`, or a record struct built on [`Record`].

use crate::error::EvalError;
use serde_json::{Map, Value};

pub trait FromArgs<'v>: Sized {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError>;
}

/// A single expression of any shape.
impl<'v> FromArgs<'v> for &'v Value {
    fn from_args(_operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        Ok(args)
    }
}

/// A variadic list of operand expressions.
#[derive(Debug, Clone, Copy)]
pub struct List<'v>(pub &'v [Value]);

impl<'v> FromArgs<'v> for List<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        match args {
            Value::Array(items) => Ok(List(items)),
            _ => Err(EvalError::args(operator, "an array of operands")),
        }
    }
}

fn operand_count(n: usize) -> &'static str {
    match n {
        1 => "one operand",
        2 => "two operands",
        3 => "three operands",
        _ => "a fixed number of operands",
    }
}

impl<'v, const N: usize> FromArgs<'v> for [&'v Value; N] {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let items = match args {
            Value::Array(items) if items.len() == N => items,
            _ => return Err(EvalError::args(operator, operand_count(N))),
        };
        Ok(std::array::from_fn(|i| &items[i]))
    }
}

/// An object of named operand expressions.
#[derive(Debug, Clone, Copy)]
pub struct Record<'v> {
    operator: &'static str,
    fields: &'v Map<String, Value>,
}

impl<'v> Record<'v> {
    pub fn required(&self, field: &'static str) -> Result<&'v Value, EvalError> {
        self.fields.get(field).ok_or(EvalError::MissingField {
            operator: self.operator,
            field,
        })
    }

    pub fn optional(&self, field: &str) -> Option<&'v Value> {
        self.fields.get(field)
    }
}

impl<'v> FromArgs<'v> for Record<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        match args {
            Value::Object(fields) => Ok(Record { operator, fields }),
            _ => Err(EvalError::args(operator, "an object of named operands")),
        }
    }
}

/// Parses `args` into the shape `T` on behalf of `operator`.
pub fn parse<'v, T: FromArgs<'v>>(operator: &'static str, args: &'v Value) -> Result<T, EvalError> {
    T::from_args(operator, args)
}
