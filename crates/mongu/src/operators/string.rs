//! String operators. Lengths and offsets count characters, not bytes.

use super::{eval_number, eval_string};
use crate::args::{parse, FromArgs, List, Record};
use crate::assert;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::OperatorDefinition;
use crate::util;
use regex::RegexBuilder;
use serde_json::Value;
use std::sync::Arc;

/// A bare expression, or `{input, chars?}`.
struct TrimArgs<'v> {
    input: &'v Value,
    chars: Option<&'v Value>,
}

impl<'v> FromArgs<'v> for TrimArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        match args {
            Value::Object(map) if map.contains_key("input") => {
                let record: Record = parse(operator, args)?;
                Ok(TrimArgs {
                    input: record.required("input")?,
                    chars: record.optional("chars"),
                })
            }
            input => Ok(TrimArgs { input, chars: None }),
        }
    }
}

/// `[input, regex]` or `{input, regex, options?}`
struct RegexArgs<'v> {
    input: &'v Value,
    regex: &'v Value,
    options: Option<&'v Value>,
}

impl<'v> FromArgs<'v> for RegexArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        if args.is_array() {
            let [input, regex]: [&Value; 2] = parse(operator, args)?;
            return Ok(RegexArgs { input, regex, options: None });
        }
        let record: Record = parse(operator, args)?;
        Ok(RegexArgs {
            input: record.required("input")?,
            regex: record.required("regex")?,
            options: record.optional("options"),
        })
    }
}

enum Side {
    Start,
    End,
    Both,
}

fn trim(operator: &'static str, args: &Value, ctx: &EvalCtx<'_>, side: Side) -> Result<Value, EvalError> {
    let args: TrimArgs = parse(operator, args)?;
    let s = eval_string(args.input, ctx)?;
    let chars = match args.chars {
        Some(expr) => Some(eval_string(expr, ctx)?),
        None => None,
    };
    let strip = |c: char| match &chars {
        Some(set) => set.contains(c),
        None => c.is_whitespace(),
    };
    let trimmed = match side {
        Side::Start => s.trim_start_matches(strip),
        Side::End => s.trim_end_matches(strip),
        Side::Both => s.trim_matches(strip),
    };
    Ok(Value::String(trimmed.to_string()))
}

fn concat_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$concat", args)?;
    let mut out = String::new();
    for e in operands {
        let part = evaluate(e, ctx)?;
        out.push_str(assert::as_str(&part)?);
    }
    Ok(Value::String(out))
}

fn ltrim_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    trim("$ltrim", args, ctx, Side::Start)
}

fn rtrim_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    trim("$rtrim", args, ctx, Side::End)
}

fn trim_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    trim("$trim", args, ctx, Side::Both)
}

fn split_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let [input, delimiter]: [&Value; 2] = parse("$split", args)?;
    let s = eval_string(input, ctx)?;
    let delimiter = eval_string(delimiter, ctx)?;
    let parts: Vec<Value> = if delimiter.is_empty() {
        s.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        s.split(delimiter.as_str())
            .map(|part| Value::String(part.to_string()))
            .collect()
    };
    Ok(Value::Array(parts))
}

fn str_len_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let input: &Value = parse("$strLen", args)?;
    Ok(util::usize_to_value(eval_string(input, ctx)?.chars().count()))
}

/// Characters between `start` and `start + length`. Each bound is truncated
/// and clamped into the string; reversed bounds are swapped.
fn substr_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let [input, start, length]: [&Value; 3] = parse("$substr", args)?;
    let chars: Vec<char> = eval_string(input, ctx)?.chars().collect();
    let start = eval_number(start, ctx)?;
    let length = eval_number(length, ctx)?;
    let len = chars.len() as f64;
    let bound = |n: f64| if n.is_nan() { 0 } else { n.trunc().clamp(0.0, len) as usize };
    let (a, b) = (bound(start), bound(start + length));
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    Ok(Value::String(chars[from..to].iter().collect()))
}

fn to_lower_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let input: &Value = parse("$toLower", args)?;
    Ok(Value::String(eval_string(input, ctx)?.to_lowercase()))
}

fn to_upper_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let input: &Value = parse("$toUpper", args)?;
    Ok(Value::String(eval_string(input, ctx)?.to_uppercase()))
}

fn regex_match_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: RegexArgs = parse("$regexMatch", args)?;
    let input = eval_string(args.input, ctx)?;
    let pattern = eval_string(args.regex, ctx)?;
    let options = match args.options {
        Some(expr) => eval_string(expr, ctx)?,
        None => String::new(),
    };

    let mut builder = RegexBuilder::new(&pattern);
    for flag in options.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => return Err(EvalError::InvalidRegex(format!("unknown option '{other}'"))),
        };
    }
    let re = builder.build().map_err(|err| {
        tracing::debug!(pattern = %pattern, error = %err, "regex compile failed");
        EvalError::InvalidRegex(err.to_string())
    })?;
    Ok(Value::Bool(re.is_match(&input)))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$concat", aliases: &[], eval_fn: concat_eval }),
        Arc::new(OperatorDefinition { name: "$ltrim", aliases: &[], eval_fn: ltrim_eval }),
        Arc::new(OperatorDefinition { name: "$regexMatch", aliases: &[], eval_fn: regex_match_eval }),
        Arc::new(OperatorDefinition { name: "$rtrim", aliases: &[], eval_fn: rtrim_eval }),
        Arc::new(OperatorDefinition { name: "$split", aliases: &[], eval_fn: split_eval }),
        Arc::new(OperatorDefinition { name: "$strLen", aliases: &["$strLenCP"], eval_fn: str_len_eval }),
        Arc::new(OperatorDefinition { name: "$substr", aliases: &["$substrCP"], eval_fn: substr_eval }),
        Arc::new(OperatorDefinition { name: "$toLower", aliases: &[], eval_fn: to_lower_eval }),
        Arc::new(OperatorDefinition { name: "$toUpper", aliases: &[], eval_fn: to_upper_eval }),
        Arc::new(OperatorDefinition { name: "$trim", aliases: &[], eval_fn: trim_eval }),
    ]
}
