//! Array operators.

use super::{eval_array, eval_bool, eval_number, eval_string};
use crate::args::{parse, FromArgs, List, Record};
use crate::assert;
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::OperatorDefinition;
use crate::util;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

/// `{input, cond, as?}`
struct FilterArgs<'v> {
    input: &'v Value,
    cond: &'v Value,
    alias: Option<&'v Value>,
}

impl<'v> FromArgs<'v> for FilterArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        Ok(FilterArgs {
            input: record.required("input")?,
            cond: record.required("cond")?,
            alias: record.optional("as"),
        })
    }
}

/// `{input, in, as?}`
struct MapArgs<'v> {
    input: &'v Value,
    body: &'v Value,
    alias: Option<&'v Value>,
}

impl<'v> FromArgs<'v> for MapArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        Ok(MapArgs {
            input: record.required("input")?,
            body: record.required("in")?,
            alias: record.optional("as"),
        })
    }
}

/// `{input, initialValue, in}`
struct ReduceArgs<'v> {
    input: &'v Value,
    initial_value: &'v Value,
    body: &'v Value,
}

impl<'v> FromArgs<'v> for ReduceArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        Ok(ReduceArgs {
            input: record.required("input")?,
            initial_value: record.required("initialValue")?,
            body: record.required("in")?,
        })
    }
}

/// `{input, n}`
struct TakeArgs<'v> {
    input: &'v Value,
    n: &'v Value,
}

impl<'v> FromArgs<'v> for TakeArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        Ok(TakeArgs {
            input: record.required("input")?,
            n: record.required("n")?,
        })
    }
}

/// `{input, sortBy}`
struct SortArgs<'v> {
    input: &'v Value,
    sort_by: &'v Value,
}

impl<'v> FromArgs<'v> for SortArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        Ok(SortArgs {
            input: record.required("input")?,
            sort_by: record.required("sortBy")?,
        })
    }
}

/// Name under which `$filter`/`$map` bind the current element.
fn binding_name(alias: Option<&Value>, ctx: &EvalCtx<'_>) -> Result<String, EvalError> {
    match alias {
        Some(expr) => Ok(format!("${}", eval_string(expr, ctx)?)),
        None => Ok("$this".to_string()),
    }
}

/// Evaluates `n` and clamps it to a non-negative count.
fn count(n: &Value, ctx: &EvalCtx<'_>) -> Result<usize, EvalError> {
    let n = eval_number(n, ctx)?;
    Ok(if n > 0.0 { n as usize } else { 0 })
}

fn contains(items: &[Value], value: &Value) -> bool {
    items.iter().any(|item| util::values_equal(item, value))
}

fn array_elem_at_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let [array, index]: [&Value; 2] = parse("$arrayElemAt", args)?;
    let mut items = eval_array(array, ctx)?;
    let index = eval_number(index, ctx)?;
    Ok(match util::integral(index) {
        Some(i) if i >= 0 && (i as usize) < items.len() => items.swap_remove(i as usize),
        _ => Value::Null,
    })
}

fn concat_arrays_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$concatArrays", args)?;
    let mut out = Vec::new();
    for e in operands {
        out.extend(eval_array(e, ctx)?);
    }
    Ok(Value::Array(out))
}

fn filter_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: FilterArgs = parse("$filter", args)?;
    let items = eval_array(args.input, ctx)?;
    let name = binding_name(args.alias, ctx)?;
    let mut kept = Vec::new();
    for item in items {
        let scope = ctx.vars.bind(name.as_str(), item.clone());
        if eval_bool(args.cond, &ctx.scoped(&scope))? {
            kept.push(item);
        }
    }
    Ok(Value::Array(kept))
}

fn first_n_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: TakeArgs = parse("$firstN", args)?;
    let mut items = eval_array(args.input, ctx)?;
    items.truncate(count(args.n, ctx)?);
    Ok(Value::Array(items))
}

fn in_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let [value, array]: [&Value; 2] = parse("$in", args)?;
    let value = evaluate(value, ctx)?;
    let items = eval_array(array, ctx)?;
    Ok(Value::Bool(contains(&items, &value)))
}

fn nin_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let [value, array]: [&Value; 2] = parse("$nin", args)?;
    let value = evaluate(value, ctx)?;
    let items = eval_array(array, ctx)?;
    Ok(Value::Bool(!contains(&items, &value)))
}

fn index_of_array_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let [array, value]: [&Value; 2] = parse("$indexOfArray", args)?;
    let items = eval_array(array, ctx)?;
    let value = evaluate(value, ctx)?;
    Ok(match items.iter().position(|item| util::values_equal(item, &value)) {
        Some(i) => util::usize_to_value(i),
        None => util::i64_to_value(-1),
    })
}

fn last_n_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: TakeArgs = parse("$lastN", args)?;
    let mut items = eval_array(args.input, ctx)?;
    let n = count(args.n, ctx)?;
    let tail = items.split_off(items.len().saturating_sub(n));
    Ok(Value::Array(tail))
}

fn map_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: MapArgs = parse("$map", args)?;
    let items = eval_array(args.input, ctx)?;
    let name = binding_name(args.alias, ctx)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let scope = ctx.vars.bind(name.as_str(), item);
        out.push(evaluate(args.body, &ctx.scoped(&scope))?);
    }
    Ok(Value::Array(out))
}

/// Sorts numeric `items` by `order` and keeps the first `n`.
fn top_n(
    operator: &'static str,
    args: &Value,
    ctx: &EvalCtx<'_>,
    order: fn(f64, f64) -> Ordering,
) -> Result<Value, EvalError> {
    let args: TakeArgs = parse(operator, args)?;
    let items = eval_array(args.input, ctx)?;
    let n = count(args.n, ctx)?;
    let mut keyed = items
        .into_iter()
        .map(|item| Ok((assert::as_number(&item)?, item)))
        .collect::<Result<Vec<_>, EvalError>>()?;
    keyed.sort_by(|(a, _), (b, _)| order(*a, *b));
    Ok(Value::Array(keyed.into_iter().take(n).map(|(_, item)| item).collect()))
}

fn max_n_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    top_n("$maxN", args, ctx, |a, b| b.total_cmp(&a))
}

fn min_n_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    top_n("$minN", args, ctx, |a, b| a.total_cmp(&b))
}

fn reduce_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: ReduceArgs = parse("$reduce", args)?;
    let items = eval_array(args.input, ctx)?;
    let mut acc = evaluate(args.initial_value, ctx)?;
    for item in items {
        let mut bindings = Map::new();
        bindings.insert("$value".to_string(), acc);
        bindings.insert("$this".to_string(), item);
        let scope = ctx.vars.child(bindings);
        acc = evaluate(args.body, &ctx.scoped(&scope))?;
    }
    Ok(acc)
}

fn reverse_array_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let array: &Value = parse("$reverseArray", args)?;
    let mut items = eval_array(array, ctx)?;
    items.reverse();
    Ok(Value::Array(items))
}

fn size_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let array: &Value = parse("$size", args)?;
    let items = evaluate(array, ctx)?;
    Ok(util::usize_to_value(assert::as_arr(&items)?.len()))
}

/// `[array, n]` takes from the front (n >= 0) or the back (n < 0);
/// `[array, position, n]` takes `n` elements starting at `position`.
fn slice_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$slice", args)?;
    match operands {
        [array, n] => {
            let mut items = eval_array(array, ctx)?;
            let n = eval_number(n, ctx)? as i64;
            if n >= 0 {
                items.truncate(n as usize);
                Ok(Value::Array(items))
            } else {
                let start = util::normalize_slice_index(n, items.len());
                Ok(Value::Array(items.split_off(start)))
            }
        }
        [array, position, n] => {
            let items = eval_array(array, ctx)?;
            let position = eval_number(position, ctx)? as i64;
            let n = eval_number(n, ctx)? as i64;
            let start = util::normalize_slice_index(position, items.len());
            let end = util::normalize_slice_index(position.saturating_add(n), items.len());
            if end <= start {
                return Ok(Value::Array(vec![]));
            }
            Ok(Value::Array(items[start..end].to_vec()))
        }
        _ => Err(EvalError::args("$slice", "two or three operands")),
    }
}

fn sort_array_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: SortArgs = parse("$sortArray", args)?;
    let items = eval_array(args.input, ctx)?;
    let items = util::try_merge_sort_by(items, |first, second| {
        let mut bindings = Map::new();
        bindings.insert("$first".to_string(), first.clone());
        bindings.insert("$second".to_string(), second.clone());
        let scope = ctx.vars.child(bindings);
        let c = eval_number(args.sort_by, &ctx.scoped(&scope))?;
        Ok(c.partial_cmp(&0.0).unwrap_or(Ordering::Equal))
    })?;
    Ok(Value::Array(items))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$arrayElemAt", aliases: &[], eval_fn: array_elem_at_eval }),
        Arc::new(OperatorDefinition { name: "$concatArrays", aliases: &[], eval_fn: concat_arrays_eval }),
        Arc::new(OperatorDefinition { name: "$filter", aliases: &[], eval_fn: filter_eval }),
        Arc::new(OperatorDefinition { name: "$firstN", aliases: &[], eval_fn: first_n_eval }),
        Arc::new(OperatorDefinition { name: "$in", aliases: &[], eval_fn: in_eval }),
        Arc::new(OperatorDefinition { name: "$indexOfArray", aliases: &[], eval_fn: index_of_array_eval }),
        Arc::new(OperatorDefinition { name: "$lastN", aliases: &[], eval_fn: last_n_eval }),
        Arc::new(OperatorDefinition { name: "$map", aliases: &[], eval_fn: map_eval }),
        Arc::new(OperatorDefinition { name: "$maxN", aliases: &[], eval_fn: max_n_eval }),
        Arc::new(OperatorDefinition { name: "$minN", aliases: &[], eval_fn: min_n_eval }),
        Arc::new(OperatorDefinition { name: "$nin", aliases: &[], eval_fn: nin_eval }),
        Arc::new(OperatorDefinition { name: "$reduce", aliases: &[], eval_fn: reduce_eval }),
        Arc::new(OperatorDefinition { name: "$reverseArray", aliases: &[], eval_fn: reverse_array_eval }),
        Arc::new(OperatorDefinition { name: "$size", aliases: &[], eval_fn: size_eval }),
        Arc::new(OperatorDefinition { name: "$slice", aliases: &[], eval_fn: slice_eval }),
        Arc::new(OperatorDefinition { name: "$sortArray", aliases: &[], eval_fn: sort_array_eval }),
    ]
}
