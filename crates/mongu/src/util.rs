//! Value helpers shared by the operators.

use crate::error::EvalError;
use crate::types::Kind;
use serde_json::{Number, Value};
use std::cmp::Ordering;

// -------------------------------------------------------------- Number helpers

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Wraps an `f64` result. Whole numbers in the safe integer range are stored
/// as integers so they print as `3`, not `3.0`. Non-finite numbers have no
/// JSON form and become `null`.
pub fn f64_to_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return i64_to_value(n as i64);
    }
    match Number::from_f64(n) {
        Some(num) => Value::Number(num),
        None => Value::Null,
    }
}

pub fn i64_to_value(n: i64) -> Value {
    Value::Number(Number::from(n))
}

pub fn usize_to_value(n: usize) -> Value {
    Value::Number(Number::from(n as u64))
}

/// Rounds half toward positive infinity.
pub fn round_half_up(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// Applies `f` to `n` scaled by `10^places`, then scales back.
pub fn at_places(n: f64, places: f64, f: impl Fn(f64) -> f64) -> f64 {
    let factor = 10f64.powf(places.trunc());
    f(n * factor) / factor
}

/// Converts a number to an integer index, or `None` if it has a fraction.
pub fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 {
        Some(n as i64)
    } else {
        None
    }
}

/// Clamps a possibly negative slice bound into `0..=len`, counting negative
/// values from the end.
pub fn normalize_slice_index(idx: i64, len: usize) -> usize {
    let len = len as i64;
    if idx < 0 {
        (len + idx).max(0) as usize
    } else {
        idx.min(len) as usize
    }
}

// ---------------------------------------------------------- Equality/ordering

/// Structural equality. Numbers compare by value, object key order is
/// ignored.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}

const ORDERED: &[Kind] = &[Kind::Number, Kind::String];

/// Orders two numbers or two strings.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal))
        }
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Number(_), other) => Err(EvalError::TypeMismatch {
            expected: &[Kind::Number],
            actual: Kind::of(other),
        }),
        (Value::String(_), other) => Err(EvalError::TypeMismatch {
            expected: &[Kind::String],
            actual: Kind::of(other),
        }),
        (other, _) => Err(EvalError::TypeMismatch {
            expected: ORDERED,
            actual: Kind::of(other),
        }),
    }
}

// --------------------------------------------------------------- Conversions

/// `null`, `false`, `0` and `""` are false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Converts a value to a number, or `null` when it has no numeric reading.
///
/// `null` and blank strings read as `0`.
pub fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::Null => i64_to_value(0),
        Value::Bool(b) => i64_to_value(i64::from(*b)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return i64_to_value(0);
            }
            if !looks_decimal(trimmed) {
                return Value::Null;
            }
            trimmed.parse::<f64>().map(f64_to_value).unwrap_or(Value::Null)
        }
        Value::Array(_) | Value::Object(_) => Value::Null,
    }
}

// Rejects the spellings Rust accepts but JSON numbers never use ("inf", "NaN").
fn looks_decimal(s: &str) -> bool {
    s.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

/// Renders a value as text.
pub fn str_val(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        // Compact JSON, so `[1,2]` rather than a comma-joined `1,2`.
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    n.as_f64().map(|f| f.to_string()).unwrap_or_default()
}

// --------------------------------------------------------------------- Sort

/// Stable insertion sort with a fallible comparator.
///
/// Stops at the first comparator error. Never panics on a comparator that is
/// not a total order.
pub fn try_insertion_sort_by<T, F>(arr: &mut [T], mut compare: F) -> Result<(), EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    for i in 1..arr.len() {
        let mut j = i;
        while j > 0 && compare(&arr[j - 1], &arr[j])? == Ordering::Greater {
            arr.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(())
}

/// Slices this short are finished by insertion sort.
const INSERTION_RUN: usize = 16;

/// Stable merge sort with a fallible comparator.
///
/// Short runs go through [`try_insertion_sort_by`]; longer ones are split and
/// merged, so the comparator runs `O(n log n)` times. Ties keep the earlier
/// element first.
pub fn try_merge_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Result<Vec<T>, EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    merge_sort(items, &mut compare)
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Result<Vec<T>, EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    if items.len() <= INSERTION_RUN {
        try_insertion_sort_by(&mut items, &mut *compare)?;
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare)?;
    let right = merge_sort(right, compare)?;

    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => compare(a, b)? == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        out.extend(if take_right { right.next() } else { left.next() });
    }
    Ok(out)
}
