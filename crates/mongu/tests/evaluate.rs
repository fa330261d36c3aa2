//! Integration tests for `evaluate` and the built-in operator catalog.

use mongu::{
    eval, eval_with, evaluate, operator_names, operators_map, EvalCtx, EvalError, Kind,
    OperatorDefinition, VariablePolicy, Vars,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn object(data: Value) -> Map<String, Value> {
    match data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => panic!("variables must be an object, got {other}"),
    }
}

fn check(expression: Value, expected: Value, data: Value) {
    let result = eval(&expression, &object(data))
        .unwrap_or_else(|e| panic!("evaluate({expression}) failed: {e}"));
    assert_eq!(result, expected, "expression: {expression}");
}

fn check_err(expression: Value, data: Value) -> EvalError {
    eval(&expression, &object(data))
        .err()
        .unwrap_or_else(|| panic!("expected error for {expression}"))
}

fn as_f64(expression: Value) -> f64 {
    eval(&expression, &Map::new())
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or_else(|| panic!("expected a number from {expression}"))
}

// ------------------------------------------------------------------ Scenarios

#[test]
fn test_scenario_projection() {
    check(
        json!({
            "fullName": {"$concat": [{"$toLower": "$name"}, " ", {"$toLower": "$surname"}]},
            "isAdult": {"$gte": ["$age", 18]}
        }),
        json!({"fullName": "marti serra", "isAdult": true}),
        json!({"name": "Marti", "surname": "Serra", "age": 24}),
    );
}

#[test]
fn test_scenario_filter_with_alias() {
    check(
        json!({"$filter": {"input": [1, 2, 3, 4], "as": "num", "cond": {"$gt": ["$$num", 2]}}}),
        json!([3, 4]),
        json!(null),
    );
}

#[test]
fn test_scenario_switch() {
    check(
        json!({"$switch": {
            "branches": [{"case": false, "then": 1}, {"case": true, "then": 2}],
            "default": 3
        }}),
        json!(2),
        json!(null),
    );
}

#[test]
fn test_scenario_reduce_concat() {
    check(
        json!({"$reduce": {
            "input": ["a", "b", "c"],
            "initialValue": "",
            "in": {"$concat": ["$$value", "$$this"]}
        }}),
        json!("abc"),
        json!(null),
    );
}

#[test]
fn test_scenario_let() {
    check(
        json!({"$let": {"vars": {"age": 24}, "in": {"isAdult": {"$gte": ["$$age", 18]}}}}),
        json!({"isAdult": true}),
        json!(null),
    );
}

// --------------------------------------------------------------- Core shapes

#[test]
fn test_literals_and_escapes() {
    check(json!([1, "a", null, true]), json!([1, "a", null, true]), json!(null));
    check(json!("_$price"), json!("$price"), json!(null));
    check(json!({"_$set": "_$x"}), json!({"$set": "$x"}), json!(null));
    check(json!({"a": {"b": "$x"}}), json!({"a": {"b": 5}}), json!({"x": 5}));
}

#[test]
fn test_variable_paths() {
    let data = json!({"user": {"name": "Marti", "tags": ["a", "b"]}, "$num": 3});
    check(json!("$user.name"), json!("Marti"), data.clone());
    check(json!("$user.tags.1"), json!("b"), data.clone());
    check(json!("$user.tags.9"), json!(null), data.clone());
    check(json!("$user.nope.deeper"), json!(null), data.clone());
    check(json!("$$num"), json!(3), data);
}

#[test]
fn test_strict_variable_policy() {
    let vars = Map::new();
    assert_eq!(
        eval_with(&json!("$missing.path"), &vars, VariablePolicy::Strict),
        Err(EvalError::VariableResolutionFailure {
            path: "$missing.path".to_string()
        })
    );
    assert_eq!(
        eval_with(&json!("$missing"), &vars, VariablePolicy::Lenient),
        Ok(Value::Null)
    );
}

#[test]
fn test_bindings_do_not_leak() {
    check(
        json!([
            {"$map": {"input": [1, 2], "as": "x", "in": "$$x"}},
            {"$filter": {"input": [1], "cond": true}},
            {"$let": {"vars": {"x": 9}, "in": "$$x"}},
            "$$x",
            "$$this"
        ]),
        json!([[1, 2], [1], 9, null, null]),
        json!(null),
    );
}

#[test]
fn test_unknown_operator() {
    assert_eq!(
        check_err(json!({"$frobnicate": [1]}), json!(null)),
        EvalError::OperatorNotFound("$frobnicate".to_string())
    );
}

#[test]
fn test_argument_shape_errors() {
    assert_eq!(
        check_err(json!({"$subtract": 5}), json!(null)),
        EvalError::InvalidArguments {
            operator: "$subtract",
            expected: "two operands"
        }
    );
    assert_eq!(
        check_err(json!({"$map": {"input": [1]}}), json!(null)),
        EvalError::MissingField {
            operator: "$map",
            field: "in"
        }
    );
}

// ----------------------------------------------------------------- Arithmetic

#[test]
fn test_add_multiply() {
    check(json!({"$add": [1, 2, 3]}), json!(6), json!(null));
    check(json!({"$add": []}), json!(0), json!(null));
    check(json!({"$multiply": [2, 3, 4]}), json!(24), json!(null));
    check(json!({"$multiply": []}), json!(1), json!(null));
    check(json!({"$add": ["$a", {"$multiply": ["$b", 2]}]}), json!(7), json!({"a": 1, "b": 3}));
}

#[test]
fn test_whole_results_are_integers() {
    let result = eval(&json!({"$add": []}), &Map::new()).unwrap();
    assert_eq!(result.to_string(), "0");
    let result = eval(&json!({"$divide": [6, 2]}), &Map::new()).unwrap();
    assert_eq!(result.to_string(), "3");
    let result = eval(&json!({"$size": [[1, 2, 3]]}), &Map::new()).unwrap();
    assert_eq!(result.to_string(), "1");
}

#[test]
fn test_subtract_divide_mod() {
    check(json!({"$subtract": [5, 7]}), json!(-2), json!(null));
    check(json!({"$divide": [1, 4]}), json!(0.25), json!(null));
    check(json!({"$divide": [1, 0]}), json!(null), json!(null));
    check(json!({"$mod": [10, 3]}), json!(1), json!(null));
}

#[test]
fn test_unary_math() {
    check(json!({"$abs": -5}), json!(5), json!(null));
    check(json!({"$ceil": 1.1}), json!(2), json!(null));
    check(json!({"$floor": 1.9}), json!(1), json!(null));
    check(json!({"$sqrt": 16}), json!(4), json!(null));
    check(json!({"$exp": 0}), json!(1), json!(null));
    check(json!({"$ln": 1}), json!(0), json!(null));
    check(json!({"$log10": 10}), json!(1), json!(null));
    check(json!({"$pow": [2, 10]}), json!(1024), json!(null));
    check(json!({"$sqrt": -1}), json!(null), json!(null));
    assert!((as_f64(json!({"$log": [8, 2]})) - 3.0).abs() < 1e-9);
}

#[test]
fn test_round_trunc() {
    check(json!({"$round": [5.5]}), json!(6), json!(null));
    check(json!({"$round": [-2.5]}), json!(-2), json!(null));
    check(json!({"$round": [5.43, 1]}), json!(5.4), json!(null));
    check(json!({"$trunc": [-1.9]}), json!(-1), json!(null));
    check(json!({"$trunc": [5.67, 1]}), json!(5.6), json!(null));
}

#[test]
fn test_arithmetic_type_errors() {
    assert_eq!(
        check_err(json!({"$add": [1, "2"]}), json!(null)),
        EvalError::TypeMismatch {
            expected: &[Kind::Number],
            actual: Kind::String
        }
    );
}

// ---------------------------------------------------------------------- Array

#[test]
fn test_array_elem_at() {
    check(json!({"$arrayElemAt": [[1, 2, 3], 1]}), json!(2), json!(null));
    check(json!({"$arrayElemAt": [[1, 2, 3], 3]}), json!(null), json!(null));
    check(json!({"$arrayElemAt": [[1, 2, 3], -1]}), json!(null), json!(null));
    check(json!({"$arrayElemAt": [[], 0]}), json!(null), json!(null));
}

#[test]
fn test_concat_reverse_size() {
    check(json!({"$concatArrays": [[1], [], [2, 3]]}), json!([1, 2, 3]), json!(null));
    check(json!({"$reverseArray": [1, 2, 3]}), json!([3, 2, 1]), json!(null));
    check(json!({"$reverseArray": "$xs"}), json!([2, 1]), json!({"xs": [1, 2]}));
    check(json!({"$size": "$xs"}), json!(2), json!({"xs": [1, 2]}));
}

#[test]
fn test_membership() {
    check(json!({"$in": [2, [1, 2, 3]]}), json!(true), json!(null));
    check(json!({"$in": [2.0, [1, 2]]}), json!(true), json!(null));
    check(json!({"$in": ["x", []]}), json!(false), json!(null));
    check(json!({"$nin": ["x", ["y"]]}), json!(true), json!(null));
    check(json!({"$indexOfArray": [["a", "b"], "b"]}), json!(1), json!(null));
    check(json!({"$indexOfArray": [["a", "b"], "c"]}), json!(-1), json!(null));
}

#[test]
fn test_first_last_n() {
    check(json!({"$firstN": {"input": [1, 2, 3], "n": 2}}), json!([1, 2]), json!(null));
    check(json!({"$firstN": {"input": [1], "n": 5}}), json!([1]), json!(null));
    check(json!({"$lastN": {"input": [1, 2, 3], "n": 2}}), json!([2, 3]), json!(null));
    check(json!({"$lastN": {"input": [1, 2, 3], "n": 0}}), json!([]), json!(null));
}

#[test]
fn test_max_min_n() {
    check(json!({"$maxN": {"input": [3, 1, 2], "n": 2}}), json!([3, 2]), json!(null));
    check(json!({"$minN": {"input": [3, 1, 2], "n": 2}}), json!([1, 2]), json!(null));
    assert!(matches!(
        check_err(json!({"$maxN": {"input": [1, "a"], "n": 1}}), json!(null)),
        EvalError::TypeMismatch { .. }
    ));
}

#[test]
fn test_slice() {
    check(json!({"$slice": [[1, 2, 3, 4], 2]}), json!([1, 2]), json!(null));
    check(json!({"$slice": [[1, 2, 3, 4], -2]}), json!([3, 4]), json!(null));
    check(json!({"$slice": [[1, 2, 3, 4], 1, 2]}), json!([2, 3]), json!(null));
    check(json!({"$slice": [[1, 2, 3, 4], -3, 2]}), json!([2, 3]), json!(null));
    check(json!({"$slice": [[1, 2, 3, 4], 10, 2]}), json!([]), json!(null));
}

#[test]
fn test_map_and_filter() {
    check(
        json!({"$map": {"input": [1, 2], "as": "n", "in": {"$multiply": ["$$n", 2]}}}),
        json!([2.0, 4.0]),
        json!(null),
    );
    check(
        json!({"$map": {"input": "$items", "in": "$$this.name"}}),
        json!(["a", "b"]),
        json!({"items": [{"name": "a"}, {"name": "b"}]}),
    );
    assert!(matches!(
        check_err(json!({"$filter": {"input": [1], "cond": 1}}), json!(null)),
        EvalError::TypeMismatch { .. }
    ));
}

#[test]
fn test_reduce_sum() {
    check(
        json!({"$reduce": {"input": [1, 2, 3], "initialValue": 0, "in": {"$add": ["$$value", "$$this"]}}}),
        json!(6),
        json!(null),
    );
    check(
        json!({"$reduce": {"input": [], "initialValue": "seed", "in": "$$this"}}),
        json!("seed"),
        json!(null),
    );
}

#[test]
fn test_sort_array() {
    check(
        json!({"$sortArray": {"input": [3, 1, 2], "sortBy": {"$subtract": ["$$first", "$$second"]}}}),
        json!([1, 2, 3]),
        json!(null),
    );
    check(
        json!({"$sortArray": {
            "input": [{"k": 2, "id": "a"}, {"k": 1, "id": "b"}, {"k": 2, "id": "c"}],
            "sortBy": {"$subtract": ["$$first.k", "$$second.k"]}
        }}),
        json!([{"k": 1, "id": "b"}, {"k": 2, "id": "a"}, {"k": 2, "id": "c"}]),
        json!(null),
    );
    assert!(matches!(
        check_err(json!({"$sortArray": {"input": [2, 1], "sortBy": "x"}}), json!(null)),
        EvalError::TypeMismatch { .. }
    ));
}

// -------------------------------------------------------------------- Boolean

#[test]
fn test_and_or_not() {
    check(json!({"$and": [true, true]}), json!(true), json!(null));
    check(json!({"$and": []}), json!(true), json!(null));
    check(json!({"$or": [false, true]}), json!(true), json!(null));
    check(json!({"$or": []}), json!(false), json!(null));
    check(json!({"$not": [true]}), json!(false), json!(null));
    check(json!({"$not": "$flag"}), json!(true), json!({"flag": false}));
}

#[test]
fn test_and_or_short_circuit() {
    check(json!({"$and": [false, {"$nope": 1}]}), json!(false), json!(null));
    check(json!({"$or": [true, {"$nope": 1}]}), json!(true), json!(null));
    assert_eq!(
        check_err(json!({"$and": [1]}), json!(null)),
        EvalError::TypeMismatch {
            expected: &[Kind::Boolean],
            actual: Kind::Number
        }
    );
}

// ----------------------------------------------------------------- Comparison

#[test]
fn test_eq_ne() {
    check(json!({"$eq": [1, 1.0]}), json!(true), json!(null));
    check(json!({"$eq": [{"a": [1]}, {"a": [1]}]}), json!(true), json!(null));
    check(json!({"$eq": [0, false]}), json!(false), json!(null));
    check(json!({"$ne": ["a", "b"]}), json!(true), json!(null));
}

#[test]
fn test_ordering() {
    check(json!({"$gt": [2, 1]}), json!(true), json!(null));
    check(json!({"$gte": [1, 1]}), json!(true), json!(null));
    check(json!({"$lt": ["a", "b"]}), json!(true), json!(null));
    check(json!({"$lte": [2, 1]}), json!(false), json!(null));
    check(json!({"$cmp": [1, 2]}), json!(-1), json!(null));
    check(json!({"$cmp": ["b", "b"]}), json!(0), json!(null));
    assert!(matches!(
        check_err(json!({"$lt": [1, "a"]}), json!(null)),
        EvalError::TypeMismatch { .. }
    ));
}

// ---------------------------------------------------------------- Conditional

#[test]
fn test_cond() {
    check(
        json!({"$cond": {"if": {"$gte": ["$qty", 100]}, "then": "bulk", "else": "single"}}),
        json!("bulk"),
        json!({"qty": 250}),
    );
    check(json!({"$cond": [false, 1, 2]}), json!(2), json!(null));
    assert!(matches!(
        check_err(json!({"$cond": {"if": "yes", "then": 1, "else": 2}}), json!(null)),
        EvalError::TypeMismatch { .. }
    ));
}

#[test]
fn test_if_null() {
    check(json!({"$ifNull": ["$a", "$b", "fallback"]}), json!("fallback"), json!(null));
    check(json!({"$ifNull": ["$a", "x"]}), json!(false), json!({"a": false}));
}

// --------------------------------------------------------------------- Object

#[test]
fn test_get_field() {
    check(
        json!({"$getField": {"field": "qty", "input": {"item": "apple", "qty": 25}}}),
        json!(25),
        json!(null),
    );
    check(
        json!({"$getField": {"field": "price", "input": "$doc"}}),
        json!(null),
        json!({"doc": {"qty": 1}}),
    );
}

#[test]
fn test_set_field() {
    let data = json!({"doc": {"qty": 25}});
    check(
        json!([{"$setField": {"field": "item", "input": "$doc", "value": "apple"}}, "$doc"]),
        json!([{"qty": 25, "item": "apple"}, {"qty": 25}]),
        data,
    );
}

#[test]
fn test_merge_objects() {
    check(
        json!({"$mergeObjects": [{"item": "apple", "qty": 5}, {"qty": 10, "sale": true}]}),
        json!({"item": "apple", "qty": 10, "sale": true}),
        json!(null),
    );
    check(json!({"$mergeObjects": "$doc"}), json!({"a": 1}), json!({"doc": {"a": 1}}));
    check(json!({"$mergeObjects": []}), json!({}), json!(null));
}

// --------------------------------------------------------------------- String

#[test]
fn test_concat_and_case() {
    check(json!({"$concat": ["marti", " ", "serra"]}), json!("marti serra"), json!(null));
    check(json!({"$toUpper": "Marti Serra"}), json!("MARTI SERRA"), json!(null));
    assert_eq!(
        check_err(json!({"$concat": ["a", 1]}), json!(null)),
        EvalError::TypeMismatch {
            expected: &[Kind::String],
            actual: Kind::Number
        }
    );
}

#[test]
fn test_trims() {
    check(json!({"$ltrim": "   marti   "}), json!("marti   "), json!(null));
    check(json!({"$rtrim": "   marti   "}), json!("   marti"), json!(null));
    check(json!({"$trim": "   marti   "}), json!("marti"), json!(null));
}

#[test]
fn test_split_strlen_substr() {
    check(json!({"$split": ["June-15-2013", "-"]}), json!(["June", "15", "2013"]), json!(null));
    check(json!({"$strLen": "abcde"}), json!(5), json!(null));
    check(json!({"$substr": ["hello world", 1, 3]}), json!("ell"), json!(null));
}

#[test]
fn test_regex_match() {
    check(json!({"$regexMatch": ["hello", "ell"]}), json!(true), json!(null));
    check(json!({"$regexMatch": ["goodbye", "abc"]}), json!(false), json!(null));
}

// ----------------------------------------------------------------------- Type

#[test]
fn test_convert() {
    check(json!({"$convert": {"input": "5", "to": "number"}}), json!(5), json!(null));
    check(json!({"$convert": {"input": 0, "to": "bool"}}), json!(false), json!(null));
    check(json!({"$convert": {"input": 3, "to": "string"}}), json!("3"), json!(null));
    check(
        json!({"$convert": {"input": "$gone", "to": "number", "onNull": 0}}),
        json!(0),
        json!(null),
    );
    assert_eq!(
        check_err(json!({"$convert": {"input": 1, "to": "date"}}), json!(null)),
        EvalError::InvalidConversion("date".to_string())
    );
}

#[test]
fn test_type_predicates() {
    check(json!({"$isNumber": 1}), json!(true), json!(null));
    check(json!({"$isNumber": "1"}), json!(false), json!(null));
    check(json!({"$isString": "$name"}), json!(true), json!({"name": "x"}));
    check(json!({"$isBoolean": null}), json!(false), json!(null));
}

#[test]
fn test_to_conversions() {
    check(json!({"$toBoolean": ""}), json!(false), json!(null));
    check(json!({"$toBoolean": "no"}), json!(true), json!(null));
    check(json!({"$toNumber": "12.5"}), json!(12.5), json!(null));
    check(json!({"$toNumber": "abc"}), json!(null), json!(null));
    check(json!({"$toNumber": null}), json!(0), json!(null));
    check(json!({"$toNumber": ""}), json!(0), json!(null));
    check(json!({"$convert": {"input": "", "to": "number"}}), json!(0), json!(null));
    check(json!({"$toString": true}), json!("true"), json!(null));
    check(json!({"$toString": null}), json!("null"), json!(null));
    check(json!({"$toString": 2.5}), json!("2.5"), json!(null));
}

// ------------------------------------------------------------------- Registry

fn double_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let n = evaluate(args, ctx)?.as_f64().unwrap_or(0.0);
    Ok(json!(n * 2.0))
}

#[test]
fn test_custom_registry() {
    let mut ops = operators_map();
    ops.remove("$add");
    ops.insert(
        "$double".to_string(),
        Arc::new(OperatorDefinition {
            name: "$double",
            aliases: &[],
            eval_fn: double_eval,
        }),
    );
    let vars = Vars::empty();
    let ctx = EvalCtx::new(&vars, Arc::new(ops));
    assert_eq!(evaluate(&json!({"$double": 21}), &ctx), Ok(json!(42.0)));
    assert_eq!(
        evaluate(&json!({"$add": [1]}), &ctx),
        Err(EvalError::OperatorNotFound("$add".to_string()))
    );
}

#[test]
fn test_operator_names_include_aliases() {
    let names = operator_names();
    assert!(names.contains(&"$strLenCP"));
    assert!(names.contains(&"$substrCP"));
    assert!(names.contains(&"$let"));
}

// ----------------------------------------------------------------- Threading

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_registry_and_values_are_shareable() {
    assert_send_sync::<mongu::OperatorMap>();
    assert_send_sync::<Vars<'static>>();
    assert_send_sync::<EvalCtx<'static>>();
}

#[test]
fn test_concurrent_evaluation() {
    let expr = json!({"$reduce": {
        "input": "$xs",
        "initialValue": 0,
        "in": {"$add": ["$$value", "$$this"]}
    }});
    let vars = Vars::from(object(json!({"xs": [1, 2, 3, 4]})));
    let ctx = EvalCtx::with_defaults(&vars);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| evaluate(&expr, &ctx))).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(json!(10)));
        }
    });
}
