//! Conditional operators. Only the selected branch is evaluated.

use super::eval_bool;
use crate::args::{parse, FromArgs, List, Record};
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::OperatorDefinition;
use serde_json::Value;
use std::sync::Arc;

/// `{if, then, else}` or `[if, then, else]`
struct CondArgs<'v> {
    test: &'v Value,
    then: &'v Value,
    otherwise: &'v Value,
}

impl<'v> FromArgs<'v> for CondArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        if args.is_array() {
            let [test, then, otherwise]: [&Value; 3] = parse(operator, args)?;
            return Ok(CondArgs { test, then, otherwise });
        }
        let record: Record = parse(operator, args)?;
        Ok(CondArgs {
            test: record.required("if")?,
            then: record.required("then")?,
            otherwise: record.required("else")?,
        })
    }
}

/// `{branches: [{case, then}, ...], default?}`
struct SwitchArgs<'v> {
    branches: Vec<(&'v Value, &'v Value)>,
    default: Option<&'v Value>,
}

impl<'v> FromArgs<'v> for SwitchArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        let List(raw) = parse(operator, record.required("branches")?)?;
        let mut branches = Vec::with_capacity(raw.len());
        for branch in raw {
            let branch: Record = parse(operator, branch)?;
            branches.push((branch.required("case")?, branch.required("then")?));
        }
        Ok(SwitchArgs {
            branches,
            default: record.optional("default"),
        })
    }
}

fn cond_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: CondArgs = parse("$cond", args)?;
    if eval_bool(args.test, ctx)? {
        evaluate(args.then, ctx)
    } else {
        evaluate(args.otherwise, ctx)
    }
}

fn if_null_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let List(operands) = parse("$ifNull", args)?;
    let mut last = Value::Null;
    for e in operands {
        last = evaluate(e, ctx)?;
        if !last.is_null() {
            break;
        }
    }
    Ok(last)
}

fn switch_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: SwitchArgs = parse("$switch", args)?;
    for (case, then) in args.branches {
        if eval_bool(case, ctx)? {
            return evaluate(then, ctx);
        }
    }
    match args.default {
        Some(default) => evaluate(default, ctx),
        None => Ok(Value::Null),
    }
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![
        Arc::new(OperatorDefinition { name: "$cond", aliases: &[], eval_fn: cond_eval }),
        Arc::new(OperatorDefinition { name: "$ifNull", aliases: &[], eval_fn: if_null_eval }),
        Arc::new(OperatorDefinition { name: "$switch", aliases: &[], eval_fn: switch_eval }),
    ]
}
