//! `$let`.

use crate::args::{parse, FromArgs, Record};
use crate::error::EvalError;
use crate::eval_ctx::EvalCtx;
use crate::evaluate::evaluate;
use crate::types::{Kind, OperatorDefinition};
use serde_json::{Map, Value};
use std::sync::Arc;

/// `{vars: {name: expr, ...}, in}`
struct LetArgs<'v> {
    vars: &'v Map<String, Value>,
    body: &'v Value,
}

impl<'v> FromArgs<'v> for LetArgs<'v> {
    fn from_args(operator: &'static str, args: &'v Value) -> Result<Self, EvalError> {
        let record: Record = parse(operator, args)?;
        let vars = match record.required("vars")? {
            Value::Object(vars) => vars,
            other => {
                return Err(EvalError::TypeMismatch {
                    expected: &[Kind::Object],
                    actual: Kind::of(other),
                })
            }
        };
        Ok(LetArgs {
            vars,
            body: record.required("in")?,
        })
    }
}

/// Every binding is evaluated in the outer scope, so bindings cannot see
/// each other. `in` sees them as `$$name`.
fn let_eval(args: &Value, ctx: &EvalCtx<'_>) -> Result<Value, EvalError> {
    let args: LetArgs = parse("$let", args)?;
    let mut bindings = Map::with_capacity(args.vars.len());
    for (name, expr) in args.vars {
        bindings.insert(format!("${name}"), evaluate(expr, ctx)?);
    }
    let scope = ctx.vars.child(bindings);
    evaluate(args.body, &ctx.scoped(&scope))
}

pub fn operators() -> Vec<Arc<OperatorDefinition>> {
    vec![Arc::new(OperatorDefinition { name: "$let", aliases: &[], eval_fn: let_eval })]
}
