//! JSON-native expression evaluator modelled on MongoDB aggregation
//! expressions.
//!
//! # Overview
//!
//! An expression is an already-decoded JSON value. Objects with a single
//! `$`-prefixed key are operator invocations, strings starting with `$` are
//! variable references, and everything else is a literal that is evaluated
//! structurally. A leading `_` escapes a string or key that would otherwise
//! be read as a reference or an operator.
//!
//! # Example
//!
//! ```
//! use mongu::{eval, evaluate, EvalCtx, Vars};
//! use serde_json::json;
//!
//! let expr = json!({
//!     "fullName": {"$concat": [{"$toLower": "$name"}, " ", {"$toLower": "$surname"}]},
//!     "isAdult": {"$gte": ["$age", 18]}
//! });
//! let data = json!({"name": "Marti", "surname": "Serra", "age": 24});
//!
//! let result = eval(&expr, data.as_object().unwrap()).unwrap();
//! assert_eq!(result, json!({"fullName": "marti serra", "isAdult": true}));
//!
//! // The same thing with an explicit context.
//! let vars = Vars::from(data.as_object().unwrap().clone());
//! let ctx = EvalCtx::with_defaults(&vars);
//! assert_eq!(evaluate(&expr, &ctx).unwrap(), result);
//! ```

pub mod args;
pub mod assert;
pub mod error;
pub mod eval_ctx;
pub mod evaluate;
pub mod operators;
pub mod types;
pub mod util;
pub mod vars;

pub use error::EvalError;
pub use eval_ctx::{EvalCtx, VariablePolicy};
pub use evaluate::{eval, eval_with, evaluate};
pub use operators::{default_operators, operator_names, operators_map};
pub use types::{Kind, OperatorDefinition, OperatorMap};
pub use vars::Vars;
