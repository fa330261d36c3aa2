use crate::types::Kind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown operator: {0}")]
    OperatorNotFound(String),

    #[error("Expected one of these types: {}, got {actual}.", Kind::join(.expected))]
    TypeMismatch {
        expected: &'static [Kind],
        actual: Kind,
    },

    #[error("Invalid conversion target: {0}")]
    InvalidConversion(String),

    #[error("Variable {path} not found")]
    VariableResolutionFailure { path: String },

    #[error("\"{operator}\" operator expects {expected}.")]
    InvalidArguments {
        operator: &'static str,
        expected: &'static str,
    },

    #[error("\"{operator}\" operator requires the \"{field}\" field.")]
    MissingField {
        operator: &'static str,
        field: &'static str,
    },

    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),
}

impl EvalError {
    pub(crate) fn args(operator: &'static str, expected: &'static str) -> Self {
        EvalError::InvalidArguments { operator, expected }
    }
}
