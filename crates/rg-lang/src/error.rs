use crate::types::Type;

/// Failure to parse or type-check an expression against a symbol table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("no member '{member}' on type {ty}")]
    UnknownMember { ty: Type, member: String },
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("{0}")]
    Type(String),
    #[error("expression of type {found} is not compatible with expected type {expected}")]
    Expected { expected: Type, found: Type },
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
}

/// Failure while evaluating an already-compiled expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in '{0}'")]
    Overflow(&'static str),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("member '{0}' accessed on null")]
    NullMember(String),
    #[error("record has no member '{0}'")]
    MissingMember(String),
    #[error("invalid date '{0}'")]
    InvalidDate(String),
    #[error("no value bound for slot {slot}, {available} value(s) supplied")]
    MissingSlot { slot: usize, available: usize },
}
