//! Expression language used by rule conditions, parameters and success actions.
//!
//! Source text is parsed into an [`ast::Expr`], resolved against an ordered
//! [`SymbolTable`] by the checker, and evaluated by a small tree interpreter
//! over slot-ordered [`Value`]s.

pub mod ast;
mod builtins;
mod checker;
mod compile;
mod error;
mod eval;
pub mod parse_utils;
mod parser;
mod symbols;
mod types;
mod value;

pub use compile::{CompiledExpr, check, compile};
pub use error::{CompileError, EvalError};
pub use parser::parse_expr;
pub use symbols::{Symbol, SymbolTable};
pub use types::Type;
pub use value::{Record, Value};
