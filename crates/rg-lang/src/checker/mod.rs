//! Resolves a parsed [`Expr`](crate::ast::Expr) against a [`SymbolTable`]:
//! identifiers become slot reads, member accesses are checked against the
//! base type, and every node gets a static type.

mod infer;

use crate::ast::BinOp;
use crate::builtins::Builtin;
use crate::value::Value;

pub(crate) use infer::resolve;

#[cfg(test)]
mod tests;

/// Resolved, type-checked expression tree evaluated by [`crate::eval`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Const(Value),
    /// Read slot `i` of the value list.
    Slot(usize),
    Member {
        base: Box<Node>,
        field: String,
    },
    Binary {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Neg(Box<Node>),
    Not(Box<Node>),
    Call {
        func: Builtin,
        args: Vec<Node>,
    },
    InList {
        expr: Box<Node>,
        list: Vec<Node>,
        negated: bool,
    },
    If {
        cond: Box<Node>,
        then_node: Box<Node>,
        else_node: Box<Node>,
    },
    List(Vec<Node>),
    Record(Vec<(String, Node)>),
}
