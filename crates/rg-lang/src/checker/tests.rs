use crate::ast::BinOp;
use crate::builtins::Builtin;
use crate::parser::parse_expr;
use crate::symbols::SymbolTable;
use crate::types::Type;
use crate::value::Value;

use super::{Node, resolve};

fn resolve_src(src: &str, table: &SymbolTable) -> (Node, Type) {
    let expr = parse_expr(src).unwrap();
    resolve(&expr, table).unwrap()
}

fn table() -> SymbolTable {
    [
        ("Score", Type::Int),
        ("Ratio", Type::Float),
        ("Tags", Type::list(Type::Str)),
        ("Score", Type::Float),
    ]
    .into_iter()
    .collect()
}

#[test]
fn identifiers_bind_to_last_slot() {
    let (node, ty) = resolve_src("Score", &table());
    assert_eq!(node, Node::Slot(3));
    assert_eq!(ty, Type::Float);
}

#[test]
fn arithmetic_promotes() {
    let (_, ty) = resolve_src("1 + Ratio", &table());
    assert_eq!(ty, Type::Float);
    let (_, ty) = resolve_src("1 + 2 * 3", &table());
    assert_eq!(ty, Type::Int);
}

#[test]
fn list_literal_unifies_elements() {
    let (_, ty) = resolve_src("[1, 2.5, null]", &table());
    assert_eq!(ty, Type::list(Type::Float));
    let (_, ty) = resolve_src("[]", &table());
    assert_eq!(ty, Type::list(Type::Null));
}

#[test]
fn record_literal_type_and_member() {
    let (_, ty) = resolve_src("{ a: 1, b: \"x\" }.b", &table());
    assert_eq!(ty, Type::Str);
}

#[test]
fn duplicate_record_field_rejected() {
    let expr = parse_expr("{ a: 1, a: 2 }").unwrap();
    assert!(resolve(&expr, &table()).is_err());
}

#[test]
fn calls_resolve_to_builtins() {
    let (node, ty) = resolve_src("contains(Tags, \"vip\")", &table());
    assert_eq!(ty, Type::Bool);
    assert!(matches!(node, Node::Call { func: Builtin::Contains, .. }));
}

#[test]
fn date_literal_is_folded() {
    let (node, ty) = resolve_src("date(\"2024-02-29\")", &table());
    assert_eq!(ty, Type::Date);
    assert!(matches!(node, Node::Const(Value::Date(_))));
}

#[test]
fn comparison_keeps_operator() {
    let (node, ty) = resolve_src("Score >= 10", &table());
    assert_eq!(ty, Type::Bool);
    assert!(matches!(node, Node::Binary { op: BinOp::Ge, .. }));
}

#[test]
fn unknown_function_rejected() {
    let expr = parse_expr("frobnicate(1)").unwrap();
    assert_eq!(
        resolve(&expr, &table()).unwrap_err().to_string(),
        "unknown function 'frobnicate'"
    );
}
