use super::parse_expr;
use crate::ast::*;
use crate::error::CompileError;

fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_string())
}

fn member(base: Expr, field: &str) -> Expr {
    Expr::Member {
        base: Box::new(base),
        field: field.to_string(),
    }
}

fn bin(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::BinOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[test]
fn parameter_expression_with_member_chain() {
    let expr = parse_expr("CurrentYear - Person.Birthdate.Year").unwrap();
    assert_eq!(
        expr,
        bin(
            BinOp::Sub,
            ident("CurrentYear"),
            member(member(ident("Person"), "Birthdate"), "Year"),
        )
    );
}

#[test]
fn precedence_and_binds_tighter_than_or() {
    let expr = parse_expr("a || b && c").unwrap();
    assert_eq!(
        expr,
        bin(BinOp::Or, ident("a"), bin(BinOp::And, ident("b"), ident("c")))
    );
}

#[test]
fn word_operators_match_symbols() {
    assert_eq!(
        parse_expr("Age >= 13 and Age <= 19").unwrap(),
        parse_expr("Age >= 13 && Age <= 19").unwrap()
    );
    assert_eq!(parse_expr("a or b").unwrap(), parse_expr("a || b").unwrap());
    assert_eq!(parse_expr("not a").unwrap(), parse_expr("!a").unwrap());
}

#[test]
fn arithmetic_is_left_associative() {
    let expr = parse_expr("10 - 3 - 2").unwrap();
    assert_eq!(
        expr,
        bin(
            BinOp::Sub,
            bin(BinOp::Sub, Expr::Int(10), Expr::Int(3)),
            Expr::Int(2),
        )
    );
}

#[test]
fn in_and_not_in_lists() {
    let expr = parse_expr(r#"Car.Make not in ("Ford", "Fiat")"#).unwrap();
    match expr {
        Expr::InList { list, negated, .. } => {
            assert!(negated);
            assert_eq!(list.len(), 2);
        }
        other => panic!("expected InList, got {other:?}"),
    }
}

#[test]
fn if_then_else_and_calls() {
    let expr = parse_expr(r#"if len(Name) > 3 then upper(Name) else "short""#).unwrap();
    assert!(matches!(expr, Expr::IfThenElse { .. }));
}

#[test]
fn record_and_list_literals() {
    let expr = parse_expr(r#"{ label: "Adult", "min age": 18, tags: [1, 2] }"#).unwrap();
    match expr {
        Expr::Record(fields) => {
            let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["label", "min age", "tags"]);
        }
        other => panic!("expected Record, got {other:?}"),
    }
    assert_eq!(parse_expr("[]").unwrap(), Expr::List(vec![]));
}

#[test]
fn bracket_member_access() {
    let expr = parse_expr(r#"Person["first name"]"#).unwrap();
    assert_eq!(expr, member(ident("Person"), "first name"));
}

#[test]
fn string_literal_alone() {
    assert_eq!(
        parse_expr(r#""Adult""#).unwrap(),
        Expr::StringLit("Adult".to_string())
    );
}

#[test]
fn trailing_garbage_is_rejected() {
    let err = parse_expr("Age >= 18 18").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }), "{err}");
}

#[test]
fn unbalanced_paren_is_rejected() {
    let err = parse_expr("(Age >= 18").unwrap_err();
    match err {
        CompileError::Syntax { message, .. } => assert!(!message.contains('\n')),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn reserved_word_is_not_an_identifier() {
    assert!(parse_expr("then + 1").is_err());
}

#[test]
fn empty_input_is_rejected() {
    assert!(parse_expr("   ").is_err());
}
