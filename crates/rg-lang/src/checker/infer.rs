use std::collections::BTreeMap;

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::builtins::Builtin;
use crate::error::CompileError;
use crate::symbols::SymbolTable;
use crate::types::{Type, equatable, numeric_promote, unify};
use crate::value::{Value, parse_iso_date};

use super::Node;

/// Resolve `expr` against `symbols`, returning the slot-bound tree and its type.
pub(crate) fn resolve(expr: &Expr, symbols: &SymbolTable) -> Result<(Node, Type), CompileError> {
    match expr {
        Expr::Int(i) => Ok((Node::Const(Value::Int(*i)), Type::Int)),
        Expr::Float(f) => Ok((Node::Const(Value::Float(*f)), Type::Float)),
        Expr::StringLit(s) => Ok((Node::Const(Value::Str(s.clone())), Type::Str)),
        Expr::Bool(b) => Ok((Node::Const(Value::Bool(*b)), Type::Bool)),
        Expr::Null => Ok((Node::Const(Value::Null), Type::Null)),
        Expr::Ident(name) => symbols
            .resolve(name)
            .map(|(slot, ty)| (Node::Slot(slot), ty.clone()))
            .ok_or_else(|| CompileError::UnknownIdentifier(name.clone())),
        Expr::Member { base, field } => {
            let (base_node, base_ty) = resolve(base, symbols)?;
            let ty = base_ty
                .member(field)
                .ok_or_else(|| CompileError::UnknownMember {
                    ty: base_ty.clone(),
                    member: field.clone(),
                })?;
            Ok((
                Node::Member {
                    base: Box::new(base_node),
                    field: field.clone(),
                },
                ty,
            ))
        }
        Expr::BinOp { op, left, right } => resolve_binop(*op, left, right, symbols),
        Expr::Unary { op, operand } => {
            let (node, ty) = resolve(operand, symbols)?;
            match op {
                UnaryOp::Neg if ty.is_numeric() => Ok((Node::Neg(Box::new(node)), ty)),
                UnaryOp::Neg => Err(CompileError::Type(format!(
                    "unary '-' requires a numeric operand, found {ty}"
                ))),
                UnaryOp::Not if ty == Type::Bool => Ok((Node::Not(Box::new(node)), Type::Bool)),
                UnaryOp::Not => Err(CompileError::Type(format!(
                    "'not' requires a bool operand, found {ty}"
                ))),
            }
        }
        Expr::FuncCall { name, args } => resolve_call(name, args, symbols),
        Expr::InList {
            expr: target,
            list,
            negated,
        } => {
            let (target_node, target_ty) = resolve(target, symbols)?;
            let mut items = Vec::with_capacity(list.len());
            for item in list {
                let (node, ty) = resolve(item, symbols)?;
                if !equatable(&target_ty, &ty) {
                    return Err(CompileError::Type(format!(
                        "'in' list item of type {ty} cannot be compared with {target_ty}"
                    )));
                }
                items.push(node);
            }
            Ok((
                Node::InList {
                    expr: Box::new(target_node),
                    list: items,
                    negated: *negated,
                },
                Type::Bool,
            ))
        }
        Expr::IfThenElse {
            cond,
            then_expr,
            else_expr,
        } => {
            let (cond_node, cond_ty) = resolve(cond, symbols)?;
            if cond_ty != Type::Bool {
                return Err(CompileError::Type(format!(
                    "if condition must be bool, found {cond_ty}"
                )));
            }
            let (then_node, then_ty) = resolve(then_expr, symbols)?;
            let (else_node, else_ty) = resolve(else_expr, symbols)?;
            let ty = unify(&then_ty, &else_ty).ok_or_else(|| {
                CompileError::Type(format!(
                    "if branches have incompatible types {then_ty} and {else_ty}"
                ))
            })?;
            Ok((
                Node::If {
                    cond: Box::new(cond_node),
                    then_node: Box::new(then_node),
                    else_node: Box::new(else_node),
                },
                ty,
            ))
        }
        Expr::List(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            let mut elem = Type::Null;
            for item in items {
                let (node, ty) = resolve(item, symbols)?;
                elem = unify(&elem, &ty).ok_or_else(|| {
                    CompileError::Type(format!(
                        "list elements have incompatible types {elem} and {ty}"
                    ))
                })?;
                nodes.push(node);
            }
            Ok((Node::List(nodes), Type::list(elem)))
        }
        Expr::Record(fields) => {
            let mut nodes = Vec::with_capacity(fields.len());
            let mut types = BTreeMap::new();
            for (name, value) in fields {
                let (node, ty) = resolve(value, symbols)?;
                if types.insert(name.clone(), ty).is_some() {
                    return Err(CompileError::Type(format!(
                        "duplicate field '{name}' in record literal"
                    )));
                }
                nodes.push((name.clone(), node));
            }
            Ok((Node::Record(nodes), Type::Record(types)))
        }
    }
}

fn resolve_binop(
    op: BinOp,
    left: &Expr,
    right: &Expr,
    symbols: &SymbolTable,
) -> Result<(Node, Type), CompileError> {
    let (lnode, lt) = resolve(left, symbols)?;
    let (rnode, rt) = resolve(right, symbols)?;
    let sym = op.symbol();

    let ty = match op {
        BinOp::And | BinOp::Or => {
            if lt != Type::Bool || rt != Type::Bool {
                return Err(CompileError::Type(format!(
                    "logical '{sym}' requires bool operands, found {lt} and {rt}"
                )));
            }
            Type::Bool
        }
        BinOp::Eq | BinOp::Ne => {
            if !equatable(&lt, &rt) {
                return Err(CompileError::Type(format!(
                    "'{sym}' comparison between incompatible types {lt} and {rt}"
                )));
            }
            Type::Bool
        }
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            let comparable = numeric_promote(&lt, &rt).is_some() || (lt == rt && lt.is_orderable());
            if !comparable {
                return Err(CompileError::Type(format!(
                    "ordering '{sym}' is not defined for {lt} and {rt}"
                )));
            }
            Type::Bool
        }
        BinOp::Add if lt == Type::Str && rt == Type::Str => Type::Str,
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            numeric_promote(&lt, &rt).ok_or_else(|| {
                CompileError::Type(format!(
                    "arithmetic '{sym}' requires numeric operands, found {lt} and {rt}"
                ))
            })?
        }
    };

    Ok((
        Node::Binary {
            op,
            left: Box::new(lnode),
            right: Box::new(rnode),
        },
        ty,
    ))
}

fn resolve_call(
    name: &str,
    args: &[Expr],
    symbols: &SymbolTable,
) -> Result<(Node, Type), CompileError> {
    let func =
        Builtin::lookup(name).ok_or_else(|| CompileError::UnknownFunction(name.to_string()))?;

    let mut nodes = Vec::with_capacity(args.len());
    let mut types = Vec::with_capacity(args.len());
    for arg in args {
        let (node, ty) = resolve(arg, symbols)?;
        nodes.push(node);
        types.push(ty);
    }
    let ty = func.check(&types)?;

    // date("...") with a literal argument folds to a constant.
    if func == Builtin::Date
        && let [Node::Const(Value::Str(text))] = nodes.as_slice()
    {
        let date = parse_iso_date(text)
            .ok_or_else(|| CompileError::InvalidLiteral(format!("date \"{text}\"")))?;
        return Ok((Node::Const(Value::Date(date)), ty));
    }

    Ok((Node::Call { func, args: nodes }, ty))
}
