use std::cmp::Ordering;

use crate::ast::BinOp;
use crate::checker::Node;
use crate::error::EvalError;
use crate::value::{Record, Value};

// ---------------------------------------------------------------------------
// Tree interpreter over slot-ordered values
// ---------------------------------------------------------------------------

/// Evaluate a resolved node. `values[i]` is the value of symbol slot `i`.
pub(crate) fn eval(node: &Node, values: &[Value]) -> Result<Value, EvalError> {
    match node {
        Node::Const(v) => Ok(v.clone()),
        Node::Slot(slot) => values.get(*slot).cloned().ok_or(EvalError::MissingSlot {
            slot: *slot,
            available: values.len(),
        }),
        Node::Member { base, field } => match eval(base, values)? {
            Value::Null => Err(EvalError::NullMember(field.clone())),
            v => v
                .member(field)
                .ok_or_else(|| EvalError::MissingMember(field.clone())),
        },
        Node::Binary { op, left, right } => eval_binop(*op, left, right, values),
        Node::Neg(inner) => match eval(inner, values)? {
            Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow("-")),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(EvalError::TypeMismatch(format!(
                "cannot negate {}",
                other.type_of()
            ))),
        },
        Node::Not(inner) => Ok(Value::Bool(!expect_bool(eval(inner, values)?, "not")?)),
        Node::Call { func, args } => {
            let args = args
                .iter()
                .map(|a| eval(a, values))
                .collect::<Result<Vec<_>, _>>()?;
            func.call(args)
        }
        Node::InList {
            expr,
            list,
            negated,
        } => {
            let target = eval(expr, values)?;
            let mut found = false;
            for item in list {
                if values_equal(&target, &eval(item, values)?) {
                    found = true;
                    break;
                }
            }
            Ok(Value::Bool(found != *negated))
        }
        Node::If {
            cond,
            then_node,
            else_node,
        } => {
            if expect_bool(eval(cond, values)?, "if")? {
                eval(then_node, values)
            } else {
                eval(else_node, values)
            }
        }
        Node::List(items) => items
            .iter()
            .map(|n| eval(n, values))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Node::Record(fields) => {
            let mut rec = Record::anonymous();
            for (name, n) in fields {
                rec.fields.insert(name.clone(), eval(n, values)?);
            }
            Ok(Value::Record(rec))
        }
    }
}

fn eval_binop(op: BinOp, left: &Node, right: &Node, values: &[Value]) -> Result<Value, EvalError> {
    // Logical operators short-circuit.
    match op {
        BinOp::And => {
            let l = expect_bool(eval(left, values)?, "&&")?;
            if !l {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(expect_bool(eval(right, values)?, "&&")?));
        }
        BinOp::Or => {
            let l = expect_bool(eval(left, values)?, "||")?;
            if l {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(expect_bool(eval(right, values)?, "||")?));
        }
        _ => {}
    }

    let lv = eval(left, values)?;
    let rv = eval(right, values)?;

    match op {
        BinOp::Eq => Ok(Value::Bool(values_equal(&lv, &rv))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&lv, &rv))),
        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            let ord = compare_values(&lv, &rv).ok_or_else(|| {
                EvalError::TypeMismatch(format!(
                    "cannot order {} and {}",
                    lv.type_of(),
                    rv.type_of()
                ))
            })?;
            Ok(Value::Bool(match op {
                BinOp::Lt => ord == Ordering::Less,
                BinOp::Gt => ord == Ordering::Greater,
                BinOp::Le => ord != Ordering::Greater,
                _ => ord != Ordering::Less,
            }))
        }
        _ => arith(op, lv, rv),
    }
}

fn arith(op: BinOp, lv: Value, rv: Value) -> Result<Value, EvalError> {
    let sym = op.symbol();
    match (lv, rv) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Sub => a.checked_sub(b),
                BinOp::Mul => a.checked_mul(b),
                BinOp::Div | BinOp::Mod if b == 0 => return Err(EvalError::DivisionByZero),
                BinOp::Div => a.checked_div(b),
                BinOp::Mod => a.checked_rem(b),
                _ => None,
            };
            result.map(Value::Int).ok_or(EvalError::Overflow(sym))
        }
        (Value::Str(a), Value::Str(b)) if op == BinOp::Add => Ok(Value::Str(a + &b)),
        (lv, rv) => match (lv.as_f64(), rv.as_f64()) {
            (Some(a), Some(b)) => match op {
                BinOp::Add => Ok(Value::Float(a + b)),
                BinOp::Sub => Ok(Value::Float(a - b)),
                BinOp::Mul => Ok(Value::Float(a * b)),
                BinOp::Div | BinOp::Mod if b == 0.0 => Err(EvalError::DivisionByZero),
                BinOp::Div => Ok(Value::Float(a / b)),
                BinOp::Mod => Ok(Value::Float(a % b)),
                _ => Err(EvalError::TypeMismatch(format!("operator '{sym}'"))),
            },
            _ => Err(EvalError::TypeMismatch(format!(
                "'{sym}' applied to {} and {}",
                lv.type_of(),
                rv.type_of()
            ))),
        },
    }
}

fn expect_bool(v: Value, ctx: &str) -> Result<bool, EvalError> {
    match v {
        Value::Bool(b) => Ok(b),
        other => Err(EvalError::TypeMismatch(format!(
            "'{ctx}' expects bool, found {}",
            other.type_of()
        ))),
    }
}

/// Equality with numeric promotion: `1 == 1.0`.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => (*x as f64) == *y,
        _ => a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Date(x), Value::Date(y)) => Some(x.cmp(y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}
