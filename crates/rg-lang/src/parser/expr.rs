use winnow::combinator::{alt, cut_err, opt, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::literal;

use crate::ast::*;
use crate::parse_utils::{Number, ident, kw, name, number_literal, quoted_string, ws_skip};

// ---------------------------------------------------------------------------
// Public entry: full expression
// ---------------------------------------------------------------------------

pub(crate) fn parse_expr(input: &mut &str) -> ModalResult<Expr> {
    or_expr.parse_next(input)
}

// ---------------------------------------------------------------------------
// Precedence levels (lowest to highest)
// ---------------------------------------------------------------------------

/// `or_expr = and_expr { ("||" | "or") and_expr }`
fn or_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = and_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(alt((literal("||").void(), kw("or"))))
            .parse_next(input)?
            .is_some()
        {
            ws_skip.parse_next(input)?;
            let right = cut_err(and_expr).parse_next(input)?;
            left = Expr::BinOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `and_expr = cmp_expr { ("&&" | "and") cmp_expr }`
fn and_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = cmp_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        if opt(alt((literal("&&").void(), kw("and"))))
            .parse_next(input)?
            .is_some()
        {
            ws_skip.parse_next(input)?;
            let right = cut_err(cmp_expr).parse_next(input)?;
            left = Expr::BinOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `cmp_expr = add_expr [cmp_op add_expr | "in" "(" list ")" | "not" "in" "(" list ")"]`
fn cmp_expr(input: &mut &str) -> ModalResult<Expr> {
    let left = add_expr.parse_next(input)?;
    ws_skip.parse_next(input)?;

    // Try "not in"
    if opt((kw("not"), ws_skip, kw("in")))
        .parse_next(input)?
        .is_some()
    {
        ws_skip.parse_next(input)?;
        let list = in_list.parse_next(input)?;
        return Ok(Expr::InList {
            expr: Box::new(left),
            list,
            negated: true,
        });
    }

    // Try "in"
    if opt(kw("in")).parse_next(input)?.is_some() {
        ws_skip.parse_next(input)?;
        let list = in_list.parse_next(input)?;
        return Ok(Expr::InList {
            expr: Box::new(left),
            list,
            negated: false,
        });
    }

    // Try cmp_op
    if let Some(op) = opt(cmp_op).parse_next(input)? {
        ws_skip.parse_next(input)?;
        let right = cut_err(add_expr).parse_next(input)?;
        return Ok(Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    Ok(left)
}

fn in_list(input: &mut &str) -> ModalResult<Vec<Expr>> {
    cut_err(literal("("))
        .context(StrContext::Expected(StrContextValue::Description(
            "'(' after 'in'",
        )))
        .parse_next(input)?;
    ws_skip.parse_next(input)?;
    let list: Vec<Expr> =
        separated(1.., (ws_skip, parse_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")")).parse_next(input)?;
    Ok(list)
}

fn cmp_op(input: &mut &str) -> ModalResult<BinOp> {
    alt((
        literal("==").value(BinOp::Eq),
        literal("!=").value(BinOp::Ne),
        literal("<=").value(BinOp::Le),
        literal(">=").value(BinOp::Ge),
        literal("<").value(BinOp::Lt),
        literal(">").value(BinOp::Gt),
    ))
    .parse_next(input)
}

/// `add_expr = mul_expr { ("+" | "-") mul_expr }`
fn add_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = mul_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("+").value(BinOp::Add),
            literal("-").value(BinOp::Sub),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(mul_expr).parse_next(input)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `mul_expr = unary_expr { ("*" | "/" | "%") unary_expr }`
fn mul_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut left = unary_expr.parse_next(input)?;
    loop {
        ws_skip.parse_next(input)?;
        let op = opt(alt((
            literal("*").value(BinOp::Mul),
            literal("/").value(BinOp::Div),
            literal("%").value(BinOp::Mod),
        )))
        .parse_next(input)?;
        if let Some(op) = op {
            ws_skip.parse_next(input)?;
            let right = cut_err(unary_expr).parse_next(input)?;
            left = Expr::BinOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        } else {
            break;
        }
    }
    Ok(left)
}

/// `unary_expr = ("-" | "!" | "not") unary_expr | postfix_expr`
fn unary_expr(input: &mut &str) -> ModalResult<Expr> {
    let op = opt(alt((
        literal("-").value(UnaryOp::Neg),
        literal("!").value(UnaryOp::Not),
        kw("not").value(UnaryOp::Not),
    )))
    .parse_next(input)?;
    match op {
        Some(op) => {
            ws_skip.parse_next(input)?;
            let operand = cut_err(unary_expr).parse_next(input)?;
            Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            })
        }
        None => postfix_expr.parse_next(input),
    }
}

/// `postfix_expr = primary { "." ident | "[" string "]" }`
fn postfix_expr(input: &mut &str) -> ModalResult<Expr> {
    let mut base = primary.parse_next(input)?;
    loop {
        let saved = *input;
        ws_skip.parse_next(input)?;
        if opt(literal(".")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let field = cut_err(ident)
                .context(StrContext::Expected(StrContextValue::Description(
                    "member name after '.'",
                )))
                .parse_next(input)?;
            base = Expr::Member {
                base: Box::new(base),
                field: field.to_string(),
            };
        } else if opt(literal("[")).parse_next(input)?.is_some() {
            ws_skip.parse_next(input)?;
            let field = cut_err(quoted_string)
                .context(StrContext::Expected(StrContextValue::Description(
                    "quoted member name",
                )))
                .parse_next(input)?;
            ws_skip.parse_next(input)?;
            cut_err(literal("]")).parse_next(input)?;
            base = Expr::Member {
                base: Box::new(base),
                field,
            };
        } else {
            *input = saved;
            break;
        }
    }
    Ok(base)
}

// ---------------------------------------------------------------------------
// Primary
// ---------------------------------------------------------------------------

fn primary(input: &mut &str) -> ModalResult<Expr> {
    alt((
        // Number literal
        number_literal.map(|n| match n {
            Number::Int(i) => Expr::Int(i),
            Number::Float(f) => Expr::Float(f),
        }),
        // String literal
        quoted_string.map(Expr::StringLit),
        // Keyword literals
        kw("true").map(|_| Expr::Bool(true)),
        kw("false").map(|_| Expr::Bool(false)),
        kw("null").map(|_| Expr::Null),
        if_expr,
        paren_expr,
        list_literal,
        record_literal,
        // Ident-based: identifier or function call
        ident_primary,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

/// `if cond then a else b`
fn if_expr(input: &mut &str) -> ModalResult<Expr> {
    kw("if").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let cond = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(kw("then"))
        .context(StrContext::Expected(StrContextValue::Description("'then'")))
        .parse_next(input)?;
    ws_skip.parse_next(input)?;
    let then_expr = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(kw("else"))
        .context(StrContext::Expected(StrContextValue::Description("'else'")))
        .parse_next(input)?;
    ws_skip.parse_next(input)?;
    let else_expr = cut_err(parse_expr).parse_next(input)?;
    Ok(Expr::IfThenElse {
        cond: Box::new(cond),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
    })
}

fn paren_expr(input: &mut &str) -> ModalResult<Expr> {
    literal("(").parse_next(input)?;
    ws_skip.parse_next(input)?;
    let inner = cut_err(parse_expr).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")"))
        .context(StrContext::Expected(StrContextValue::Description("')'")))
        .parse_next(input)?;
    Ok(inner)
}

/// `[a, b, ...]`
fn list_literal(input: &mut &str) -> ModalResult<Expr> {
    literal("[").parse_next(input)?;
    ws_skip.parse_next(input)?;
    if opt(literal("]")).parse_next(input)?.is_some() {
        return Ok(Expr::List(vec![]));
    }
    let items: Vec<Expr> =
        separated(1.., (ws_skip, parse_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal("]"))
        .context(StrContext::Expected(StrContextValue::Description("']'")))
        .parse_next(input)?;
    Ok(Expr::List(items))
}

/// `{ key: expr, "other key": expr }`
fn record_literal(input: &mut &str) -> ModalResult<Expr> {
    literal("{").parse_next(input)?;
    ws_skip.parse_next(input)?;
    if opt(literal("}")).parse_next(input)?.is_some() {
        return Ok(Expr::Record(vec![]));
    }
    let fields: Vec<(String, Expr)> =
        separated(1.., record_field, (ws_skip, literal(","))).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal("}"))
        .context(StrContext::Expected(StrContextValue::Description("'}'")))
        .parse_next(input)?;
    Ok(Expr::Record(fields))
}

fn record_field(input: &mut &str) -> ModalResult<(String, Expr)> {
    ws_skip.parse_next(input)?;
    let key = cut_err(alt((quoted_string, ident.map(str::to_string))))
        .context(StrContext::Expected(StrContextValue::Description(
            "record field name",
        )))
        .parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(":"))
        .context(StrContext::Expected(StrContextValue::Description("':'")))
        .parse_next(input)?;
    ws_skip.parse_next(input)?;
    let value = cut_err(parse_expr).parse_next(input)?;
    Ok((key, value))
}

/// Parse an ident-based primary: function call or bare identifier.
fn ident_primary(input: &mut &str) -> ModalResult<Expr> {
    let first = name.parse_next(input)?;

    let saved = *input;
    ws_skip.parse_next(input)?;

    // first( ... ) → function call
    if opt(literal("(")).parse_next(input)?.is_some() {
        return parse_func_call_args(first.to_string(), input);
    }

    *input = saved;
    Ok(Expr::Ident(first.to_string()))
}

fn parse_func_call_args(name: String, input: &mut &str) -> ModalResult<Expr> {
    ws_skip.parse_next(input)?;

    // Empty args?
    if opt(literal(")")).parse_next(input)?.is_some() {
        return Ok(Expr::FuncCall { name, args: vec![] });
    }

    let args: Vec<Expr> =
        separated(1.., (ws_skip, parse_expr).map(|(_, e)| e), literal(",")).parse_next(input)?;
    ws_skip.parse_next(input)?;
    cut_err(literal(")"))
        .context(StrContext::Expected(StrContextValue::Description(
            "')' after arguments",
        )))
        .parse_next(input)?;

    Ok(Expr::FuncCall { name, args })
}
