use chrono::{Datelike, NaiveDate};

use crate::error::{CompileError, EvalError};
use crate::types::{Type, equatable, numeric_promote, unify};
use crate::value::{Value, parse_iso_date};

/// Builtin functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Len,
    Lower,
    Upper,
    Trim,
    Contains,
    StartsWith,
    EndsWith,
    Abs,
    Min,
    Max,
    Round,
    Str,
    Int,
    Float,
    Date,
    Age,
    Coalesce,
}

impl Builtin {
    pub(crate) fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "len" => Builtin::Len,
            "lower" => Builtin::Lower,
            "upper" => Builtin::Upper,
            "trim" => Builtin::Trim,
            "contains" => Builtin::Contains,
            "starts_with" => Builtin::StartsWith,
            "ends_with" => Builtin::EndsWith,
            "abs" => Builtin::Abs,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "round" => Builtin::Round,
            "str" => Builtin::Str,
            "int" => Builtin::Int,
            "float" => Builtin::Float,
            "date" => Builtin::Date,
            "age" => Builtin::Age,
            "coalesce" => Builtin::Coalesce,
            _ => return None,
        })
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Lower => "lower",
            Builtin::Upper => "upper",
            Builtin::Trim => "trim",
            Builtin::Contains => "contains",
            Builtin::StartsWith => "starts_with",
            Builtin::EndsWith => "ends_with",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Round => "round",
            Builtin::Str => "str",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Date => "date",
            Builtin::Age => "age",
            Builtin::Coalesce => "coalesce",
        }
    }

    fn arity(self) -> usize {
        match self {
            Builtin::Contains
            | Builtin::StartsWith
            | Builtin::EndsWith
            | Builtin::Min
            | Builtin::Max
            | Builtin::Age
            | Builtin::Coalesce => 2,
            _ => 1,
        }
    }

    /// Check argument types and compute the result type.
    pub(crate) fn check(self, args: &[Type]) -> Result<Type, CompileError> {
        if args.len() != self.arity() {
            return Err(CompileError::Arity {
                name: self.name().to_string(),
                expected: self.arity().to_string(),
                found: args.len(),
            });
        }
        let bad = |i: usize, want: &str| {
            CompileError::Type(format!(
                "{}() argument {} must be {want}, found {}",
                self.name(),
                i + 1,
                args[i]
            ))
        };

        match self {
            Builtin::Len => match &args[0] {
                Type::Str | Type::List(_) => Ok(Type::Int),
                _ => Err(bad(0, "string or list")),
            },
            Builtin::Lower | Builtin::Upper | Builtin::Trim => {
                expect(&args[0], &Type::Str).ok_or_else(|| bad(0, "string"))?;
                Ok(Type::Str)
            }
            Builtin::Contains => match (&args[0], &args[1]) {
                (Type::Str, Type::Str) => Ok(Type::Bool),
                (Type::Str, _) => Err(bad(1, "string")),
                (Type::List(elem), item) if equatable(elem, item) => Ok(Type::Bool),
                (Type::List(elem), _) => Err(bad(1, &format!("comparable with {elem}"))),
                _ => Err(bad(0, "string or list")),
            },
            Builtin::StartsWith | Builtin::EndsWith => {
                expect(&args[0], &Type::Str).ok_or_else(|| bad(0, "string"))?;
                expect(&args[1], &Type::Str).ok_or_else(|| bad(1, "string"))?;
                Ok(Type::Bool)
            }
            Builtin::Abs => {
                if args[0].is_numeric() {
                    Ok(args[0].clone())
                } else {
                    Err(bad(0, "numeric"))
                }
            }
            Builtin::Min | Builtin::Max => {
                if !args[0].is_numeric() {
                    return Err(bad(0, "numeric"));
                }
                numeric_promote(&args[0], &args[1]).ok_or_else(|| bad(1, "numeric"))
            }
            Builtin::Round => {
                if args[0].is_numeric() {
                    Ok(Type::Int)
                } else {
                    Err(bad(0, "numeric"))
                }
            }
            Builtin::Str => Ok(Type::Str),
            Builtin::Int => match &args[0] {
                Type::Int | Type::Float | Type::Str => Ok(Type::Int),
                _ => Err(bad(0, "numeric or string")),
            },
            Builtin::Float => {
                if args[0].is_numeric() {
                    Ok(Type::Float)
                } else {
                    Err(bad(0, "numeric"))
                }
            }
            Builtin::Date => {
                expect(&args[0], &Type::Str).ok_or_else(|| bad(0, "string"))?;
                Ok(Type::Date)
            }
            Builtin::Age => {
                expect(&args[0], &Type::Date).ok_or_else(|| bad(0, "date"))?;
                expect(&args[1], &Type::Date).ok_or_else(|| bad(1, "date"))?;
                Ok(Type::Int)
            }
            Builtin::Coalesce => unify(&args[0], &args[1]).ok_or_else(|| {
                CompileError::Type(format!(
                    "coalesce() arguments have incompatible types {} and {}",
                    args[0], args[1]
                ))
            }),
        }
    }

    /// Apply the function to already-evaluated arguments.
    pub(crate) fn call(self, args: Vec<Value>) -> Result<Value, EvalError> {
        let mismatch = |args: &[Value]| {
            let shown: Vec<String> = args.iter().map(|v| v.type_of().to_string()).collect();
            EvalError::TypeMismatch(format!("{}({})", self.name(), shown.join(", ")))
        };

        match (self, args.as_slice()) {
            (Builtin::Len, [Value::Str(s)]) => Ok(Value::Int(s.chars().count() as i64)),
            (Builtin::Len, [Value::List(items)]) => Ok(Value::Int(items.len() as i64)),
            (Builtin::Lower, [Value::Str(s)]) => Ok(Value::Str(s.to_lowercase())),
            (Builtin::Upper, [Value::Str(s)]) => Ok(Value::Str(s.to_uppercase())),
            (Builtin::Trim, [Value::Str(s)]) => Ok(Value::Str(s.trim().to_string())),
            (Builtin::Contains, [Value::Str(s), Value::Str(sub)]) => {
                Ok(Value::Bool(s.contains(sub.as_str())))
            }
            (Builtin::Contains, [Value::List(items), needle]) => Ok(Value::Bool(
                items.iter().any(|item| crate::eval::values_equal(item, needle)),
            )),
            (Builtin::StartsWith, [Value::Str(s), Value::Str(p)]) => {
                Ok(Value::Bool(s.starts_with(p.as_str())))
            }
            (Builtin::EndsWith, [Value::Str(s), Value::Str(p)]) => {
                Ok(Value::Bool(s.ends_with(p.as_str())))
            }
            (Builtin::Abs, [Value::Int(i)]) => {
                i.checked_abs().map(Value::Int).ok_or(EvalError::Overflow("abs"))
            }
            (Builtin::Abs, [Value::Float(f)]) => Ok(Value::Float(f.abs())),
            (Builtin::Min | Builtin::Max, [Value::Int(a), Value::Int(b)]) => {
                Ok(Value::Int(if self == Builtin::Min { *a.min(b) } else { *a.max(b) }))
            }
            (Builtin::Min | Builtin::Max, [a, b]) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Ok(Value::Float(if self == Builtin::Min {
                    x.min(y)
                } else {
                    x.max(y)
                })),
                _ => Err(mismatch(&args)),
            },
            (Builtin::Round, [Value::Int(i)]) => Ok(Value::Int(*i)),
            (Builtin::Round, [Value::Float(f)]) => float_to_int(f.round(), "round"),
            (Builtin::Str, [v]) => Ok(Value::Str(v.to_string())),
            (Builtin::Int, [Value::Int(i)]) => Ok(Value::Int(*i)),
            (Builtin::Int, [Value::Float(f)]) => float_to_int(f.trunc(), "int"),
            (Builtin::Int, [Value::Str(s)]) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                EvalError::TypeMismatch(format!("cannot convert \"{s}\" to int"))
            }),
            (Builtin::Float, [v]) => v.as_f64().map(Value::Float).ok_or_else(|| mismatch(&args)),
            (Builtin::Date, [Value::Str(s)]) => parse_iso_date(s)
                .map(Value::Date)
                .ok_or_else(|| EvalError::InvalidDate(s.clone())),
            (Builtin::Age, [Value::Date(birth), Value::Date(at)]) => {
                Ok(Value::Int(whole_years(*birth, *at)))
            }
            (Builtin::Coalesce, [Value::Null, b]) => Ok(b.clone()),
            (Builtin::Coalesce, [a, _]) => Ok(a.clone()),
            _ => Err(mismatch(&args)),
        }
    }
}

fn expect(actual: &Type, want: &Type) -> Option<()> {
    (actual == want).then_some(())
}

fn float_to_int(f: f64, op: &'static str) -> Result<Value, EvalError> {
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Value::Int(f as i64))
    } else {
        Err(EvalError::Overflow(op))
    }
}

/// Whole years elapsed from `birth` to `at`; negative if `at` precedes `birth`.
fn whole_years(birth: NaiveDate, at: NaiveDate) -> i64 {
    let mut years = i64::from(at.year()) - i64::from(birth.year());
    if (at.month(), at.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years() {
        assert_eq!(whole_years(ymd(1950, 6, 15), ymd(2025, 6, 14)), 74);
        assert_eq!(whole_years(ymd(1950, 6, 15), ymd(2025, 6, 15)), 75);
        assert_eq!(whole_years(ymd(2000, 2, 29), ymd(2001, 2, 28)), 0);
    }

    #[test]
    fn arity_is_checked() {
        let err = Builtin::Len.check(&[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "function 'len' expects 1 argument(s), got 0"
        );
    }

    #[test]
    fn contains_on_list_uses_element_type() {
        let list = Type::list(Type::Str);
        assert_eq!(Builtin::Contains.check(&[list.clone(), Type::Str]), Ok(Type::Bool));
        assert!(Builtin::Contains.check(&[list, Type::Bool]).is_err());
    }

    #[test]
    fn min_max_promote() {
        assert_eq!(Builtin::Min.check(&[Type::Int, Type::Float]), Ok(Type::Float));
        assert_eq!(
            Builtin::Max.call(vec![Value::Int(3), Value::Int(9)]),
            Ok(Value::Int(9))
        );
        assert_eq!(
            Builtin::Min.call(vec![Value::Int(3), Value::Float(1.5)]),
            Ok(Value::Float(1.5))
        );
    }

    #[test]
    fn conversions() {
        assert_eq!(Builtin::Int.call(vec![Value::from(" 42 ")]), Ok(Value::Int(42)));
        assert!(Builtin::Int.call(vec![Value::from("x")]).is_err());
        assert_eq!(Builtin::Round.call(vec![Value::Float(2.5)]), Ok(Value::Int(3)));
        assert_eq!(
            Builtin::Round.call(vec![Value::Float(f64::INFINITY)]),
            Err(EvalError::Overflow("round"))
        );
        assert_eq!(
            Builtin::Date.call(vec![Value::from("2025-13-01")]),
            Err(EvalError::InvalidDate("2025-13-01".into()))
        );
    }

    #[test]
    fn coalesce_skips_null() {
        assert_eq!(
            Builtin::Coalesce.call(vec![Value::Null, Value::from("x")]),
            Ok(Value::from("x"))
        );
        assert_eq!(Builtin::Coalesce.check(&[Type::Null, Type::Str]), Ok(Type::Str));
    }
}
