use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Type — static type carried by symbols and inferred for expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// Type of the `null` literal and of absent values.
    Null,
    Bool,
    Int,
    Float,
    Str,
    Date,
    /// Homogeneous list. `List(Null)` is the type of an empty list.
    List(Box<Type>),
    /// Structural record: field name → field type.
    Record(BTreeMap<String, Type>),
}

impl Type {
    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Record(fields.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether `<`, `>`, `<=`, `>=` apply to two values of this type.
    pub fn is_orderable(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Str | Type::Date)
    }

    /// Type of member `field` on a value of this type, if any.
    pub fn member(&self, field: &str) -> Option<Type> {
        match self {
            Type::Record(fields) => fields.get(field).cloned(),
            Type::Date => match field {
                "Year" | "Month" | "Day" => Some(Type::Int),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether a value of type `actual` may stand where `self` is expected.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (a, b) if a == b => true,
            (Type::Float, Type::Int) => true,
            (Type::List(_), Type::List(inner)) if **inner == Type::Null => true,
            (Type::List(a), Type::List(b)) => a.accepts(b),
            _ => false,
        }
    }
}

/// Numeric promotion: if both sides are numeric, compute the result type.
pub fn numeric_promote(a: &Type, b: &Type) -> Option<Type> {
    match (a, b) {
        (Type::Int, Type::Int) => Some(Type::Int),
        (Type::Int | Type::Float, Type::Int | Type::Float) => Some(Type::Float),
        _ => None,
    }
}

/// Whether `==` / `!=` may compare the two types.
pub fn equatable(a: &Type, b: &Type) -> bool {
    *a == Type::Null || *b == Type::Null || unify(a, b).is_some()
}

/// Least common type of two branches (if/else arms, list elements).
pub fn unify(a: &Type, b: &Type) -> Option<Type> {
    if a == b {
        return Some(a.clone());
    }
    if let Some(t) = numeric_promote(a, b) {
        return Some(t);
    }
    match (a, b) {
        (Type::Null, other) | (other, Type::Null) => Some(other.clone()),
        (Type::List(x), Type::List(y)) => unify(x, y).map(Type::list),
        _ => None,
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => write!(f, "null"),
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "string"),
            Type::Date => write!(f, "date"),
            Type::List(inner) => write!(f, "list<{inner}>"),
            Type::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Parses scalar and list type names: `int`, `float`, `string`, `bool`,
/// `date`, `null`, `list<T>`. Records have no textual form.
impl FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return inner.parse::<Type>().map(Type::list);
        }
        match s.to_ascii_lowercase().as_str() {
            "null" => Ok(Type::Null),
            "bool" | "boolean" => Ok(Type::Bool),
            "int" | "integer" => Ok(Type::Int),
            "float" | "double" | "number" => Ok(Type::Float),
            "string" | "str" => Ok(Type::Str),
            "date" => Ok(Type::Date),
            other => Err(format!("unknown type name '{other}'")),
        }
    }
}
