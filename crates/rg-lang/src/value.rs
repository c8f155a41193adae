use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::types::Type;

// ---------------------------------------------------------------------------
// Value — runtime value bound to a symbol or produced by an expression
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    List(Vec<Value>),
    Record(Record),
}

/// Named fields with an optional declared type name.
///
/// The type name only matters when a value is auto-keyed into a binding set;
/// record types compare structurally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub type_name: Option<String>,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    /// A record whose binding name is `type_name`.
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: BTreeMap::new(),
        }
    }

    /// A record without a type name; it cannot be auto-keyed.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl Value {
    /// Concrete run-time type of this value.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::Str,
            Value::Date(_) => Type::Date,
            Value::List(items) => {
                let elem = items
                    .iter()
                    .map(Value::type_of)
                    .find(|t| *t != Type::Null)
                    .unwrap_or(Type::Null);
                Type::list(elem)
            }
            Value::Record(rec) => Type::Record(
                rec.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.type_of()))
                    .collect(),
            ),
        }
    }

    /// Name used when this value is auto-keyed into a binding set.
    /// `None` for anonymous records and `null`.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some("Bool"),
            Value::Int(_) => Some("Int"),
            Value::Float(_) => Some("Float"),
            Value::Str(_) => Some("String"),
            Value::Date(_) => Some("Date"),
            Value::List(_) => Some("List"),
            Value::Record(rec) => rec.type_name.as_deref(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Member lookup shared by the interpreter: record fields and date parts.
    pub(crate) fn member(&self, field: &str) -> Option<Value> {
        match self {
            Value::Record(rec) => rec.get(field).cloned(),
            Value::Date(d) => match field {
                "Year" => Some(Value::Int(i64::from(d.year()))),
                "Month" => Some(Value::Int(i64::from(d.month()))),
                "Day" => Some(Value::Int(i64::from(d.day()))),
                _ => None,
            },
            _ => None,
        }
    }

    /// Convert a JSON document into a value. Strings in ISO `YYYY-MM-DD`
    /// form become dates; objects become anonymous records.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => match parse_iso_date(&s) {
                Some(d) => Value::Date(d),
                None => Value::Str(s),
            },
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Record(Record {
                type_name: None,
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            }),
        }
    }

    /// Render as JSON; dates become ISO strings, non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Record(rec) => serde_json::Value::Object(
                rec.fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Strict `YYYY-MM-DD`.
pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Record(rec) => {
                if let Some(name) = &rec.type_name {
                    write!(f, "{name} ")?;
                }
                write!(f, "{{")?;
                for (i, (k, v)) in rec.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_is_structural() {
        let a = Value::from(Record::named("Person").with("Age", 3));
        let b = Value::from(Record::anonymous().with("Age", 40));
        assert_eq!(a.type_of(), b.type_of());
        assert_eq!(a.type_name(), Some("Person"));
        assert_eq!(b.type_name(), None);
    }

    #[test]
    fn date_members_resolve() {
        let d = Value::Date(NaiveDate::from_ymd_opt(1950, 3, 9).unwrap());
        assert_eq!(d.member("Year"), Some(Value::Int(1950)));
        assert_eq!(d.member("Month"), Some(Value::Int(3)));
        assert_eq!(d.member("Week"), None);
    }

    #[test]
    fn json_dates_are_recognised() {
        let json = serde_json::json!({ "Birthdate": "2010-01-01", "Name": "Ann", "Rate": 1.5 });
        let value = Value::from_json(json);
        let Value::Record(rec) = &value else {
            panic!("expected record");
        };
        assert!(matches!(rec.get("Birthdate"), Some(Value::Date(_))));
        assert_eq!(rec.get("Name"), Some(&Value::from("Ann")));
        assert_eq!(value.to_json()["Birthdate"], "2010-01-01");
    }

    #[test]
    fn empty_list_has_null_element_type() {
        assert_eq!(Value::List(vec![]).type_of(), Type::list(Type::Null));
    }
}
