use std::fmt;
use std::str::FromStr;

/// Edge to another rule: `rule_id` must have produced `expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub rule_id: String,
    pub expected: bool,
}

impl Dependency {
    pub fn new(rule_id: impl Into<String>, expected: bool) -> Self {
        Self {
            rule_id: rule_id.into(),
            expected,
        }
    }
}

/// Parses `"ruleId"` or `"ruleId:true|false"`; the flag is case-insensitive
/// and defaults to `true`.
impl FromStr for Dependency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, expected) = match s.split_once(':') {
            None => (s.trim(), true),
            Some((id, flag)) => {
                let expected = match flag.trim().to_ascii_lowercase().as_str() {
                    "true" => true,
                    "false" => false,
                    other => return Err(format!("invalid expected result '{other}'")),
                };
                (id.trim(), expected)
            }
        };
        if id.is_empty() {
            return Err("empty rule id".to_string());
        }
        Ok(Dependency::new(id, expected))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rule_id, self.expected)
    }
}

/// How a node's children combine among themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    And,
    Or,
}

/// Case-insensitive `AND` / `OR`; blank text is `AND`.
impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("and") {
            Ok(Operator::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Operator::Or)
        } else {
            Err(format!("unknown operator '{s}'"))
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
        }
    }
}
