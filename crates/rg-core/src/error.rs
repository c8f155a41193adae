use std::fmt;

use orion_error::ErrorCode;
use rg_lang::{CompileError, EvalError};

/// Usage errors on the runtime input set. Raised before any rule executes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BindingError {
    #[error("Parameters cannot be null or empty.")]
    Empty,
    #[error("Parameter name cannot be null or empty.")]
    BlankName,
    #[error("Duplicate parameter name detected: '{0}'")]
    Duplicate(String),
    #[error(
        "Anonymous type detected in parameters list. Use explicitly named bindings to provide parameter names for anonymous types."
    )]
    Anonymous,
}

impl ErrorCode for BindingError {
    fn error_code(&self) -> i32 {
        match self {
            Self::Empty => 1101,
            Self::BlankName => 1102,
            Self::Duplicate(_) => 1103,
            Self::Anonymous => 1104,
        }
    }
}

/// Malformed declarative rule definitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("rule id cannot be empty")]
    EmptyId,
    #[error("rule '{rule}': malformed dependency '{spec}', expected 'ruleId' or 'ruleId:true|false'")]
    MalformedDependency { rule: String, spec: String },
    #[error("rule '{rule}': unknown operator '{operator}', expected AND or OR")]
    InvalidOperator { rule: String, operator: String },
}

impl ErrorCode for DefinitionError {
    fn error_code(&self) -> i32 {
        match self {
            Self::EmptyId => 1201,
            Self::MalformedDependency { .. } => 1202,
            Self::InvalidOperator { .. } => 1203,
        }
    }
}

/// Errors that abort a whole registration or run call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Rule with ID '{0}' already exists.")]
    DuplicateRule(String),
    #[error("Circular dependency detected for rule '{0}'.")]
    CircularDependency(String),
    #[error("Rule with ID '{0}' not found.")]
    UnknownRule(String),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

impl ErrorCode for EngineError {
    fn error_code(&self) -> i32 {
        match self {
            Self::DuplicateRule(_) => 1001,
            Self::CircularDependency(_) => 1002,
            Self::UnknownRule(_) => 1003,
            Self::Binding(e) => e.error_code(),
            Self::Definition(e) => e.error_code(),
        }
    }
}

/// Where inside a rule an expression failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Parameter(String),
    Condition,
    Then,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parameter(name) => write!(f, "parameter '{name}'"),
            Stage::Condition => write!(f, "condition"),
            Stage::Then => write!(f, "then"),
        }
    }
}

/// Failure of a single rule. Recorded as an error string; never aborts a run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("{stage} compile error: {source}")]
    Compile { stage: Stage, source: CompileError },
    #[error("{stage} evaluation error: {source}")]
    Eval { stage: Stage, source: EvalError },
    /// A nested rule failed while its parent was being evaluated.
    #[error("child '{id}': {source}")]
    Child { id: String, source: Box<RuleError> },
}

impl ErrorCode for RuleError {
    fn error_code(&self) -> i32 {
        match self {
            Self::Compile { .. } => 1301,
            Self::Eval { .. } => 1302,
            Self::Child { .. } => 1303,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_codes_delegate() {
        let e: EngineError = BindingError::Anonymous.into();
        assert_eq!(e.error_code(), 1104);
        assert_eq!(EngineError::UnknownRule("x".into()).error_code(), 1003);
    }

    #[test]
    fn rule_error_names_stage() {
        let e = RuleError::Eval {
            stage: Stage::Parameter("Age".into()),
            source: EvalError::DivisionByZero,
        };
        assert_eq!(e.to_string(), "parameter 'Age' evaluation error: division by zero");
    }

    #[test]
    fn child_error_names_child() {
        let e = RuleError::Child {
            id: "Kid".into(),
            source: Box::new(RuleError::Compile {
                stage: Stage::Condition,
                source: CompileError::UnknownIdentifier("Bogus".into()),
            }),
        };
        assert_eq!(
            e.to_string(),
            "child 'Kid': condition compile error: unknown identifier 'Bogus'"
        );
        assert_eq!(e.error_code(), 1303);
    }
}
