//! Static validation: the same scoping and type checking as a run, over
//! declared input types instead of live values. Nothing is evaluated.

use std::collections::HashSet;
use std::fmt;

use rg_lang::{SymbolTable, Type, check};

use crate::definition::{RuleDefinition, RuleSetDefinition};
use crate::scope::{self, Scope};

/// Which part of a rule definition failed to check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Condition,
    Then,
    /// Parameter declared by the rule itself (or an ancestor rule).
    Parameter(String),
    /// Rule-set global parameter.
    GlobalParameter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationError {
    /// `None` for global parameters.
    pub rule_id: Option<String>,
    pub field: Field,
    pub message: String,
}

/// Renders the line format consumed by editor diagnostics.
impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.rule_id.as_deref().unwrap_or_default();
        match &self.field {
            Field::GlobalParameter(name) => write!(f, "Parameter '{name}' error: {}", self.message),
            Field::Parameter(name) => {
                write!(f, "Rule '{rule}' Parameter '{name}' error: {}", self.message)
            }
            Field::Condition => write!(f, "Rule '{rule}' Condition error: {}", self.message),
            Field::Then => write!(f, "Rule '{rule}' Then error: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Check every expression of `definition` against `inputs`.
///
/// All errors are collected. A parameter inherited by several rules is
/// reported once per distinct message. A parameter that fails to check is
/// left out of the symbol table, so later references to it are reported too.
pub fn validate(definition: &RuleSetDefinition, inputs: &SymbolTable) -> ValidationReport {
    let mut walker = Walker {
        inputs,
        seen: HashSet::new(),
        report: ValidationReport::default(),
    };
    let globals = scope::global_scope(&definition.parameters);
    for rule in &definition.rules {
        walker.rule(rule, &globals);
    }
    rg_debug!(
        check,
        rules = definition.rules.len(),
        errors = walker.report.error_count(),
        "validation finished"
    );
    walker.report
}

struct Walker<'a> {
    inputs: &'a SymbolTable,
    seen: HashSet<ValidationError>,
    report: ValidationReport,
}

impl Walker<'_> {
    fn rule(&mut self, rule: &RuleDefinition, inherited: &Scope) {
        let scope = scope::resolve(inherited, &rule.id, &rule.parameters);
        let mut symbols = self.inputs.clone();

        for param in scope.iter() {
            if param.expression.trim().is_empty() {
                continue;
            }
            match check(&param.expression, &symbols, None) {
                Ok(ty) => {
                    symbols.push(param.name.clone(), ty);
                }
                Err(e) => {
                    let (rule_id, field) = match &param.owner {
                        None => (None, Field::GlobalParameter(param.name.clone())),
                        Some(owner) => (Some(owner.clone()), Field::Parameter(param.name.clone())),
                    };
                    self.push(rule_id, field, e.to_string());
                }
            }
        }

        if !rule.condition.trim().is_empty()
            && let Err(e) = check(&rule.condition, &symbols, Some(&Type::Bool))
        {
            self.push(Some(rule.id.clone()), Field::Condition, e.to_string());
        }
        if let Some(then) = rule.then.as_deref().filter(|t| !t.trim().is_empty())
            && let Err(e) = check(then, &symbols, None)
        {
            self.push(Some(rule.id.clone()), Field::Then, e.to_string());
        }

        for child in &rule.rules {
            self.rule(child, &scope);
        }
    }

    fn push(&mut self, rule_id: Option<String>, field: Field, message: String) {
        let error = ValidationError {
            rule_id,
            field,
            message,
        };
        if self.seen.insert(error.clone()) {
            rg_trace!(check, error = %error, "expression error");
            self.report.errors.push(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> SymbolTable {
        [
            ("CurrentYear", Type::Int),
            ("Person", Type::record([("Birthdate", Type::Date)])),
        ]
        .into_iter()
        .collect()
    }

    fn lines(report: &ValidationReport) -> Vec<String> {
        report.errors.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn valid_definition_has_no_errors() {
        let def = RuleSetDefinition::new()
            .parameter("Age", "CurrentYear - Person.Birthdate.Year")
            .rule(RuleDefinition::new("IsAdult", "Age >= 18").then("\"Adult\""))
            .rule(
                RuleDefinition::new("IsSenior", "Age >= 65")
                    .depends_on("IsAdult")
                    .then("\"Senior\""),
            );
        assert!(validate(&def, &inputs()).is_valid());
    }

    #[test]
    fn undeclared_symbol_in_condition() {
        let def = RuleSetDefinition::new().rule(RuleDefinition::new("R", "Salary > 10"));
        let report = validate(&def, &inputs());
        assert_eq!(
            lines(&report),
            ["Rule 'R' Condition error: unknown identifier 'Salary'"]
        );
    }

    #[test]
    fn every_error_is_collected() {
        let def = RuleSetDefinition::new()
            .parameter("Broken", "Person.Height")
            .rule(
                RuleDefinition::new("A", "Broken > 1")
                    .parameter("Local", "1 +")
                    .then("upper(CurrentYear)"),
            )
            .rule(RuleDefinition::new("B", "CurrentYear"));
        let report = validate(&def, &inputs());
        let lines = lines(&report);
        assert_eq!(report.error_count(), 5, "{lines:#?}");
        assert!(lines[0].starts_with("Parameter 'Broken' error: no member 'Height'"));
        assert!(lines[1].starts_with("Rule 'A' Parameter 'Local' error: syntax error"));
        assert!(lines[2].starts_with("Rule 'A' Condition error: unknown identifier 'Broken'"));
        assert!(lines[3].starts_with("Rule 'A' Then error: upper() argument 1 must be string"));
        assert!(lines[4].starts_with("Rule 'B' Condition error: expression of type int"));
    }

    #[test]
    fn scope_follows_runtime_shadowing() {
        let def = RuleSetDefinition::new()
            .parameter("Limit", "\"eighteen\"")
            .rule(
                RuleDefinition::new("Outer", "Limit > 1")
                    .parameter("Limit", "18")
                    .child(RuleDefinition::new("Inner", "Limit + 1 > 1")),
            )
            .rule(RuleDefinition::new("Plain", "Limit > 1"));
        let report = validate(&def, &inputs());
        assert_eq!(report.error_count(), 1, "{:?}", lines(&report));
        assert!(lines(&report)[0].starts_with("Rule 'Plain' Condition error: ordering '>'"));
    }

    #[test]
    fn global_errors_reported_once() {
        let def = RuleSetDefinition::new()
            .parameter("Bad", "nope")
            .rule(RuleDefinition::new("A", "true"))
            .rule(RuleDefinition::new("B", "true").child(RuleDefinition::new("C", "true")));
        let report = validate(&def, &inputs());
        assert_eq!(
            lines(&report),
            ["Parameter 'Bad' error: unknown identifier 'nope'"]
        );
    }

    #[test]
    fn blank_expressions_are_skipped() {
        let def = RuleSetDefinition::new()
            .parameter("Empty", " ")
            .rule(RuleDefinition::new("A", "").then(""));
        assert!(validate(&def, &inputs()).is_valid());
    }
}
