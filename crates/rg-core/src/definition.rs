//! Declarative rule-definition tree, as produced by a rule-file loader.

use serde::{Deserialize, Serialize};

/// Named intermediate value: `Name` is bound to the result of `Expression`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterDefinition {
    #[serde(alias = "name")]
    pub name: String,
    #[serde(alias = "expression")]
    pub expression: String,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleDefinition {
    #[serde(alias = "id")]
    pub id: String,
    #[serde(default, alias = "condition")]
    pub condition: String,
    #[serde(default, alias = "then", skip_serializing_if = "Option::is_none")]
    pub then: Option<String>,
    /// `AND` / `OR`, case-insensitive; absent or blank means `AND`.
    #[serde(default, alias = "operator", skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// `"ruleId"` or `"ruleId:true|false"`.
    #[serde(default, alias = "dependsOn", alias = "depends_on")]
    pub depends_on: Vec<String>,
    #[serde(default, alias = "parameters")]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default, alias = "rules")]
    pub rules: Vec<RuleDefinition>,
}

impl RuleDefinition {
    pub fn new(id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
            ..Self::default()
        }
    }

    pub fn then(mut self, then: impl Into<String>) -> Self {
        self.then = Some(then.into());
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.depends_on.push(dependency.into());
        self
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.parameters.push(ParameterDefinition::new(name, expression));
        self
    }

    pub fn child(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Global parameters plus top-level rules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleSetDefinition {
    #[serde(default, alias = "parameters")]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default, alias = "rules")]
    pub rules: Vec<RuleDefinition>,
}

impl RuleSetDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.parameters.push(ParameterDefinition::new(name, expression));
        self
    }

    pub fn rule(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }
}
