//! Builds rule nodes from a declarative [`RuleSetDefinition`].

mod body;

use std::sync::Arc;

use crate::definition::{RuleDefinition, RuleSetDefinition};
use crate::engine::Engine;
use crate::error::{DefinitionError, EngineError};
use crate::rule::{Dependency, Operator, RuleNode};
use crate::scope::{self, Scope};

pub(crate) use body::ExpressionBody;

#[cfg(test)]
mod tests;

/// Build one node per top-level rule, children nested under their parents.
/// Expressions are not compiled here; each node compiles on first evaluation.
pub fn build_rules(definition: &RuleSetDefinition) -> Result<Vec<RuleNode>, DefinitionError> {
    let globals = scope::global_scope(&definition.parameters);
    definition
        .rules
        .iter()
        .map(|rule| build_node(rule, &globals))
        .collect()
}

/// Build and register every rule of `definition`.
pub fn build_engine(definition: &RuleSetDefinition) -> Result<Engine, EngineError> {
    let rules = build_rules(definition)?;
    let engine = Engine::with_rules(rules)?;
    rg_debug!(
        exec,
        rules = definition.rules.len(),
        nodes = engine.node_count(),
        globals = definition.parameters.len(),
        "rule set built"
    );
    Ok(engine)
}

fn build_node(def: &RuleDefinition, inherited: &Scope) -> Result<RuleNode, DefinitionError> {
    if def.id.trim().is_empty() {
        return Err(DefinitionError::EmptyId);
    }

    let operator = def
        .operator
        .as_deref()
        .unwrap_or_default()
        .parse::<Operator>()
        .map_err(|_| DefinitionError::InvalidOperator {
            rule: def.id.clone(),
            operator: def.operator.clone().unwrap_or_default(),
        })?;

    let scope = scope::resolve(inherited, &def.id, &def.parameters);
    let then = def
        .then
        .as_ref()
        .filter(|t| !t.trim().is_empty())
        .cloned();
    let body = ExpressionBody::new(def.id.clone(), Arc::clone(&scope), def.condition.clone(), then);

    let mut node = RuleNode::new(def.id.clone(), body).with_operator(operator);
    for spec in &def.depends_on {
        let dependency = spec
            .parse::<Dependency>()
            .map_err(|_| DefinitionError::MalformedDependency {
                rule: def.id.clone(),
                spec: spec.clone(),
            })?;
        node = node.with_dependency(dependency);
    }
    for child in &def.rules {
        node = node.with_child(build_node(child, &scope)?);
    }
    Ok(node)
}
