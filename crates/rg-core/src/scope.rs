//! Parameter scoping shared by rule building and static validation.

use std::sync::Arc;

use crate::definition::ParameterDefinition;

/// A parameter visible to a rule, tagged with the rule that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedParameter {
    pub name: String,
    pub expression: String,
    /// Declaring rule id; `None` for rule-set globals.
    pub owner: Option<String>,
}

/// Ordered, read-only parameter list. Nodes that add no locals share their
/// parent's list.
pub type Scope = Arc<[ScopedParameter]>;

/// Scope holding the rule set's global parameters.
pub fn global_scope(params: &[ParameterDefinition]) -> Scope {
    params
        .iter()
        .map(|p| ScopedParameter {
            name: p.name.clone(),
            expression: p.expression.clone(),
            owner: None,
        })
        .collect()
}

/// Inherited parameters whose name is not redeclared locally, followed by
/// the locals, each list keeping its own order.
pub fn resolve(inherited: &Scope, owner: &str, locals: &[ParameterDefinition]) -> Scope {
    if locals.is_empty() {
        return Arc::clone(inherited);
    }
    inherited
        .iter()
        .filter(|p| !locals.iter().any(|l| l.name == p.name))
        .cloned()
        .chain(locals.iter().map(|l| ScopedParameter {
            name: l.name.clone(),
            expression: l.expression.clone(),
            owner: Some(owner.to_string()),
        }))
        .collect()
}
