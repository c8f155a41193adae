//! Rule nodes: the executable unit of a rule graph.

mod dependency;

use std::fmt;
use std::sync::Arc;

use rg_lang::Value;

use crate::bindings::Bindings;
use crate::error::RuleError;

pub use dependency::{Dependency, Operator};


// ---------------------------------------------------------------------------
// RuleBody — condition + success action behind a rule node
// ---------------------------------------------------------------------------

/// Result of evaluating a rule body's own condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub matched: bool,
    /// Input values followed by computed parameter values, in slot order.
    pub scope: Vec<Value>,
}

impl Evaluation {
    pub fn matched(matched: bool) -> Self {
        Self {
            matched,
            scope: Vec::new(),
        }
    }
}

/// The evaluable part of a rule node.
pub trait RuleBody: Send + Sync {
    /// Evaluate the condition against `bindings`.
    fn evaluate(&self, bindings: &Bindings) -> Result<Evaluation, RuleError>;

    /// Compute the artifact value after a successful evaluation.
    fn produce(&self, bindings: &Bindings, evaluation: &Evaluation) -> Result<Option<Value>, RuleError>;
}

type ConditionFn = dyn Fn(&Bindings) -> bool + Send + Sync;
type ActionFn = dyn Fn(&Bindings, &str) -> Option<Value> + Send + Sync;

/// Body backed by a host closure.
struct FnBody {
    condition: Box<ConditionFn>,
}

impl RuleBody for FnBody {
    fn evaluate(&self, bindings: &Bindings) -> Result<Evaluation, RuleError> {
        Ok(Evaluation::matched((self.condition)(bindings)))
    }

    fn produce(&self, _bindings: &Bindings, _evaluation: &Evaluation) -> Result<Option<Value>, RuleError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// RuleNode
// ---------------------------------------------------------------------------

pub struct RuleNode {
    id: String,
    operator: Operator,
    dependencies: Vec<Dependency>,
    children: Vec<Arc<RuleNode>>,
    body: Box<dyn RuleBody>,
    action: Option<Box<ActionFn>>,
}

impl RuleNode {
    pub fn new(id: impl Into<String>, body: impl RuleBody + 'static) -> Self {
        Self {
            id: id.into(),
            operator: Operator::And,
            dependencies: Vec::new(),
            children: Vec::new(),
            body: Box::new(body),
            action: None,
        }
    }

    /// A rule whose condition is a host closure.
    pub fn when<F>(id: impl Into<String>, condition: F) -> Self
    where
        F: Fn(&Bindings) -> bool + Send + Sync + 'static,
    {
        Self::new(
            id,
            FnBody {
                condition: Box::new(condition),
            },
        )
    }

    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        self.dependencies.extend(
            dependencies
                .into_iter()
                .map(|(id, expected)| Dependency::new(id, expected)),
        );
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Success action; overrides whatever value the body would produce.
    pub fn then<F>(mut self, action: F) -> Self
    where
        F: Fn(&Bindings, &str) -> Option<Value> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_child(mut self, child: RuleNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn children(&self) -> &[Arc<RuleNode>] {
        &self.children
    }

    /// Evaluate this node and its children. The node's own condition is
    /// AND-combined with the children's aggregate; `operator` only decides
    /// how children combine among themselves. Children are skipped once the
    /// outcome is decided.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<Evaluation, RuleError> {
        let mut evaluation = self.body.evaluate(bindings)?;
        if !evaluation.matched || self.children.is_empty() {
            return Ok(evaluation);
        }
        evaluation.matched = match self.operator {
            Operator::And => {
                let mut all = true;
                for child in &self.children {
                    if !child.evaluate_as_child(bindings)?.matched {
                        all = false;
                        break;
                    }
                }
                all
            }
            Operator::Or => {
                let mut any = false;
                for child in &self.children {
                    if child.evaluate_as_child(bindings)?.matched {
                        any = true;
                        break;
                    }
                }
                any
            }
        };
        Ok(evaluation)
    }

    fn evaluate_as_child(&self, bindings: &Bindings) -> Result<Evaluation, RuleError> {
        self.evaluate(bindings).map_err(|e| RuleError::Child {
            id: self.id.clone(),
            source: Box::new(e),
        })
    }

    /// Artifact value for a successful evaluation.
    pub fn produce(&self, bindings: &Bindings, evaluation: &Evaluation) -> Result<Option<Value>, RuleError> {
        match &self.action {
            Some(action) => Ok(action(bindings, &self.id)),
            None => self.body.produce(bindings, evaluation),
        }
    }
}

impl fmt::Debug for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleNode")
            .field("id", &self.id)
            .field("operator", &self.operator)
            .field("dependencies", &self.dependencies)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}
