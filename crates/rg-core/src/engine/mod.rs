//! Execution engine: registration, dependency ordering, sequential and
//! leveled-concurrent runs, artifact collection.

mod concurrent;
mod order;

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use rg_lang::Value;
use tokio::sync::mpsc;

use crate::artifact::{Artifact, ArtifactLog};
use crate::bindings::Bindings;
use crate::error::{BindingError, EngineError};
use crate::rule::RuleNode;

use order::RuleTable;


// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns a rule set and runs it against input bindings.
///
/// Artifacts accumulate across runs until [`Engine::clear_artifacts`].
#[derive(Default)]
pub struct Engine {
    roots: Vec<Arc<RuleNode>>,
    table: RuleTable,
    artifacts: Arc<ArtifactLog>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules<I>(rules: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = RuleNode>,
    {
        let mut engine = Self::new();
        for rule in rules {
            engine.register(rule)?;
        }
        Ok(engine)
    }

    /// Add a top-level rule. Fails if its id or any descendant id is taken.
    pub fn register(&mut self, rule: RuleNode) -> Result<&mut Self, EngineError> {
        let rule = Arc::new(rule);
        let added = self.table.insert_tree(Arc::clone(&rule))?;
        rg_debug!(exec, rule = rule.id(), nodes = added, "rule registered");
        self.roots.push(rule);
        Ok(self)
    }

    /// Top-level rules in registration order.
    pub fn rules(&self) -> &[Arc<RuleNode>] {
        &self.roots
    }

    /// Number of nodes including nested ones.
    pub fn node_count(&self) -> usize {
        self.table.len()
    }

    /// Run every rule once in dependency order. Returns one message per
    /// failed rule; graph and binding errors abort the whole call.
    pub fn run(&self, bindings: &Bindings) -> Result<Vec<String>, EngineError> {
        if bindings.is_empty() {
            return Err(BindingError::Empty.into());
        }
        let started = Instant::now();
        let order = self.table.dependency_order().inspect_err(|e| {
            rg_warn!(exec, error = %e, "graph error, run aborted");
        })?;

        let mut state = RunState::default();
        for idx in order {
            let node = &self.table.nodes[idx];
            let satisfied = state.dependencies_met(node);
            let outcome = execute(node, bindings, satisfied);
            state.record(node, outcome, &self.artifacts);
        }

        rg_debug!(
            exec,
            rules = self.table.len(),
            errors = state.errors.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "sequential run finished"
        );
        Ok(state.errors)
    }

    /// [`Engine::run`] over values keyed by their type names.
    pub fn run_auto<I>(&self, values: I) -> Result<Vec<String>, EngineError>
    where
        I: IntoIterator<Item = Value>,
    {
        let bindings = auto_bindings(values)?;
        self.run(&bindings)
    }

    /// Ordered copy of every artifact produced so far.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts.snapshot()
    }

    pub fn clear_artifacts(&self) {
        self.artifacts.clear();
    }

    /// Receive every artifact appended from now on, in append order.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Artifact> {
        self.artifacts.subscribe()
    }
}

fn auto_bindings<I>(values: I) -> Result<Bindings, BindingError>
where
    I: IntoIterator<Item = Value>,
{
    let values: Vec<Value> = values.into_iter().collect();
    if values.is_empty() {
        return Err(BindingError::Empty);
    }
    Bindings::auto_keyed(values)
}

// ---------------------------------------------------------------------------
// Per-run state shared by both modes
// ---------------------------------------------------------------------------

enum Outcome {
    Passed(Option<Value>),
    Failed(String),
}

#[derive(Default)]
struct RunState {
    results: HashMap<String, bool>,
    errors: Vec<String>,
}

impl RunState {
    fn dependencies_met(&self, node: &RuleNode) -> bool {
        node.dependencies()
            .iter()
            .all(|dep| self.results.get(&dep.rule_id) == Some(&dep.expected))
    }

    fn record(&mut self, node: &RuleNode, outcome: Outcome, artifacts: &ArtifactLog) {
        match outcome {
            Outcome::Passed(value) => {
                self.results.insert(node.id().to_string(), true);
                artifacts.append(Artifact::new(node.id(), value));
            }
            Outcome::Failed(message) => {
                rg_debug!(exec, rule = node.id(), reason = %message, "rule failed");
                self.results.insert(node.id().to_string(), false);
                self.errors.push(message);
            }
        }
    }
}

/// Evaluate one node. Unmet dependencies fail it without touching its condition.
fn execute(node: &RuleNode, bindings: &Bindings, satisfied: bool) -> Outcome {
    let id = node.id();
    if !satisfied {
        let deps: Vec<String> = node.dependencies().iter().map(ToString::to_string).collect();
        return Outcome::Failed(format!(
            "Rule '{id}' failed due to unsatisfied dependencies: {}.",
            deps.join(", ")
        ));
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        let evaluation = node.evaluate(bindings)?;
        if !evaluation.matched {
            return Ok(None);
        }
        node.produce(bindings, &evaluation).map(Some)
    }));

    match result {
        Ok(Ok(Some(value))) => Outcome::Passed(value),
        Ok(Ok(None)) => Outcome::Failed(format!("Rule '{id}' failed.")),
        Ok(Err(e)) => Outcome::Failed(format!("Rule '{id}' failed: {e}")),
        Err(_) => Outcome::Failed(format!("Rule '{id}' failed: evaluation panicked")),
    }
}
