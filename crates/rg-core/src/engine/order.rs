use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::EngineError;
use crate::rule::RuleNode;

// ---------------------------------------------------------------------------
// RuleTable — every registered node, nested ones included, keyed by id
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(crate) struct RuleTable {
    /// Pre-order: each root followed by its descendants.
    pub(crate) nodes: Vec<Arc<RuleNode>>,
    index: HashMap<String, usize>,
}

impl RuleTable {
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check that `root` and all its descendants have ids not yet present
    /// (and distinct among themselves), then add them. Nothing is added on error.
    pub(crate) fn insert_tree(&mut self, root: Arc<RuleNode>) -> Result<usize, EngineError> {
        let mut pending = Vec::new();
        collect_preorder(&root, &mut pending);

        let mut seen = HashSet::with_capacity(pending.len());
        for node in &pending {
            if self.contains(node.id()) || !seen.insert(node.id()) {
                return Err(EngineError::DuplicateRule(node.id().to_string()));
            }
        }

        let added = pending.len();
        for node in pending {
            self.index.insert(node.id().to_string(), self.nodes.len());
            self.nodes.push(node);
        }
        Ok(added)
    }

    /// Depth-first dependency order: every node appears after the nodes it
    /// depends on. Fails on the first cycle or unknown dependency.
    pub(crate) fn dependency_order(&self) -> Result<Vec<usize>, EngineError> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        for idx in 0..self.nodes.len() {
            self.visit(idx, &mut marks, &mut order)?;
        }
        Ok(order)
    }

    fn visit(&self, idx: usize, marks: &mut [Mark], order: &mut Vec<usize>) -> Result<(), EngineError> {
        match marks[idx] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                return Err(EngineError::CircularDependency(
                    self.nodes[idx].id().to_string(),
                ));
            }
            Mark::Unvisited => {}
        }
        marks[idx] = Mark::InProgress;
        for dep in self.nodes[idx].dependencies() {
            let dep_idx = *self
                .index
                .get(&dep.rule_id)
                .ok_or_else(|| EngineError::UnknownRule(dep.rule_id.clone()))?;
            self.visit(dep_idx, marks, order)?;
        }
        marks[idx] = Mark::Done;
        order.push(idx);
        Ok(())
    }

    /// Group `order` into dependency levels. Level 0 has no dependencies;
    /// otherwise a node sits one level above its deepest dependency.
    /// `order` must come from [`Self::dependency_order`].
    pub(crate) fn levels(&self, order: &[usize]) -> Vec<Vec<usize>> {
        let mut level_of = vec![0usize; self.nodes.len()];
        let mut levels: Vec<Vec<usize>> = Vec::new();
        for &idx in order {
            let level = self.nodes[idx]
                .dependencies()
                .iter()
                .filter_map(|dep| self.index.get(&dep.rule_id))
                .map(|&dep_idx| level_of[dep_idx] + 1)
                .max()
                .unwrap_or(0);
            level_of[idx] = level;
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(idx);
        }
        levels
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

fn collect_preorder(node: &Arc<RuleNode>, out: &mut Vec<Arc<RuleNode>>) {
    out.push(Arc::clone(node));
    for child in node.children() {
        collect_preorder(child, out);
    }
}
