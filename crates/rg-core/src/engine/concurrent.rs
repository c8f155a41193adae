use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use rg_lang::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::bindings::Bindings;
use crate::error::{BindingError, EngineError};

use super::{Engine, RunState, auto_bindings, execute};

/// `0` selects the available parallelism.
pub(crate) fn effective_concurrency(max_concurrency: usize) -> usize {
    if max_concurrency > 0 {
        return max_concurrency;
    }
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn lock(state: &Mutex<RunState>) -> MutexGuard<'_, RunState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Engine {
    /// Run the rule set level by level. Nodes of one level run as concurrent
    /// tasks bounded by `max_concurrency` (`0` = available parallelism); a
    /// level starts only after every task of the previous one has finished.
    ///
    /// Produces the same artifact ids and failing rule ids as [`Engine::run`];
    /// only the order of artifacts and errors within a level may differ.
    pub async fn run_concurrent(
        &self,
        bindings: &Bindings,
        max_concurrency: usize,
    ) -> Result<Vec<String>, EngineError> {
        if bindings.is_empty() {
            return Err(BindingError::Empty.into());
        }
        let started = Instant::now();
        let limit = effective_concurrency(max_concurrency);
        let order = self.table.dependency_order().inspect_err(|e| {
            rg_warn!(exec, error = %e, "graph error, run aborted");
        })?;
        let levels = self.table.levels(&order);

        let bindings = Arc::new(bindings.clone());
        let state = Arc::new(Mutex::new(RunState::default()));
        let semaphore = Arc::new(Semaphore::new(limit));

        for (level, members) in levels.iter().enumerate() {
            rg_trace!(exec, depth = level, rules = members.len(), "level started");
            let mut join_set = JoinSet::new();

            for &idx in members {
                let node = Arc::clone(&self.table.nodes[idx]);
                let bindings = Arc::clone(&bindings);
                let state = Arc::clone(&state);
                let semaphore = Arc::clone(&semaphore);
                let artifacts = Arc::clone(&self.artifacts);

                join_set.spawn(async move {
                    let Ok(_permit) = semaphore.acquire().await else {
                        return;
                    };
                    // Dependencies live in earlier levels, already settled.
                    let satisfied = lock(&state).dependencies_met(&node);
                    let outcome = execute(&node, &bindings, satisfied);
                    lock(&state).record(&node, outcome, &artifacts);
                });
            }

            while let Some(result) = join_set.join_next().await {
                if let Err(e) = result {
                    rg_warn!(exec, depth = level, error = %e, "rule task failed to complete");
                }
            }
        }

        let errors = std::mem::take(&mut lock(&state).errors);
        rg_debug!(
            exec,
            rules = self.table.len(),
            levels = levels.len(),
            max_concurrency = limit,
            errors = errors.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "concurrent run finished"
        );
        Ok(errors)
    }

    /// [`Engine::run_concurrent`] over values keyed by their type names.
    pub async fn run_concurrent_auto<I>(
        &self,
        values: I,
        max_concurrency: usize,
    ) -> Result<Vec<String>, EngineError>
    where
        I: IntoIterator<Item = Value>,
    {
        let bindings = auto_bindings(values)?;
        self.run_concurrent(&bindings, max_concurrency).await
    }
}
