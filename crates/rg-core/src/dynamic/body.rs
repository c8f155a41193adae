use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rg_lang::{CompiledExpr, SymbolTable, Type, Value, compile};

use crate::bindings::Bindings;
use crate::error::{RuleError, Stage};
use crate::rule::{Evaluation, RuleBody};
use crate::scope::Scope;

/// Everything compiled for one input shape.
struct CompiledRule {
    /// Sorted input names with their run-time types.
    shape: Vec<(String, Type)>,
    parameters: Vec<(String, CompiledExpr)>,
    condition: CompiledExpr,
    then: Option<CompiledExpr>,
}

/// Rule body driven by expression source text.
///
/// Compiles lazily on first evaluation and caches the result together with
/// the input shape it was compiled for. A later call with a different shape
/// recompiles and replaces the cache.
pub(crate) struct ExpressionBody {
    rule_id: String,
    scope: Scope,
    condition: String,
    then: Option<String>,
    cache: Mutex<Option<Arc<CompiledRule>>>,
    compilations: AtomicUsize,
}

impl ExpressionBody {
    pub(crate) fn new(rule_id: String, scope: Scope, condition: String, then: Option<String>) -> Self {
        Self {
            rule_id,
            scope,
            condition,
            then,
            cache: Mutex::new(None),
            compilations: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    pub(crate) fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    fn compiled_for(&self, bindings: &Bindings) -> Result<Arc<CompiledRule>, RuleError> {
        let shape = bindings.shape();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(compiled) = cache.as_ref() {
            if compiled.shape == shape {
                return Ok(Arc::clone(compiled));
            }
            rg_debug!(exec, rule = %self.rule_id, "input shape changed, recompiling");
        }

        let compiled = Arc::new(self.compile(shape)?);
        let n = self.compilations.fetch_add(1, Ordering::Relaxed) + 1;
        rg_trace!(
            exec,
            rule = %self.rule_id,
            parameters = compiled.parameters.len(),
            compilations = n,
            "compilation cache filled"
        );
        *cache = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    fn compile(&self, shape: Vec<(String, Type)>) -> Result<CompiledRule, RuleError> {
        let mut symbols: SymbolTable = shape.iter().map(|(n, t)| (n.clone(), t.clone())).collect();

        let mut parameters = Vec::with_capacity(self.scope.len());
        for param in self.scope.iter() {
            let expr = compile(&param.expression, &symbols, None).map_err(|source| RuleError::Compile {
                stage: Stage::Parameter(param.name.clone()),
                source,
            })?;
            symbols.push(param.name.clone(), expr.result_type().clone());
            parameters.push((param.name.clone(), expr));
        }

        let condition = compile(&self.condition, &symbols, Some(&Type::Bool)).map_err(|source| {
            RuleError::Compile {
                stage: Stage::Condition,
                source,
            }
        })?;

        let then = self
            .then
            .as_deref()
            .map(|src| compile(src, &symbols, None))
            .transpose()
            .map_err(|source| RuleError::Compile {
                stage: Stage::Then,
                source,
            })?;

        Ok(CompiledRule {
            shape,
            parameters,
            condition,
            then,
        })
    }
}

impl RuleBody for ExpressionBody {
    fn evaluate(&self, bindings: &Bindings) -> Result<Evaluation, RuleError> {
        let compiled = self.compiled_for(bindings)?;

        let mut scope: Vec<Value> = Vec::with_capacity(bindings.len() + compiled.parameters.len());
        scope.extend(bindings.values().cloned());
        for (name, expr) in &compiled.parameters {
            let value = expr.eval(&scope).map_err(|source| RuleError::Eval {
                stage: Stage::Parameter(name.clone()),
                source,
            })?;
            scope.push(value);
        }

        let matched = compiled
            .condition
            .eval_bool(&scope)
            .map_err(|source| RuleError::Eval {
                stage: Stage::Condition,
                source,
            })?;
        Ok(Evaluation { matched, scope })
    }

    fn produce(&self, bindings: &Bindings, evaluation: &Evaluation) -> Result<Option<Value>, RuleError> {
        let compiled = self.compiled_for(bindings)?;
        let Some(then) = &compiled.then else {
            return Ok(None);
        };
        then.eval(&evaluation.scope)
            .map(Some)
            .map_err(|source| RuleError::Eval {
                stage: Stage::Then,
                source,
            })
    }
}
