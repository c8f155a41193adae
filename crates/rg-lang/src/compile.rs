use crate::checker::{self, Node};
use crate::error::{CompileError, EvalError};
use crate::eval;
use crate::parser::parse_expr;
use crate::symbols::SymbolTable;
use crate::types::Type;
use crate::value::Value;

/// A parsed, type-checked expression bound to the slots of the symbol table
/// it was compiled against. Parse once, evaluate many times.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    node: Node,
    result_type: Type,
}

impl CompiledExpr {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn result_type(&self) -> &Type {
        &self.result_type
    }

    /// Evaluate over slot-ordered values (one per symbol of the compile-time table).
    pub fn eval(&self, values: &[Value]) -> Result<Value, EvalError> {
        eval::eval(&self.node, values)
    }

    /// Evaluate an expression compiled with an expected `bool` type.
    pub fn eval_bool(&self, values: &[Value]) -> Result<bool, EvalError> {
        match self.eval(values)? {
            Value::Bool(b) => Ok(b),
            other => Err(EvalError::TypeMismatch(format!(
                "expected bool result, found {}",
                other.type_of()
            ))),
        }
    }
}

/// Parse and type-check `source` against `symbols`. When `expected` is given
/// the inferred result type must be acceptable where `expected` is required.
pub fn compile(
    source: &str,
    symbols: &SymbolTable,
    expected: Option<&Type>,
) -> Result<CompiledExpr, CompileError> {
    let ast = parse_expr(source)?;
    let (node, result_type) = checker::resolve(&ast, symbols)?;
    if let Some(expected) = expected
        && !expected.accepts(&result_type)
    {
        return Err(CompileError::Expected {
            expected: expected.clone(),
            found: result_type,
        });
    }
    Ok(CompiledExpr {
        source: source.to_string(),
        node,
        result_type,
    })
}

/// Same work as [`compile`] without keeping the compiled form.
/// Returns the inferred result type.
pub fn check(
    source: &str,
    symbols: &SymbolTable,
    expected: Option<&Type>,
) -> Result<Type, CompileError> {
    compile(source, symbols, expected).map(|c| c.result_type)
}
