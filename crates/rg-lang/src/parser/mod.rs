use winnow::prelude::*;

mod expr;

use crate::ast::Expr;
use crate::error::CompileError;
use crate::parse_utils::ws_skip;

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Parse a complete expression. Trailing input is a syntax error.
pub fn parse_expr(source: &str) -> Result<Expr, CompileError> {
    (ws_skip, expr::parse_expr, ws_skip)
        .map(|(_, e, _)| e)
        .parse(source)
        .map_err(|e| {
            let detail = e.inner().to_string().replace('\n', "; ");
            let detail = if detail.is_empty() {
                "unexpected input".to_string()
            } else {
                detail
            };
            CompileError::Syntax {
                offset: e.offset(),
                message: detail,
            }
        })
}
