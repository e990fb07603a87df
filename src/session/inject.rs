//! Splice one input into `main`.

use tracing::debug;

use crate::ast::Expr;
use crate::ast::Stmt;
use crate::error::GoreError;
use crate::parser::{parse_expr, parse_stmts};
use crate::program::{SessionProgram, PRINT_FUNC};

/// Append `input` to the program's entry body and return how many statements were added.
///
/// A lone expression is wrapped in the print helper so its value is shown.
/// Anything else must parse as a statement list. When neither works the
/// program is left untouched and the statement parser's error decides between
/// asking for more input and reporting a syntax error.
pub fn inject(program: &mut SessionProgram, input: &str) -> Result<usize, GoreError> {
    match parse_expr(input) {
        Ok(expr) => {
            program.append_statements([Stmt::Expr(Expr::call(Expr::ident(PRINT_FUNC), vec![expr]))]);
            return Ok(1);
        }
        Err(err) => debug!(error = %err.message, "not an expression"),
    }

    match parse_stmts(input) {
        Ok(stmts) => {
            let count = stmts.len();
            program.append_statements(stmts);
            Ok(count)
        }
        Err(err) if err.incomplete => Err(GoreError::Continue),
        Err(err) => Err(GoreError::Syntax {
            message: err.message,
            offset: err.offset,
        }),
    }
}
