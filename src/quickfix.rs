//! Repair the two findings that would otherwise stop every session input from
//! building: locals nobody reads and imports nobody uses.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::ast::Stmt;
use crate::checker::{Checker, Diagnostic, DiagnosticCode};
use crate::program::SessionProgram;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

static UNUSED_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z0-9_]+) declared but not used").unwrap());

static UNUSED_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(".+") imported but not used"#).unwrap());

#[derive(Debug, Error)]
pub enum FixError {
    #[error("{0}")]
    Hard(Diagnostic),
    #[error("no automatic fix for: {0}")]
    Unrecognized(Diagnostic),
    #[error("still failing after {0} fix attempts")]
    Exhausted(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fix {
    UseVariable(String),
    DiscardImport(String),
}

impl Fix {
    fn from_diagnostic(diagnostic: &Diagnostic) -> Option<Fix> {
        match &diagnostic.code {
            Some(DiagnosticCode::UnusedVariable(name)) => Some(Fix::UseVariable(name.clone())),
            Some(DiagnosticCode::UnusedImport(path)) => Some(Fix::DiscardImport(path.clone())),
            Some(_) => None,
            None => Fix::from_message(&diagnostic.message),
        }
    }

    /// Fallback for checkers that only produce text.
    fn from_message(message: &str) -> Option<Fix> {
        if let Some(caps) = UNUSED_VAR_RE.captures(message) {
            return Some(Fix::UseVariable(caps[1].to_string()));
        }
        let caps = UNUSED_IMPORT_RE.captures(message)?;
        let quoted = &caps[1];
        Some(Fix::DiscardImport(quoted[1..quoted.len() - 1].to_string()))
    }

    fn apply(&self, program: &mut SessionProgram) -> bool {
        match self {
            Fix::UseVariable(name) => {
                program.append_statements([Stmt::discard(name.as_str())]);
                true
            }
            Fix::DiscardImport(path) => program.discard_import(path),
        }
    }
}

/// Run `checker` and patch the first finding until the program is clean.
///
/// Returns the number of fixes applied. Only the first diagnostic of each pass
/// is looked at; a hard one, or a soft one with no known fix, ends the loop.
pub fn quick_fix(
    program: &mut SessionProgram,
    checker: &mut dyn Checker,
    max_attempts: usize,
) -> Result<usize, FixError> {
    for attempt in 0..max_attempts {
        let diagnostics = checker.check(&program.to_file());
        let Some(first) = diagnostics.into_iter().next() else {
            return Ok(attempt);
        };
        debug!(attempt, diagnostic = %first, "quick fix");
        if !first.soft {
            return Err(FixError::Hard(first));
        }
        match Fix::from_diagnostic(&first) {
            Some(fix) if fix.apply(program) => {}
            _ => return Err(FixError::Unrecognized(first)),
        }
    }
    Err(FixError::Exhausted(max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::NameChecker;
    use crate::parser::parse_stmts;

    fn program_with(body: &str) -> SessionProgram {
        let mut program = SessionProgram::new().unwrap();
        program.append_statements(parse_stmts(body).unwrap());
        program
    }

    /// Replays canned diagnostics, one list per call.
    struct Scripted(Vec<Vec<Diagnostic>>);

    impl Checker for Scripted {
        fn check(&mut self, _file: &crate::ast::File) -> Vec<Diagnostic> {
            if self.0.is_empty() {
                Vec::new()
            } else {
                self.0.remove(0)
            }
        }
    }

    #[test]
    fn clean_program_needs_no_fix() {
        let mut program = program_with("x := 1\np(x)");
        assert_eq!(quick_fix(&mut program, &mut NameChecker, 10).unwrap(), 0);
        assert_eq!(program.body_len(), 2);
    }

    #[test]
    fn unused_variable_gets_discard_statement() {
        let mut program = program_with("x := 1");
        assert_eq!(quick_fix(&mut program, &mut NameChecker, 10).unwrap(), 1);
        assert_eq!(program.body().last(), Some(&Stmt::discard("x")));
        assert!(program.source().contains("\tx := 1\n\t_ = x\n"));
    }

    #[test]
    fn several_findings_take_several_passes() {
        let mut program = program_with("a, b := 1, 2");
        program.add_import("os", None);
        assert_eq!(quick_fix(&mut program, &mut NameChecker, 10).unwrap(), 3);
        assert_eq!(program.body_len(), 3);
        assert!(program.imports()[1].discarded);
    }

    #[test]
    fn hard_error_stops_the_loop() {
        let mut program = program_with("x := 1\np(nope)");
        let err = quick_fix(&mut program, &mut NameChecker, 10).unwrap_err();
        assert!(matches!(&err, FixError::Hard(d) if d.message == "undefined: nope"));
        assert_eq!(program.body_len(), 2);
    }

    #[test]
    fn budget_bounds_the_passes() {
        let mut program = program_with("a, b, c := 1, 2, 3");
        let err = quick_fix(&mut program, &mut NameChecker, 2).unwrap_err();
        assert!(matches!(err, FixError::Exhausted(2)));
        assert_eq!(program.body_len(), 3);
    }

    #[test]
    fn text_only_diagnostics_are_matched_by_pattern() {
        let mut program = program_with("y := 2");
        program.add_import("strings", None);
        let mut checker = Scripted(vec![
            vec![Diagnostic::new("y declared but not used", true)],
            vec![Diagnostic::new("\"strings\" imported but not used", true)],
        ]);
        assert_eq!(quick_fix(&mut program, &mut checker, 10).unwrap(), 2);
        assert_eq!(program.body().last(), Some(&Stmt::discard("y")));
        assert!(program.imports()[1].discarded);
    }

    #[test]
    fn unknown_soft_finding_is_unrecognized() {
        let mut program = program_with("");
        let mut checker = Scripted(vec![vec![Diagnostic::new("label L defined and not used", true)]]);
        let err = quick_fix(&mut program, &mut checker, 10).unwrap_err();
        assert!(matches!(err, FixError::Unrecognized(_)));
    }

    #[test]
    fn only_the_first_diagnostic_is_acted_on() {
        let mut program = program_with("");
        let mut checker = Scripted(vec![vec![
            Diagnostic::new("a declared but not used", true),
            Diagnostic::new("b declared but not used", true),
        ]]);
        assert_eq!(quick_fix(&mut program, &mut checker, 10).unwrap(), 1);
        assert_eq!(program.body(), &[Stmt::discard("a")]);
    }

    #[test]
    fn message_patterns() {
        assert_eq!(
            Fix::from_message("x1_ declared but not used"),
            Some(Fix::UseVariable("x1_".into()))
        );
        assert_eq!(
            Fix::from_message("\"math/rand\" imported but not used as mr"),
            Some(Fix::DiscardImport("math/rand".into()))
        );
        assert_eq!(Fix::from_message("undefined: x"), None);
    }

    #[test]
    fn message_patterns_compile() {
        assert!(UNUSED_VAR_RE.is_match("n declared but not used"));
        assert!(UNUSED_IMPORT_RE.is_match("\"os\" imported but not used"));
        assert!(!UNUSED_IMPORT_RE.is_match("os imported but not used"));
    }
}
