//! The session's single Go compilation unit.
//!
//! `main`'s statement list is held apart from the rest of the file so it can be
//! appended to and truncated without searching the declarations every time.

use crate::ast::{Block, Decl, File, ImportSpec, Stmt};
use crate::parser::{parse_file, ParseError};
use crate::printer::print_file;

pub const INITIAL_SOURCE: &str = r#"package main

import "fmt"

func p(xx ...interface{}) {
	for _, x := range xx {
		fmt.Printf("%#v\n", x)
	}
}

func main() {
}
"#;

/// Name of the display helper every bare expression is wrapped in.
pub const PRINT_FUNC: &str = "p";

#[derive(Debug, Clone)]
pub struct SessionProgram {
    /// Everything except `main`'s statements; `main` is kept with an empty body.
    file: File,
    body: Vec<Stmt>,
}

impl SessionProgram {
    pub fn new() -> Result<Self, ParseError> {
        Self::from_source(INITIAL_SOURCE)
    }

    /// Start a session from arbitrary source, which must declare `func main()` with a body.
    pub fn from_source(src: &str) -> Result<Self, ParseError> {
        let mut file = parse_file(src)?;
        let body = file
            .func_mut("main")
            .and_then(|main| main.body.as_mut())
            .map(|block| std::mem::take(&mut block.stmts))
            .ok_or_else(|| ParseError {
                message: "function main is undeclared in the main package".to_string(),
                offset: 0,
                incomplete: false,
            })?;
        Ok(SessionProgram { file, body })
    }

    pub fn body(&self) -> &[Stmt] {
        &self.body
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    pub fn append_statements(&mut self, stmts: impl IntoIterator<Item = Stmt>) {
        self.body.extend(stmts);
    }

    pub fn truncate(&mut self, len: usize) {
        self.body.truncate(len);
    }

    pub fn imports(&self) -> &[ImportSpec] {
        &self.file.imports
    }

    /// Add an import unless one with the same path already exists.
    pub fn add_import(&mut self, path: &str, alias: Option<String>) -> bool {
        if self.file.imports.iter().any(|spec| spec.path == path) {
            return false;
        }
        self.file.imports.push(ImportSpec::new(path, alias));
        true
    }

    pub fn clear_discards(&mut self) {
        for spec in &mut self.file.imports {
            spec.discarded = false;
        }
    }

    /// Bind the import with `path` to `_` until the next `clear_discards`.
    pub fn discard_import(&mut self, path: &str) -> bool {
        match self.file.imports.iter_mut().find(|spec| spec.path == path) {
            Some(spec) => {
                spec.discarded = true;
                true
            }
            None => false,
        }
    }

    /// The complete compilation unit, with `main`'s current body in place.
    pub fn to_file(&self) -> File {
        let mut file = self.file.clone();
        for decl in &mut file.decls {
            if let Decl::Func(f) = decl {
                if f.name == "main" {
                    f.body = Some(Block {
                        stmts: self.body.clone(),
                    });
                }
            }
        }
        file
    }

    pub fn source(&self) -> String {
        print_file(&self.to_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_stmts;

    #[test]
    fn initial_program_round_trips() {
        let program = SessionProgram::new().unwrap();
        assert_eq!(program.body_len(), 0);
        assert_eq!(program.source(), INITIAL_SOURCE);
    }

    #[test]
    fn append_and_truncate() {
        let mut program = SessionProgram::new().unwrap();
        program.append_statements(parse_stmts("x := 1\ny := 2").unwrap());
        assert_eq!(program.body_len(), 2);
        assert!(program.source().contains("func main() {\n\tx := 1\n\ty := 2\n}\n"));
        program.truncate(1);
        assert!(program.source().contains("func main() {\n\tx := 1\n}\n"));
    }

    #[test]
    fn imports_are_unique_by_path() {
        let mut program = SessionProgram::new().unwrap();
        assert!(program.add_import("os", None));
        assert!(!program.add_import("os", None));
        assert!(!program.add_import("fmt", Some("f".to_string())));
        assert_eq!(program.imports().len(), 2);
    }

    #[test]
    fn discards_are_transient() {
        let mut program = SessionProgram::new().unwrap();
        program.add_import("math/rand", Some("mr".to_string()));
        assert!(program.discard_import("math/rand"));
        assert!(!program.discard_import("strings"));
        assert!(program.source().contains("\t_ \"math/rand\"\n"));
        program.clear_discards();
        assert!(program.source().contains("\tmr \"math/rand\"\n"));
    }

    #[test]
    fn source_without_main_is_rejected() {
        let err = SessionProgram::from_source("package main\n").unwrap_err();
        assert!(err.message.contains("main"));
    }
}
