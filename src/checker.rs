//! Name resolution for a Go compilation unit.
//!
//! The checker does not infer types. It resolves every identifier against the
//! universe, import, package and block scopes, and reports the findings the
//! auto-fixer needs (unused locals and imports) alongside the hard errors that
//! make a fix pointless.

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::ast::*;
use crate::printer::print_expr;

/// Structured kind of a diagnostic, so consumers need not parse messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticCode {
    UnusedVariable(String),
    /// Carries the unquoted import path.
    UnusedImport(String),
    Undefined(String),
    Redeclared(String),
    NoNewVariables,
    NotUsed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Soft findings do not stop the program from being meaningful; they are
    /// what the auto-fixer repairs.
    pub soft: bool,
    pub code: Option<DiagnosticCode>,
    /// Function the finding originates in, `None` at package level.
    pub func: Option<String>,
    /// Index of the top-level statement within `func`'s body.
    pub stmt: Option<usize>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, soft: bool) -> Self {
        Diagnostic {
            message: message.into(),
            soft,
            code: None,
            func: None,
            stmt: None,
        }
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.func, self.stmt) {
            (Some(func), Some(stmt)) => write!(f, "{} (in {}, statement {})", self.message, func, stmt + 1),
            (Some(func), None) => write!(f, "{} (in {})", self.message, func),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Semantic check over a whole file, returning findings in report order.
pub trait Checker {
    fn check(&mut self, file: &File) -> Vec<Diagnostic>;
}

/// The built-in checker: scope-aware name resolution and usage tracking.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameChecker;

impl Checker for NameChecker {
    fn check(&mut self, file: &File) -> Vec<Diagnostic> {
        Resolver::new(file).run(file)
    }
}

const UNIVERSE: &[&str] = &[
    // types
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
    // constants
    "true", "false", "iota", "nil",
    // functions
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make",
    "max", "min", "new", "panic", "print", "println", "real", "recover",
];

struct Import {
    /// `None` when the import binds nothing (`_`, discarded, or `.`).
    name: Option<String>,
    path: String,
    alias: Option<String>,
    used: bool,
}

struct Local {
    name: String,
    used: bool,
    reportable: bool,
    stmt: Option<usize>,
}

enum Binding {
    Local(usize),
    Package,
    Import(usize),
    Universe,
    Unknown,
}

struct Resolver {
    package: HashSet<String>,
    imports: Vec<Import>,
    dot_import: bool,
    scopes: Vec<HashMap<String, usize>>,
    locals: Vec<Local>,
    func: Option<String>,
    stmt_index: Option<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver {
    fn new(file: &File) -> Self {
        let imports = file
            .imports
            .iter()
            .map(|spec| Import {
                name: spec.local_name().filter(|name| name != "."),
                path: spec.path.clone(),
                alias: spec.alias.clone(),
                used: false,
            })
            .collect();
        let dot_import = file
            .imports
            .iter()
            .any(|spec| !spec.discarded && spec.alias.as_deref() == Some("."));

        let mut package = HashSet::new();
        for decl in &file.decls {
            match decl {
                Decl::Func(f) => {
                    package.insert(f.name.clone());
                }
                Decl::Gen(g) => {
                    for spec in &g.specs {
                        match spec {
                            Spec::Value { names, .. } => package.extend(names.iter().cloned()),
                            Spec::Type { name, .. } => {
                                package.insert(name.clone());
                            }
                        }
                    }
                }
            }
        }

        Resolver {
            package,
            imports,
            dot_import,
            scopes: Vec::new(),
            locals: Vec::new(),
            func: None,
            stmt_index: None,
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self, file: &File) -> Vec<Diagnostic> {
        for decl in &file.decls {
            match decl {
                Decl::Gen(g) => self.package_decl(g),
                Decl::Func(f) => self.func_decl(f),
            }
        }

        let unused: Vec<Diagnostic> = self
            .imports
            .iter()
            .filter(|import| !import.used)
            .filter_map(|import| {
                let name = import.name.as_ref()?;
                let mut message = format!("\"{}\" imported but not used", import.path);
                if let Some(alias) = &import.alias {
                    if *alias != package_name(&import.path) {
                        message.push_str(&format!(" as {}", name));
                    }
                }
                Some(Diagnostic::new(message, true).with_code(DiagnosticCode::UnusedImport(import.path.clone())))
            })
            .collect();
        self.diagnostics.extend(unused);
        self.diagnostics
    }

    // ── Reporting ────────────────────────────────────────────────────────

    fn report(&mut self, message: String, code: DiagnosticCode) {
        let mut diagnostic = Diagnostic::new(message, false).with_code(code);
        diagnostic.func = self.func.clone();
        diagnostic.stmt = self.stmt_index;
        self.diagnostics.push(diagnostic);
    }

    // ── Scopes ───────────────────────────────────────────────────────────

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn lookup(&self, name: &str) -> Binding {
        for scope in self.scopes.iter().rev() {
            if let Some(&idx) = scope.get(name) {
                return Binding::Local(idx);
            }
        }
        if self.package.contains(name) {
            return Binding::Package;
        }
        if let Some(idx) = self
            .imports
            .iter()
            .position(|import| import.name.as_deref() == Some(name))
        {
            return Binding::Import(idx);
        }
        if UNIVERSE.contains(&name) {
            return Binding::Universe;
        }
        Binding::Unknown
    }

    fn new_local(&mut self, name: &str, reportable: bool) -> usize {
        self.locals.push(Local {
            name: name.to_string(),
            used: false,
            reportable,
            stmt: self.stmt_index,
        });
        self.locals.len() - 1
    }

    fn declare(&mut self, name: &str, reportable: bool) {
        if name == "_" {
            return;
        }
        let exists = self
            .scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name));
        if exists {
            self.report(
                format!("{} redeclared in this block", name),
                DiagnosticCode::Redeclared(name.to_string()),
            );
            return;
        }
        let idx = self.new_local(name, reportable);
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), idx);
        }
    }

    fn declare_fields(&mut self, fields: &[Field]) {
        for field in fields {
            for name in &field.names {
                self.declare(name, false);
            }
        }
    }

    // ── Declarations ─────────────────────────────────────────────────────

    fn package_decl(&mut self, decl: &GenDecl) {
        self.func = None;
        self.stmt_index = None;
        for spec in &decl.specs {
            match spec {
                Spec::Value { typ, values, .. } => {
                    if let Some(typ) = typ {
                        self.expr(typ);
                    }
                    for value in values {
                        self.expr(value);
                    }
                }
                Spec::Type { typ, .. } => self.expr(typ),
            }
        }
    }

    fn func_decl(&mut self, f: &FuncDecl) {
        self.func = Some(f.name.clone());
        self.stmt_index = None;
        self.locals.clear();
        self.signature(&f.typ);

        if let Some(body) = &f.body {
            self.push_scope();
            self.declare_fields(&f.typ.params);
            self.declare_fields(&f.typ.results);
            for (idx, stmt) in body.stmts.iter().enumerate() {
                self.stmt_index = Some(idx);
                self.stmt(stmt);
            }
            self.pop_scope();
        }

        let unused: Vec<Diagnostic> = self
            .locals
            .iter()
            .filter(|local| local.reportable && !local.used)
            .map(|local| {
                let mut d = Diagnostic::new(format!("{} declared but not used", local.name), true)
                    .with_code(DiagnosticCode::UnusedVariable(local.name.clone()));
                d.func = Some(f.name.clone());
                d.stmt = local.stmt;
                d
            })
            .collect();
        self.diagnostics.extend(unused);
    }

    fn local_decl(&mut self, decl: &GenDecl) {
        for spec in &decl.specs {
            match spec {
                Spec::Value { names, typ, values } => {
                    if let Some(typ) = typ {
                        self.expr(typ);
                    }
                    for value in values {
                        self.expr(value);
                    }
                    let reportable = decl.kind == DeclKind::Var;
                    for name in names {
                        self.declare(name, reportable);
                    }
                }
                Spec::Type { name, typ, .. } => {
                    self.declare(name, false);
                    self.expr(typ);
                }
            }
        }
    }

    fn signature(&mut self, typ: &FuncType) {
        for field in typ.params.iter().chain(&typ.results) {
            self.expr(&field.typ);
        }
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn block(&mut self, stmts: &[Stmt]) {
        self.push_scope();
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.pop_scope();
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.local_decl(decl),
            Stmt::Empty | Stmt::Branch { .. } => {}
            Stmt::Labeled { stmt, .. } => self.stmt(stmt),
            Stmt::Expr(x) => {
                self.expr(x);
                if !matches!(x.unparen(), Expr::Call { .. } | Expr::Unary { op: "<-", .. }) {
                    self.report(format!("{} is not used", print_expr(x)), DiagnosticCode::NotUsed);
                }
            }
            Stmt::Send { chan, value } => {
                self.expr(chan);
                self.expr(value);
            }
            Stmt::IncDec { x, .. } => self.expr(x),
            Stmt::Assign { lhs, op, rhs } => {
                for x in rhs {
                    self.expr(x);
                }
                match *op {
                    ":=" => self.define(lhs),
                    "=" => {
                        for x in lhs {
                            self.assign_target(x);
                        }
                    }
                    _ => {
                        for x in lhs {
                            self.expr(x);
                        }
                    }
                }
            }
            Stmt::Go(x) | Stmt::Defer(x) => self.expr(x),
            Stmt::Return(results) => {
                for x in results {
                    self.expr(x);
                }
            }
            Stmt::Block(block) => self.block(&block.stmts),
            Stmt::If {
                init,
                cond,
                body,
                els,
            } => {
                self.push_scope();
                if let Some(init) = init {
                    self.stmt(init);
                }
                self.expr(cond);
                self.block(&body.stmts);
                if let Some(els) = els {
                    self.stmt(els);
                }
                self.pop_scope();
            }
            Stmt::Switch { init, tag, clauses } => {
                self.push_scope();
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                }
                for clause in clauses {
                    for x in clause.list.iter().flatten() {
                        self.expr(x);
                    }
                    self.block(&clause.body);
                }
                self.pop_scope();
            }
            Stmt::TypeSwitch {
                init,
                assign,
                clauses,
            } => self.type_switch(init.as_deref(), assign, clauses),
            Stmt::Select(clauses) => {
                for clause in clauses {
                    self.push_scope();
                    if let Some(comm) = &clause.comm {
                        self.stmt(comm);
                    }
                    for stmt in &clause.body {
                        self.stmt(stmt);
                    }
                    self.pop_scope();
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.push_scope();
                if let Some(init) = init {
                    self.stmt(init);
                }
                if let Some(cond) = cond {
                    self.expr(cond);
                }
                if let Some(post) = post {
                    self.stmt(post);
                }
                self.block(&body.stmts);
                self.pop_scope();
            }
            Stmt::Range {
                key,
                value,
                define,
                x,
                body,
            } => {
                self.expr(x);
                self.push_scope();
                let vars = key.iter().chain(value);
                if *define {
                    for var in vars {
                        match var {
                            Expr::Ident(name) => self.declare(name, true),
                            other => self.non_name(other),
                        }
                    }
                } else {
                    for var in vars {
                        self.assign_target(var);
                    }
                }
                self.block(&body.stmts);
                self.pop_scope();
            }
        }
    }

    /// `:=`: the left side must be names and at least one must be new in this block.
    fn define(&mut self, lhs: &[Expr]) {
        let mut fresh = false;
        let mut all_names = true;
        for x in lhs {
            match x {
                Expr::Ident(name) if name == "_" => {}
                Expr::Ident(name) => {
                    let in_block = self
                        .scopes
                        .last()
                        .is_some_and(|scope| scope.contains_key(name.as_str()));
                    if !in_block {
                        self.declare(name, true);
                        fresh = true;
                    }
                }
                other => {
                    self.non_name(other);
                    all_names = false;
                }
            }
        }
        if all_names && !fresh {
            self.report(
                "no new variables on left side of :=".to_string(),
                DiagnosticCode::NoNewVariables,
            );
        }
    }

    fn non_name(&mut self, x: &Expr) {
        self.report(
            format!("non-name {} on left side of :=", print_expr(x)),
            DiagnosticCode::Other,
        );
    }

    /// Left operand of `=`. Storing into a plain variable does not count as using it.
    fn assign_target(&mut self, x: &Expr) {
        match x {
            Expr::Ident(name) if name == "_" => {}
            Expr::Ident(name) => match self.lookup(name) {
                Binding::Import(_) => self.report(
                    format!("use of package {} without selector", name),
                    DiagnosticCode::Other,
                ),
                Binding::Unknown => self.undefined(name),
                _ => {}
            },
            Expr::Paren(inner) => self.assign_target(inner),
            other => self.expr(other),
        }
    }

    fn type_switch(&mut self, init: Option<&Stmt>, assign: &Stmt, clauses: &[CaseClause]) {
        self.push_scope();
        if let Some(init) = init {
            self.stmt(init);
        }
        let (binding, guard) = match assign {
            Stmt::Assign { lhs, rhs, .. } => (lhs.first().and_then(Expr::as_ident), rhs.first()),
            Stmt::Expr(x) => (None, Some(x)),
            _ => (None, None),
        };
        if let Some(Expr::TypeAssert { x, .. }) = guard {
            self.expr(x);
        }
        // One variable shared by every clause: it is unused only if no clause reads it.
        let local = binding
            .filter(|name| *name != "_")
            .map(|name| (name, self.new_local(name, true)));
        for clause in clauses {
            for typ in clause.list.iter().flatten() {
                self.expr(typ);
            }
            self.push_scope();
            if let (Some((name, idx)), Some(scope)) = (local, self.scopes.last_mut()) {
                scope.insert(name.to_string(), idx);
            }
            for stmt in &clause.body {
                self.stmt(stmt);
            }
            self.pop_scope();
        }
        self.pop_scope();
    }

    // ── Expressions ──────────────────────────────────────────────────────

    fn undefined(&mut self, name: &str) {
        if self.dot_import {
            return;
        }
        self.report(
            format!("undefined: {}", name),
            DiagnosticCode::Undefined(name.to_string()),
        );
    }

    fn use_name(&mut self, name: &str) {
        if name == "_" {
            self.report("cannot use _ as value".to_string(), DiagnosticCode::Other);
            return;
        }
        match self.lookup(name) {
            Binding::Local(idx) => self.locals[idx].used = true,
            Binding::Import(idx) => {
                self.imports[idx].used = true;
                self.report(
                    format!("use of package {} without selector", name),
                    DiagnosticCode::Other,
                );
            }
            Binding::Package | Binding::Universe => {}
            Binding::Unknown => self.undefined(name),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.use_name(name),
            Expr::BasicLit { .. } | Expr::Ellipsis(None) => {}
            Expr::CompositeLit { typ, elts } => {
                if let Some(typ) = typ {
                    self.expr(typ);
                }
                for elt in elts {
                    match &elt.key {
                        // Could be a struct field name; only count it if it names a local.
                        Some(Expr::Ident(name)) => {
                            if let Binding::Local(idx) = self.lookup(name) {
                                self.locals[idx].used = true;
                            }
                        }
                        Some(key) => self.expr(key),
                        None => {}
                    }
                    self.expr(&elt.value);
                }
            }
            Expr::FuncLit { typ, body } => {
                self.signature(typ);
                self.push_scope();
                self.declare_fields(&typ.params);
                self.declare_fields(&typ.results);
                for stmt in &body.stmts {
                    self.stmt(stmt);
                }
                self.pop_scope();
            }
            Expr::Selector { x, .. } => {
                if let Expr::Ident(name) = &**x {
                    if let Binding::Import(idx) = self.lookup(name) {
                        self.imports[idx].used = true;
                        return;
                    }
                }
                self.expr(x);
            }
            Expr::Paren(x) | Expr::Star(x) | Expr::Unary { x, .. } => self.expr(x),
            Expr::Ellipsis(Some(x)) => self.expr(x),
            Expr::Index { x, indices } => {
                self.expr(x);
                for index in indices {
                    self.expr(index);
                }
            }
            Expr::Slice { x, low, high, max } => {
                self.expr(x);
                for bound in [low, high, max].into_iter().flatten() {
                    self.expr(bound);
                }
            }
            Expr::TypeAssert { x, typ } => {
                self.expr(x);
                if let Some(typ) = typ {
                    self.expr(typ);
                }
            }
            Expr::Call { fun, args, .. } => {
                self.expr(fun);
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::Binary { x, y, .. } => {
                self.expr(x);
                self.expr(y);
            }
            Expr::ArrayType { len, elem } => {
                if let Some(len) = len {
                    self.expr(len);
                }
                self.expr(elem);
            }
            Expr::MapType { key, value } => {
                self.expr(key);
                self.expr(value);
            }
            Expr::ChanType { value, .. } => self.expr(value),
            Expr::FuncType(typ) => self.signature(typ),
            Expr::StructType(fields) => {
                for field in fields {
                    self.expr(&field.typ);
                }
            }
            Expr::InterfaceType(elems) => {
                for elem in elems {
                    match &elem.typ {
                        Expr::FuncType(sig) if !elem.names.is_empty() => self.signature(sig),
                        typ => self.expr(typ),
                    }
                }
            }
        }
    }
}
