//! Go syntax tree for one compilation unit.
//!
//! Types share the expression enum, the way Go's own AST does, so `make([]int, 3)`
//! and `[]int{1}` need no special casing in the parser.

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl File {
    pub fn func(&self, name: &str) -> Option<&FuncDecl> {
        self.decls.iter().find_map(|d| match d {
            Decl::Func(f) if f.name == name => Some(f),
            _ => None,
        })
    }

    pub fn func_mut(&mut self, name: &str) -> Option<&mut FuncDecl> {
        self.decls.iter_mut().find_map(|d| match d {
            Decl::Func(f) if f.name == name => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
    /// Transient `_` alias applied by the auto-fixer for a single build.
    pub discarded: bool,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>, alias: Option<String>) -> Self {
        ImportSpec {
            alias,
            path: path.into(),
            discarded: false,
        }
    }

    /// The name this import binds in file scope, if any.
    pub fn local_name(&self) -> Option<String> {
        if self.discarded {
            return None;
        }
        match self.alias.as_deref() {
            Some("_") => None,
            Some(alias) => Some(alias.to_string()),
            None => Some(package_name(&self.path)),
        }
    }

    pub fn quoted_path(&self) -> String {
        format!("\"{}\"", self.path)
    }
}

/// Best guess at the package name declared by the package at `path`:
/// the last element, skipping `vN` major-version elements and trimming
/// `.vN` suffixes and `go-`/`-go` affixes.
pub fn package_name(path: &str) -> String {
    let mut elems = path.rsplit('/');
    let mut last = elems.next().unwrap_or(path);
    if is_major_version(last) {
        if let Some(prev) = elems.next() {
            last = prev;
        }
    }
    let mut name = last;
    if let Some(dot) = name.find(".v") {
        if name[dot + 2..].chars().all(|c| c.is_ascii_digit()) {
            name = &name[..dot];
        }
    }
    let name = name.strip_prefix("go-").unwrap_or(name);
    let name = name.strip_suffix("-go").unwrap_or(name);
    name.replace(|c: char| c == '-' || c == '.', "_")
}

fn is_major_version(elem: &str) -> bool {
    elem.len() > 1
        && elem.starts_with('v')
        && elem[1..].chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub typ: FuncType,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Type,
    Var,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Const => "const",
            DeclKind::Type => "type",
            DeclKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub kind: DeclKind,
    /// Written with parentheses: `var ( ... )`.
    pub grouped: bool,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Value {
        names: Vec<String>,
        typ: Option<Expr>,
        values: Vec<Expr>,
    },
    Type {
        name: String,
        /// `type A = B`
        alias: bool,
        typ: Expr,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<String>,
    pub typ: Expr,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    BasicLit {
        kind: LitKind,
        value: String,
    },
    /// `typ` is `None` for elided inner literals: `[][]int{{1}, {2}}`.
    CompositeLit {
        typ: Option<Box<Expr>>,
        elts: Vec<Element>,
    },
    FuncLit {
        typ: FuncType,
        body: Block,
    },
    Paren(Box<Expr>),
    Selector {
        x: Box<Expr>,
        sel: String,
    },
    Index {
        x: Box<Expr>,
        indices: Vec<Expr>,
    },
    Slice {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
        max: Option<Box<Expr>>,
    },
    /// `typ` is `None` for the `x.(type)` guard of a type switch.
    TypeAssert {
        x: Box<Expr>,
        typ: Option<Box<Expr>>,
    },
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
        ellipsis: bool,
    },
    /// Pointer type or dereference: `*x`.
    Star(Box<Expr>),
    Unary {
        op: &'static str,
        x: Box<Expr>,
    },
    Binary {
        op: &'static str,
        x: Box<Expr>,
        y: Box<Expr>,
    },
    /// `...T` in a parameter list, or the `...` length of `[...]T`.
    Ellipsis(Option<Box<Expr>>),
    /// `len` is `None` for slice types.
    ArrayType {
        len: Option<Box<Expr>>,
        elem: Box<Expr>,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
    FuncType(FuncType),
    StructType(Vec<Field>),
    /// Methods carry names; embedded interfaces and type-set terms do not.
    InterfaceType(Vec<Field>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Ident(name.into())
    }

    pub fn call(fun: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call {
            fun: Box::new(fun),
            args,
            ellipsis: false,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        match self {
            Expr::Paren(inner) => inner.unparen(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    /// `None` for `default:`.
    pub list: Option<Vec<Expr>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    /// `None` for `default:`; otherwise a send or receive statement.
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Decl(GenDecl),
    Empty,
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        inc: bool,
    },
    /// `op` is `=`, `:=` or a compound operator such as `+=`.
    Assign {
        lhs: Vec<Expr>,
        op: &'static str,
        rhs: Vec<Expr>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    /// `break`, `continue`, `goto` or `fallthrough`.
    Branch {
        keyword: &'static str,
        label: Option<String>,
    },
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: Block,
        els: Option<Box<Stmt>>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },
    /// `assign` is either `x := y.(type)` or the bare expression statement `y.(type)`.
    TypeSwitch {
        init: Option<Box<Stmt>>,
        assign: Box<Stmt>,
        clauses: Vec<CaseClause>,
    },
    Select(Vec<CommClause>),
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
        body: Block,
    },
}

impl Stmt {
    /// `_ = name`, the statement the auto-fixer uses to mark a binding as read.
    pub fn discard(name: impl Into<String>) -> Stmt {
        Stmt::Assign {
            lhs: vec![Expr::ident("_")],
            op: "=",
            rhs: vec![Expr::ident(name)],
        }
    }
}
