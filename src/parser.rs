//! Recursive-descent parser for Go source.
//!
//! Three entry points mirror the three ways the session reads Go text: a whole
//! file (the initial program), a standalone expression, and a statement list as
//! it would appear inside a function body.
//!
//! Every error records whether it was hit at end of input. Such errors mean
//! the text is a prefix of something valid, so the REPL asks for more lines
//! instead of reporting them.

use crate::ast::*;
use crate::lexer::{tokenize, LexError, Tok, Token};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    pub incomplete: bool,
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            offset: e.offset,
            incomplete: e.incomplete,
        }
    }
}

type PResult<T> = Result<T, ParseError>;

/// Parse a complete compilation unit.
pub fn parse_file(src: &str) -> PResult<File> {
    let mut p = Parser::new(src)?;
    p.parse_file()
}

/// Parse text that must be exactly one expression.
pub fn parse_expr(src: &str) -> PResult<Expr> {
    let mut p = Parser::new(src)?;
    let expr = p.parse_expr()?;
    if matches!(p.peek(), Tok::Semi { implicit: true }) {
        p.advance();
    }
    p.expect_eof()?;
    Ok(expr)
}

/// Parse text as the statements of a function body.
pub fn parse_stmts(src: &str) -> PResult<Vec<Stmt>> {
    let mut p = Parser::new(src)?;
    let stmts = p.parse_stmt_list()?;
    p.expect_eof()?;
    Ok(stmts)
}

/// Result of a simple statement in a `for` header, which may turn out to be a range clause.
enum Simple {
    Stmt(Stmt),
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
    },
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Below zero while parsing a control clause header, where `T {` opens the body
    /// rather than a composite literal.
    expr_lev: i32,
}

fn binary_prec(op: &str) -> u8 {
    match op {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" | "<" | "<=" | ">" | ">=" => 3,
        "+" | "-" | "|" | "^" => 4,
        "*" | "/" | "%" | "<<" | ">>" | "&" | "&^" => 5,
        _ => 0,
    }
}

const ASSIGN_OPS: &[&str] = &[
    "=", ":=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "&^=",
];

fn is_type_name(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) => true,
        Expr::Selector { x, .. } => matches!(**x, Expr::Ident(_)),
        _ => false,
    }
}

fn is_literal_type(x: &Expr) -> bool {
    match x {
        Expr::Ident(_) | Expr::ArrayType { .. } | Expr::StructType(_) | Expr::MapType { .. } => {
            true
        }
        Expr::Selector { x, .. } => matches!(**x, Expr::Ident(_)),
        Expr::Index { x, .. } => is_type_name(x),
        _ => false,
    }
}

impl Parser {
    fn new(src: &str) -> PResult<Self> {
        Ok(Parser {
            tokens: tokenize(src)?,
            pos: 0,
            expr_lev: 0,
        })
    }

    // ── Token helpers ────────────────────────────────────────────────────

    fn peek(&self) -> &Tok {
        &self.tokens[self.pos].tok
    }

    fn peek_at(&self, n: usize) -> &Tok {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].tok
    }

    fn advance(&mut self) -> Tok {
        let tok = self.tokens[self.pos].tok.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn punct(&self) -> Option<&'static str> {
        match self.peek() {
            Tok::Punct(p) => Some(*p),
            _ => None,
        }
    }

    fn keyword(&self) -> Option<&'static str> {
        match self.peek() {
            Tok::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    fn is_punct(&self, p: &str) -> bool {
        self.punct() == Some(p)
    }

    fn is_keyword(&self, kw: &str) -> bool {
        self.keyword() == Some(kw)
    }

    fn is_semi(&self) -> bool {
        matches!(self.peek(), Tok::Semi { .. })
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: String) -> ParseError {
        let token = &self.tokens[self.pos];
        ParseError {
            message,
            offset: token.span.0,
            incomplete: token.tok == Tok::Eof,
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        self.error_here(format!("unexpected {}, expected {}", self.peek(), expected))
    }

    fn expect_punct(&mut self, p: &str) -> PResult<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected(p))
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> PResult<()> {
        if self.is_keyword(kw) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(kw))
        }
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match self.peek() {
            Tok::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("name")),
        }
    }

    fn expect_eof(&mut self) -> PResult<()> {
        match self.peek() {
            Tok::Eof => Ok(()),
            other => Err(self.error_here(format!("unexpected {} after top level declaration", other))),
        }
    }

    /// A statement or declaration ends at `;`, or right before a closing `)` / `}`.
    fn expect_terminator(&mut self) -> PResult<()> {
        match self.peek() {
            Tok::Semi { .. } => {
                self.advance();
                Ok(())
            }
            Tok::Punct(")") | Tok::Punct("}") | Tok::Eof => Ok(()),
            Tok::Keyword("case") | Tok::Keyword("default") => Ok(()),
            other => Err(self.error_here(format!("unexpected {} at end of statement", other))),
        }
    }

    // ── Files and declarations ───────────────────────────────────────────

    fn parse_file(&mut self) -> PResult<File> {
        self.expect_keyword("package")?;
        let package = self.expect_ident()?;
        self.expect_terminator()?;

        let mut imports = Vec::new();
        while self.is_keyword("import") {
            self.advance();
            if self.eat_punct("(") {
                while !self.is_punct(")") {
                    imports.push(self.parse_import_spec()?);
                    self.expect_terminator()?;
                }
                self.expect_punct(")")?;
            } else {
                imports.push(self.parse_import_spec()?);
            }
            self.expect_terminator()?;
        }

        let mut decls = Vec::new();
        while *self.peek() != Tok::Eof {
            match self.keyword() {
                Some("func") => decls.push(Decl::Func(self.parse_func_decl()?)),
                Some("var") | Some("const") | Some("type") => {
                    decls.push(Decl::Gen(self.parse_gen_decl()?))
                }
                Some("import") => {
                    return Err(self.error_here("imports must appear before other declarations".into()))
                }
                _ => return Err(self.unexpected("declaration")),
            }
            self.expect_terminator()?;
        }

        Ok(File {
            package,
            imports,
            decls,
        })
    }

    fn parse_import_spec(&mut self) -> PResult<ImportSpec> {
        let alias = match self.peek() {
            Tok::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            Tok::Punct(".") => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        match self.peek() {
            Tok::Str(lit) => {
                let path = lit[1..lit.len() - 1].to_string();
                self.advance();
                Ok(ImportSpec::new(path, alias))
            }
            _ => Err(self.unexpected("import path")),
        }
    }

    fn parse_func_decl(&mut self) -> PResult<FuncDecl> {
        self.expect_keyword("func")?;
        if self.is_punct("(") {
            return Err(self.error_here("method declarations are not supported".into()));
        }
        let name = self.expect_ident()?;
        let typ = self.parse_signature()?;
        let body = if self.is_punct("{") {
            Some(self.parse_body()?)
        } else {
            None
        };
        Ok(FuncDecl { name, typ, body })
    }

    fn parse_gen_decl(&mut self) -> PResult<GenDecl> {
        let kind = match self.advance() {
            Tok::Keyword("var") => DeclKind::Var,
            Tok::Keyword("const") => DeclKind::Const,
            _ => DeclKind::Type,
        };
        let mut specs = Vec::new();
        let grouped = self.eat_punct("(");
        if grouped {
            while !self.is_punct(")") {
                specs.push(self.parse_spec(kind, true)?);
                self.expect_terminator()?;
            }
            self.expect_punct(")")?;
        } else {
            specs.push(self.parse_spec(kind, false)?);
        }
        Ok(GenDecl {
            kind,
            grouped,
            specs,
        })
    }

    fn parse_spec(&mut self, kind: DeclKind, grouped: bool) -> PResult<Spec> {
        if kind == DeclKind::Type {
            let name = self.expect_ident()?;
            let alias = self.eat_punct("=");
            let typ = self.parse_type()?;
            return Ok(Spec::Type { name, alias, typ });
        }

        let mut names = vec![self.expect_ident()?];
        while self.eat_punct(",") {
            names.push(self.expect_ident()?);
        }
        let typ = if !self.is_punct("=") && !self.is_semi() && !self.is_punct(")") {
            Some(self.parse_type()?)
        } else {
            None
        };
        let values = if self.eat_punct("=") {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };
        let const_repeat = kind == DeclKind::Const && grouped;
        if typ.is_none() && values.is_empty() && !const_repeat {
            return Err(self.error_here(format!(
                "unexpected {}, expected type or initialization",
                self.peek()
            )));
        }
        Ok(Spec::Value { names, typ, values })
    }

    // ── Types ────────────────────────────────────────────────────────────

    fn parse_type(&mut self) -> PResult<Expr> {
        match self.peek().clone() {
            Tok::Ident(name) => {
                self.advance();
                let mut t = Expr::Ident(name);
                if self.eat_punct(".") {
                    let sel = self.expect_ident()?;
                    t = Expr::Selector {
                        x: Box::new(t),
                        sel,
                    };
                }
                if self.is_punct("[") {
                    self.advance();
                    let mut indices = vec![self.parse_type()?];
                    while self.eat_punct(",") {
                        indices.push(self.parse_type()?);
                    }
                    self.expect_punct("]")?;
                    t = Expr::Index {
                        x: Box::new(t),
                        indices,
                    };
                }
                Ok(t)
            }
            Tok::Punct("(") => {
                self.advance();
                let t = self.parse_type()?;
                self.expect_punct(")")?;
                Ok(Expr::Paren(Box::new(t)))
            }
            Tok::Punct("[") => {
                self.advance();
                let len = if self.eat_punct("]") {
                    None
                } else {
                    let len = if self.is_punct("...") {
                        self.advance();
                        Expr::Ellipsis(None)
                    } else {
                        self.expr_lev += 1;
                        let len = self.parse_expr();
                        self.expr_lev -= 1;
                        len?
                    };
                    self.expect_punct("]")?;
                    Some(Box::new(len))
                };
                let elem = self.parse_type()?;
                Ok(Expr::ArrayType {
                    len,
                    elem: Box::new(elem),
                })
            }
            Tok::Punct("*") => {
                self.advance();
                Ok(Expr::Star(Box::new(self.parse_type()?)))
            }
            Tok::Punct("<-") => {
                self.advance();
                self.expect_keyword("chan")?;
                let value = self.parse_type()?;
                Ok(Expr::ChanType {
                    dir: ChanDir::Recv,
                    value: Box::new(value),
                })
            }
            Tok::Keyword("chan") => {
                self.advance();
                let dir = if self.eat_punct("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = self.parse_type()?;
                Ok(Expr::ChanType {
                    dir,
                    value: Box::new(value),
                })
            }
            Tok::Keyword("map") => {
                self.advance();
                self.expect_punct("[")?;
                let key = self.parse_type()?;
                self.expect_punct("]")?;
                let value = self.parse_type()?;
                Ok(Expr::MapType {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            Tok::Keyword("func") => {
                self.advance();
                Ok(Expr::FuncType(self.parse_signature()?))
            }
            Tok::Keyword("struct") => self.parse_struct_type(),
            Tok::Keyword("interface") => self.parse_interface_type(),
            _ => Err(self.unexpected("type")),
        }
    }

    fn parse_struct_type(&mut self) -> PResult<Expr> {
        self.expect_keyword("struct")?;
        self.expect_punct("{")?;
        let mut fields = Vec::new();
        while !self.is_punct("}") {
            let field = match self.peek().clone() {
                Tok::Punct("*") => Field {
                    names: Vec::new(),
                    typ: self.parse_type()?,
                    tag: None,
                },
                Tok::Ident(name) => match self.peek_at(1).clone() {
                    Tok::Punct(".") | Tok::Semi { .. } | Tok::Punct("}") | Tok::Str(_) => Field {
                        names: Vec::new(),
                        typ: self.parse_type()?,
                        tag: None,
                    },
                    _ => {
                        self.advance();
                        let mut names = vec![name];
                        while self.eat_punct(",") {
                            names.push(self.expect_ident()?);
                        }
                        Field {
                            names,
                            typ: self.parse_type()?,
                            tag: None,
                        }
                    }
                },
                _ => return Err(self.unexpected("field name or embedded type")),
            };
            let tag = match self.peek() {
                Tok::Str(lit) => {
                    let lit = lit.clone();
                    self.advance();
                    Some(lit)
                }
                _ => None,
            };
            fields.push(Field { tag, ..field });
            self.expect_terminator()?;
        }
        self.expect_punct("}")?;
        Ok(Expr::StructType(fields))
    }

    fn parse_interface_type(&mut self) -> PResult<Expr> {
        self.expect_keyword("interface")?;
        self.expect_punct("{")?;
        let mut elems = Vec::new();
        while !self.is_punct("}") {
            let is_method =
                matches!(self.peek(), Tok::Ident(_)) && matches!(self.peek_at(1), Tok::Punct("("));
            if is_method {
                let name = self.expect_ident()?;
                let sig = self.parse_signature()?;
                elems.push(Field {
                    names: vec![name],
                    typ: Expr::FuncType(sig),
                    tag: None,
                });
            } else {
                let mut term = self.parse_type_term()?;
                while self.eat_punct("|") {
                    let rhs = self.parse_type_term()?;
                    term = Expr::Binary {
                        op: "|",
                        x: Box::new(term),
                        y: Box::new(rhs),
                    };
                }
                elems.push(Field {
                    names: Vec::new(),
                    typ: term,
                    tag: None,
                });
            }
            self.expect_terminator()?;
        }
        self.expect_punct("}")?;
        Ok(Expr::InterfaceType(elems))
    }

    fn parse_type_term(&mut self) -> PResult<Expr> {
        if self.eat_punct("~") {
            let t = self.parse_type()?;
            return Ok(Expr::Unary {
                op: "~",
                x: Box::new(t),
            });
        }
        self.parse_type()
    }

    fn parse_signature(&mut self) -> PResult<FuncType> {
        let params = self.parse_parameters()?;
        let results = if self.is_punct("(") {
            self.parse_parameters()?
        } else if self.starts_type() {
            vec![Field {
                names: Vec::new(),
                typ: self.parse_type()?,
                tag: None,
            }]
        } else {
            Vec::new()
        };
        Ok(FuncType { params, results })
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.peek(),
            Tok::Ident(_)
                | Tok::Punct("[")
                | Tok::Punct("*")
                | Tok::Punct("<-")
                | Tok::Keyword("chan")
                | Tok::Keyword("map")
                | Tok::Keyword("func")
                | Tok::Keyword("struct")
                | Tok::Keyword("interface")
        )
    }

    fn parse_param_type(&mut self) -> PResult<Expr> {
        if self.eat_punct("...") {
            let t = self.parse_type()?;
            return Ok(Expr::Ellipsis(Some(Box::new(t))));
        }
        self.parse_type()
    }

    /// Parameter lists are either all named (`a, b int, c string`) or all unnamed
    /// (`int, string`); a lone identifier is only resolved once the whole list is seen.
    fn parse_parameters(&mut self) -> PResult<Vec<Field>> {
        self.expect_punct("(")?;
        let mut entries: Vec<(Option<String>, Option<Expr>)> = Vec::new();
        while !self.is_punct(")") {
            match self.peek().clone() {
                Tok::Ident(name) => match self.peek_at(1).clone() {
                    Tok::Punct(".") => entries.push((None, Some(self.parse_type()?))),
                    Tok::Punct(",") | Tok::Punct(")") => {
                        self.advance();
                        entries.push((Some(name), None));
                    }
                    _ => {
                        self.advance();
                        let t = self.parse_param_type()?;
                        entries.push((Some(name), Some(t)));
                    }
                },
                _ => entries.push((None, Some(self.parse_param_type()?))),
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;

        let named = entries.iter().any(|(n, t)| n.is_some() && t.is_some());
        if !named {
            return Ok(entries
                .into_iter()
                .map(|(name, typ)| Field {
                    names: Vec::new(),
                    typ: typ.unwrap_or_else(|| Expr::Ident(name.unwrap_or_default())),
                    tag: None,
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending = Vec::new();
        for (name, typ) in entries {
            match (name, typ) {
                (Some(name), None) => pending.push(name),
                (Some(name), Some(typ)) => {
                    pending.push(name);
                    fields.push(Field {
                        names: std::mem::take(&mut pending),
                        typ,
                        tag: None,
                    });
                }
                (None, _) => {
                    return Err(self.error_here("mixed named and unnamed parameters".into()))
                }
            }
        }
        if !pending.is_empty() {
            return Err(self.error_here("mixed named and unnamed parameters".into()));
        }
        Ok(fields)
    }

    // ── Expressions ──────────────────────────────────────────────────────

    fn parse_expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut list = vec![self.parse_expr()?];
        while self.eat_punct(",") {
            list.push(self.parse_expr()?);
        }
        Ok(list)
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut x = self.parse_unary()?;
        loop {
            let Some(op) = self.punct() else { break };
            let prec = binary_prec(op);
            if prec == 0 || prec < min_prec {
                break;
            }
            self.advance();
            let y = self.parse_binary(prec + 1)?;
            x = Expr::Binary {
                op,
                x: Box::new(x),
                y: Box::new(y),
            };
        }
        Ok(x)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        match self.punct() {
            Some(op @ ("+" | "-" | "!" | "^" | "&" | "~")) => {
                self.advance();
                let x = self.parse_unary()?;
                Ok(Expr::Unary {
                    op,
                    x: Box::new(x),
                })
            }
            Some("<-") => {
                if matches!(self.peek_at(1), Tok::Keyword("chan")) {
                    let t = self.parse_type()?;
                    return self.parse_primary_suffixes(t);
                }
                self.advance();
                let x = self.parse_unary()?;
                Ok(Expr::Unary {
                    op: "<-",
                    x: Box::new(x),
                })
            }
            Some("*") => {
                self.advance();
                let x = self.parse_unary()?;
                Ok(Expr::Star(Box::new(x)))
            }
            _ => self.parse_primary_expr(),
        }
    }

    fn parse_operand(&mut self) -> PResult<Expr> {
        match self.peek().clone() {
            Tok::Ident(name) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            Tok::Int(v) => self.literal(LitKind::Int, v),
            Tok::Float(v) => self.literal(LitKind::Float, v),
            Tok::Imag(v) => self.literal(LitKind::Imag, v),
            Tok::Char(v) => self.literal(LitKind::Char, v),
            Tok::Str(v) => self.literal(LitKind::String, v),
            Tok::Punct("(") => {
                self.advance();
                self.expr_lev += 1;
                let x = self.parse_expr();
                self.expr_lev -= 1;
                let x = x?;
                self.expect_punct(")")?;
                Ok(Expr::Paren(Box::new(x)))
            }
            Tok::Keyword("func") => {
                self.advance();
                let typ = self.parse_signature()?;
                if self.is_punct("{") {
                    let body = self.parse_body()?;
                    Ok(Expr::FuncLit { typ, body })
                } else {
                    Ok(Expr::FuncType(typ))
                }
            }
            Tok::Punct("[")
            | Tok::Keyword("map")
            | Tok::Keyword("chan")
            | Tok::Keyword("struct")
            | Tok::Keyword("interface") => self.parse_type(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn literal(&mut self, kind: LitKind, value: String) -> PResult<Expr> {
        self.advance();
        Ok(Expr::BasicLit { kind, value })
    }

    fn parse_primary_expr(&mut self) -> PResult<Expr> {
        let x = self.parse_operand()?;
        self.parse_primary_suffixes(x)
    }

    fn parse_primary_suffixes(&mut self, mut x: Expr) -> PResult<Expr> {
        loop {
            match self.punct() {
                Some(".") => {
                    self.advance();
                    match self.peek().clone() {
                        Tok::Ident(sel) => {
                            self.advance();
                            x = Expr::Selector {
                                x: Box::new(x),
                                sel,
                            };
                        }
                        Tok::Punct("(") => {
                            self.advance();
                            let typ = if self.is_keyword("type") {
                                self.advance();
                                None
                            } else {
                                Some(Box::new(self.parse_type()?))
                            };
                            self.expect_punct(")")?;
                            x = Expr::TypeAssert {
                                x: Box::new(x),
                                typ,
                            };
                        }
                        _ => return Err(self.unexpected("name or (")),
                    }
                }
                Some("[") => {
                    self.advance();
                    self.expr_lev += 1;
                    let result = self.parse_index_or_slice(x);
                    self.expr_lev -= 1;
                    x = result?;
                }
                Some("(") => {
                    self.advance();
                    self.expr_lev += 1;
                    let result = self.parse_call_args();
                    self.expr_lev -= 1;
                    let (args, ellipsis) = result?;
                    x = Expr::Call {
                        fun: Box::new(x),
                        args,
                        ellipsis,
                    };
                }
                Some("{") if is_literal_type(&x) && (self.expr_lev >= 0 || !is_type_name(&x)) => {
                    x = self.parse_literal_value(Some(x))?;
                }
                _ => break,
            }
        }
        Ok(x)
    }

    fn parse_index_or_slice(&mut self, x: Expr) -> PResult<Expr> {
        let mut low = None;
        if !self.is_punct(":") {
            low = Some(self.parse_expr()?);
        }
        if self.eat_punct(":") {
            let mut high = None;
            let mut max = None;
            if !self.is_punct("]") && !self.is_punct(":") {
                high = Some(Box::new(self.parse_expr()?));
            }
            if self.eat_punct(":") {
                if high.is_none() {
                    return Err(self.error_here("middle index required in 3-index slice".into()));
                }
                max = Some(Box::new(self.parse_expr()?));
            }
            self.expect_punct("]")?;
            return Ok(Expr::Slice {
                x: Box::new(x),
                low: low.map(Box::new),
                high,
                max,
            });
        }
        let Some(first) = low else {
            return Err(self.unexpected("operand"));
        };
        let mut indices = vec![first];
        while self.eat_punct(",") {
            if self.is_punct("]") {
                break;
            }
            indices.push(self.parse_expr()?);
        }
        self.expect_punct("]")?;
        Ok(Expr::Index {
            x: Box::new(x),
            indices,
        })
    }

    fn parse_call_args(&mut self) -> PResult<(Vec<Expr>, bool)> {
        let mut args = Vec::new();
        let mut ellipsis = false;
        while !self.is_punct(")") {
            args.push(self.parse_expr()?);
            if self.eat_punct("...") {
                ellipsis = true;
            }
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok((args, ellipsis))
    }

    fn parse_literal_value(&mut self, typ: Option<Expr>) -> PResult<Expr> {
        self.expect_punct("{")?;
        self.expr_lev += 1;
        let elts = self.parse_elements();
        self.expr_lev -= 1;
        let elts = elts?;
        self.expect_punct("}")?;
        Ok(Expr::CompositeLit {
            typ: typ.map(Box::new),
            elts,
        })
    }

    fn parse_elements(&mut self) -> PResult<Vec<Element>> {
        let mut elts = Vec::new();
        while !self.is_punct("}") {
            let first = self.parse_element_value()?;
            let element = if self.eat_punct(":") {
                Element {
                    key: Some(first),
                    value: self.parse_element_value()?,
                }
            } else {
                Element {
                    key: None,
                    value: first,
                }
            };
            elts.push(element);
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok(elts)
    }

    fn parse_element_value(&mut self) -> PResult<Expr> {
        if self.is_punct("{") {
            self.parse_literal_value(None)
        } else {
            self.parse_expr()
        }
    }

    // ── Statements ───────────────────────────────────────────────────────

    fn parse_body(&mut self) -> PResult<Block> {
        let saved = self.expr_lev;
        self.expr_lev = 0;
        let block = self.parse_block();
        self.expr_lev = saved;
        block
    }

    fn parse_block(&mut self) -> PResult<Block> {
        self.expect_punct("{")?;
        let stmts = self.parse_stmt_list()?;
        self.expect_punct("}")?;
        Ok(Block { stmts })
    }

    fn parse_stmt_list(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                Tok::Punct("}") | Tok::Eof | Tok::Keyword("case") | Tok::Keyword("default") => {
                    break
                }
                Tok::Semi { .. } => {
                    self.advance();
                }
                _ => {
                    stmts.push(self.parse_stmt()?);
                    self.expect_terminator()?;
                }
            }
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        if let (Tok::Ident(label), Tok::Punct(":")) = (self.peek(), self.peek_at(1)) {
            let label = label.clone();
            self.advance();
            self.advance();
            let stmt = if self.is_punct("}") || self.is_semi() || *self.peek() == Tok::Eof {
                Stmt::Empty
            } else {
                self.parse_stmt()?
            };
            return Ok(Stmt::Labeled {
                label,
                stmt: Box::new(stmt),
            });
        }

        match self.keyword() {
            Some("var") | Some("const") | Some("type") => Ok(Stmt::Decl(self.parse_gen_decl()?)),
            Some("go") => {
                self.advance();
                Ok(Stmt::Go(self.parse_call_stmt_expr("go")?))
            }
            Some("defer") => {
                self.advance();
                Ok(Stmt::Defer(self.parse_call_stmt_expr("defer")?))
            }
            Some("return") => {
                self.advance();
                let results = if self.is_semi() || self.is_punct("}") || *self.peek() == Tok::Eof {
                    Vec::new()
                } else {
                    self.parse_expr_list()?
                };
                Ok(Stmt::Return(results))
            }
            Some(keyword @ ("break" | "continue" | "goto")) => {
                self.advance();
                let label = match self.peek() {
                    Tok::Ident(name) => {
                        let name = name.clone();
                        self.advance();
                        Some(name)
                    }
                    _ if keyword == "goto" => return Err(self.unexpected("label")),
                    _ => None,
                };
                Ok(Stmt::Branch { keyword, label })
            }
            Some("fallthrough") => {
                self.advance();
                Ok(Stmt::Branch {
                    keyword: "fallthrough",
                    label: None,
                })
            }
            Some("if") => self.parse_if(),
            Some("switch") => self.parse_switch(),
            Some("select") => self.parse_select(),
            Some("for") => self.parse_for(),
            _ if self.is_punct("{") => Ok(Stmt::Block(self.parse_block()?)),
            _ => match self.parse_simple_stmt(false)? {
                Simple::Stmt(stmt) => Ok(stmt),
                Simple::Range { .. } => Err(self.error_here("unexpected range".into())),
            },
        }
    }

    fn parse_call_stmt_expr(&mut self, keyword: &str) -> PResult<Expr> {
        let x = self.parse_expr()?;
        if !matches!(x.unparen(), Expr::Call { .. }) {
            return Err(self.error_here(format!("expression in {} must be function call", keyword)));
        }
        Ok(x)
    }

    fn parse_simple_stmt(&mut self, range_ok: bool) -> PResult<Simple> {
        if range_ok && self.is_keyword("range") {
            self.advance();
            let x = self.parse_expr()?;
            return Ok(Simple::Range {
                key: None,
                value: None,
                define: false,
                x,
            });
        }

        let mut lhs = self.parse_expr_list()?;
        match self.punct() {
            Some(op) if ASSIGN_OPS.contains(&op) => {
                self.advance();
                if range_ok && self.is_keyword("range") && (op == "=" || op == ":=") {
                    self.advance();
                    let x = self.parse_expr()?;
                    if lhs.len() > 2 {
                        return Err(self.error_here("range clause permits at most two iteration variables".into()));
                    }
                    let mut vars = lhs.into_iter();
                    return Ok(Simple::Range {
                        key: vars.next(),
                        value: vars.next(),
                        define: op == ":=",
                        x,
                    });
                }
                let rhs = self.parse_expr_list()?;
                Ok(Simple::Stmt(Stmt::Assign { lhs, op, rhs }))
            }
            Some(op @ ("++" | "--")) => {
                if lhs.len() > 1 {
                    return Err(self.unexpected(":= or = or comma"));
                }
                self.advance();
                Ok(Simple::Stmt(Stmt::IncDec {
                    x: lhs.remove(0),
                    inc: op == "++",
                }))
            }
            Some("<-") => {
                if lhs.len() > 1 {
                    return Err(self.unexpected(":= or = or comma"));
                }
                self.advance();
                let value = self.parse_expr()?;
                Ok(Simple::Stmt(Stmt::Send {
                    chan: lhs.remove(0),
                    value,
                }))
            }
            _ => {
                if lhs.len() > 1 {
                    return Err(self.unexpected(":= or = or comma"));
                }
                Ok(Simple::Stmt(Stmt::Expr(lhs.remove(0))))
            }
        }
    }

    fn header_stmt(&mut self) -> PResult<Stmt> {
        match self.parse_simple_stmt(false)? {
            Simple::Stmt(stmt) => Ok(stmt),
            Simple::Range { .. } => Err(self.error_here("unexpected range".into())),
        }
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        self.expect_keyword("if")?;
        let saved = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_if_header();
        self.expr_lev = saved;
        let (init, cond) = header?;

        let body = self.parse_block()?;
        let els = if self.is_keyword("else") {
            self.advance();
            if self.is_keyword("if") {
                Some(Box::new(self.parse_if()?))
            } else if self.is_punct("{") {
                Some(Box::new(Stmt::Block(self.parse_block()?)))
            } else {
                return Err(self.unexpected("if statement or block"));
            }
        } else {
            None
        };
        Ok(Stmt::If {
            init,
            cond,
            body,
            els,
        })
    }

    fn parse_if_header(&mut self) -> PResult<(Option<Box<Stmt>>, Expr)> {
        if self.is_punct("{") {
            return Err(self.error_here("missing condition in if statement".into()));
        }
        let mut init = None;
        let mut stmt = None;
        if !self.is_semi() {
            stmt = Some(self.header_stmt()?);
        }
        if self.is_semi() {
            self.advance();
            init = stmt.take().map(Box::new);
            if self.is_punct("{") {
                return Err(self.error_here("missing condition in if statement".into()));
            }
            stmt = Some(Stmt::Expr(self.parse_expr()?));
        }
        match stmt {
            Some(Stmt::Expr(cond)) => Ok((init, cond)),
            Some(_) => Err(self.error_here("cannot use assignment as value".into())),
            None => Err(self.unexpected("condition")),
        }
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        self.expect_keyword("switch")?;
        let saved = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_switch_header();
        self.expr_lev = saved;
        let (init, tag) = header?;

        self.expect_punct("{")?;
        let mut clauses = Vec::new();
        while !self.is_punct("}") {
            let list = if self.is_keyword("case") {
                self.advance();
                Some(self.parse_expr_list()?)
            } else if self.is_keyword("default") {
                self.advance();
                None
            } else {
                return Err(self.unexpected("case or default or }"));
            };
            self.expect_punct(":")?;
            let body = self.parse_stmt_list()?;
            clauses.push(CaseClause { list, body });
        }
        self.expect_punct("}")?;

        let is_type_guard = |x: &Expr| matches!(x, Expr::TypeAssert { typ: None, .. });
        let type_switch = match &tag {
            Some(Stmt::Assign { lhs, op: ":=", rhs }) => {
                lhs.len() == 1 && rhs.len() == 1 && is_type_guard(&rhs[0])
            }
            Some(Stmt::Expr(x)) => is_type_guard(x),
            _ => false,
        };
        match tag {
            Some(assign) if type_switch => Ok(Stmt::TypeSwitch {
                init,
                assign: Box::new(assign),
                clauses,
            }),
            Some(Stmt::Expr(x)) => Ok(Stmt::Switch {
                init,
                tag: Some(x),
                clauses,
            }),
            None => Ok(Stmt::Switch {
                init,
                tag: None,
                clauses,
            }),
            Some(_) => Err(self.error_here("switch expression must be an expression".into())),
        }
    }

    fn parse_switch_header(&mut self) -> PResult<(Option<Box<Stmt>>, Option<Stmt>)> {
        let mut init = None;
        let mut tag = None;
        if !self.is_punct("{") {
            if !self.is_semi() {
                tag = Some(self.header_stmt()?);
            }
            if self.is_semi() {
                self.advance();
                init = tag.take().map(Box::new);
                if !self.is_punct("{") {
                    tag = Some(self.header_stmt()?);
                }
            }
        }
        Ok((init, tag))
    }

    fn parse_select(&mut self) -> PResult<Stmt> {
        self.expect_keyword("select")?;
        self.expect_punct("{")?;
        let mut clauses = Vec::new();
        while !self.is_punct("}") {
            let comm = if self.is_keyword("case") {
                self.advance();
                Some(Box::new(self.header_stmt()?))
            } else if self.is_keyword("default") {
                self.advance();
                None
            } else {
                return Err(self.unexpected("case or default or }"));
            };
            self.expect_punct(":")?;
            let body = self.parse_stmt_list()?;
            clauses.push(CommClause { comm, body });
        }
        self.expect_punct("}")?;
        Ok(Stmt::Select(clauses))
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        self.expect_keyword("for")?;
        let saved = self.expr_lev;
        self.expr_lev = -1;
        let header = self.parse_for_header();
        self.expr_lev = saved;
        let header = header?;
        let body = self.parse_block()?;
        Ok(match header {
            ForHeader::Range {
                key,
                value,
                define,
                x,
            } => Stmt::Range {
                key,
                value,
                define,
                x,
                body,
            },
            ForHeader::Loop { init, cond, post } => Stmt::For {
                init,
                cond,
                post,
                body,
            },
        })
    }

    fn parse_for_header(&mut self) -> PResult<ForHeader> {
        if self.is_punct("{") {
            return Ok(ForHeader::Loop {
                init: None,
                cond: None,
                post: None,
            });
        }
        let mut first = None;
        if !self.is_semi() {
            match self.parse_simple_stmt(true)? {
                Simple::Range {
                    key,
                    value,
                    define,
                    x,
                } => {
                    return Ok(ForHeader::Range {
                        key,
                        value,
                        define,
                        x,
                    })
                }
                Simple::Stmt(stmt) => first = Some(stmt),
            }
        }
        if self.is_semi() {
            self.advance();
            let init = first.map(Box::new);
            let cond = if self.is_semi() {
                None
            } else {
                Some(self.parse_expr()?)
            };
            if !self.is_semi() {
                return Err(self.unexpected("semicolon"));
            }
            self.advance();
            let post = if self.is_punct("{") {
                None
            } else {
                Some(Box::new(self.header_stmt()?))
            };
            return Ok(ForHeader::Loop { init, cond, post });
        }
        match first {
            Some(Stmt::Expr(cond)) => Ok(ForHeader::Loop {
                init: None,
                cond: Some(cond),
                post: None,
            }),
            _ => Err(self.unexpected("for loop condition")),
        }
    }
}

enum ForHeader {
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
    },
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_is_an_expression() {
        assert_eq!(
            parse_expr("42").unwrap(),
            Expr::BasicLit {
                kind: LitKind::Int,
                value: "42".into()
            }
        );
    }

    #[test]
    fn short_var_decl_is_not_an_expression() {
        let err = parse_expr("x := 5").unwrap_err();
        assert!(!err.incomplete);
        let stmts = parse_stmts("x := 5").unwrap();
        assert_eq!(
            stmts,
            vec![Stmt::Assign {
                lhs: vec![Expr::ident("x")],
                op: ":=",
                rhs: vec![Expr::BasicLit {
                    kind: LitKind::Int,
                    value: "5".into()
                }],
            }]
        );
    }

    #[test]
    fn precedence_binds_tighter_operators_first() {
        let e = parse_expr("1 + 2*3 == 7 && ok").unwrap();
        let Expr::Binary { op: "&&", x, .. } = e else {
            panic!("expected && at the root, got {:?}", e);
        };
        let Expr::Binary { op: "==", x: sum, .. } = *x else {
            panic!("expected == under &&");
        };
        assert!(matches!(*sum, Expr::Binary { op: "+", .. }));
    }

    #[test]
    fn open_block_is_incomplete() {
        let err = parse_stmts("if true {").unwrap_err();
        assert!(err.incomplete);
    }

    #[test]
    fn closed_block_parses() {
        let stmts = parse_stmts("if true {\n}").unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(matches!(&stmts[0], Stmt::If { body, els: None, .. } if body.stmts.is_empty()));
    }

    #[test]
    fn dangling_operator_is_incomplete() {
        assert!(parse_stmts("x := 1 +").unwrap_err().incomplete);
        assert!(parse_stmts("fmt.Println(").unwrap_err().incomplete);
        assert!(parse_stmts("for i := 0; i < 3").unwrap_err().incomplete);
    }

    #[test]
    fn stray_tokens_are_real_errors() {
        assert!(!parse_stmts(")").unwrap_err().incomplete);
        assert!(!parse_stmts("x y").unwrap_err().incomplete);
        assert!(!parse_stmts("}").unwrap_err().incomplete);
        assert!(!parse_stmts("var x").unwrap_err().incomplete);
    }

    #[test]
    fn composite_literal_in_if_header() {
        let stmts = parse_stmts("if x == (T{}) {\n}").unwrap();
        assert!(matches!(&stmts[0], Stmt::If { .. }));
        let stmts = parse_stmts("for _, v := range []int{1, 2} {\n}").unwrap();
        let Stmt::Range { x, define: true, .. } = &stmts[0] else {
            panic!("expected range loop, got {:?}", stmts[0]);
        };
        assert!(matches!(x, Expr::CompositeLit { .. }));
    }

    #[test]
    fn ident_before_brace_in_header_is_not_a_literal() {
        let stmts = parse_stmts("for ok {\n}").unwrap();
        assert!(matches!(
            &stmts[0],
            Stmt::For { cond: Some(Expr::Ident(name)), .. } if name == "ok"
        ));
    }

    #[test]
    fn three_clause_for() {
        let stmts = parse_stmts("for i := 0; i < 3; i++ {\n\tp(i)\n}").unwrap();
        let Stmt::For {
            init: Some(init),
            cond: Some(_),
            post: Some(post),
            body,
        } = &stmts[0]
        else {
            panic!("expected for loop");
        };
        assert!(matches!(**init, Stmt::Assign { op: ":=", .. }));
        assert!(matches!(**post, Stmt::IncDec { inc: true, .. }));
        assert_eq!(body.stmts.len(), 1);
    }

    #[test]
    fn type_switch_is_recognized() {
        let stmts =
            parse_stmts("switch v := x.(type) {\ncase int:\n\tp(v)\ndefault:\n}").unwrap();
        let Stmt::TypeSwitch { clauses, .. } = &stmts[0] else {
            panic!("expected type switch, got {:?}", stmts[0]);
        };
        assert_eq!(clauses.len(), 2);
        assert!(clauses[1].list.is_none());
    }

    #[test]
    fn func_literal_and_call() {
        let e = parse_expr("func(a, b int) int { return a + b }(1, 2)").unwrap();
        let Expr::Call { fun, args, .. } = e else {
            panic!("expected call");
        };
        assert_eq!(args.len(), 2);
        let Expr::FuncLit { typ, .. } = *fun else {
            panic!("expected func literal");
        };
        assert_eq!(typ.params.len(), 1);
        assert_eq!(typ.params[0].names, vec!["a", "b"]);
    }

    #[test]
    fn unnamed_parameters_are_types() {
        let e = parse_expr("func(int, string) {}").unwrap();
        let Expr::FuncLit { typ, .. } = e else {
            panic!("expected func literal");
        };
        assert_eq!(typ.params.len(), 2);
        assert!(typ.params.iter().all(|f| f.names.is_empty()));
    }

    #[test]
    fn slices_and_type_args() {
        assert!(matches!(
            parse_expr("s[1:len(s):cap(s)]").unwrap(),
            Expr::Slice { max: Some(_), .. }
        ));
        assert!(matches!(parse_expr("make([]int, 3)").unwrap(), Expr::Call { .. }));
        assert!(matches!(
            parse_expr("map[string][]int{\"a\": {1, 2}}").unwrap(),
            Expr::CompositeLit { .. }
        ));
    }

    #[test]
    fn channel_operations() {
        let stmts = parse_stmts("ch := make(chan int, 1)\nch <- 1\nv := <-ch").unwrap();
        assert!(matches!(&stmts[1], Stmt::Send { .. }));
        let Stmt::Assign { rhs, .. } = &stmts[2] else {
            panic!("expected assignment");
        };
        assert!(matches!(&rhs[0], Expr::Unary { op: "<-", .. }));
    }

    #[test]
    fn local_declarations() {
        let stmts = parse_stmts(
            "type point struct {\n\tX, Y int\n}\nvar (\n\ta = 1\n\tb string\n)\nconst c = 2",
        )
        .unwrap();
        assert_eq!(stmts.len(), 3);
        let Stmt::Decl(GenDecl { kind: DeclKind::Var, grouped: true, specs }) = &stmts[1] else {
            panic!("expected grouped var");
        };
        assert_eq!(specs.len(), 2);
    }

    #[test]
    fn file_with_imports() {
        let file = parse_file(
            "package main\n\nimport (\n\t\"fmt\"\n\tm \"math\"\n)\n\nfunc main() {\n\tfmt.Println(m.Pi)\n}\n",
        )
        .unwrap();
        assert_eq!(file.package, "main");
        assert_eq!(file.imports.len(), 2);
        assert_eq!(file.imports[1].alias.as_deref(), Some("m"));
        assert_eq!(file.func("main").unwrap().body.as_ref().unwrap().stmts.len(), 1);
    }

    #[test]
    fn multiple_statements_on_one_line() {
        assert_eq!(parse_stmts("a := 1; b := 2").unwrap().len(), 2);
        assert!(parse_expr("p(1); p(2)").is_err());
    }

    #[test]
    fn label_at_end_of_input_is_complete() {
        let stmts = parse_stmts("goto end\nend:").unwrap();
        assert_eq!(stmts.len(), 2);
        assert!(matches!(
            &stmts[1],
            Stmt::Labeled { label, stmt } if label == "end" && **stmt == Stmt::Empty
        ));
    }
}
