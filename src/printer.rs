//! Render a syntax tree back to Go source in gofmt layout: tab indentation,
//! one statement per line, grouped imports when there is more than one.

use crate::ast::*;

pub fn print_file(file: &File) -> String {
    let mut p = Printer::default();
    p.file(file);
    p.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::default();
    p.expr(expr);
    p.out
}

pub fn print_stmt(stmt: &Stmt) -> String {
    let mut p = Printer::default();
    p.stmt(stmt);
    p.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn file(&mut self, file: &File) {
        self.write("package ");
        self.write(&file.package);
        self.write("\n");

        match file.imports.as_slice() {
            [] => {}
            [single] => {
                self.write("\nimport ");
                self.import_spec(single);
                self.write("\n");
            }
            many => {
                self.write("\nimport (\n");
                for spec in many {
                    self.write("\t");
                    self.import_spec(spec);
                    self.write("\n");
                }
                self.write(")\n");
            }
        }

        for decl in &file.decls {
            self.write("\n");
            match decl {
                Decl::Func(f) => self.func_decl(f),
                Decl::Gen(g) => self.gen_decl(g),
            }
            self.write("\n");
        }
    }

    fn import_spec(&mut self, spec: &ImportSpec) {
        if spec.discarded {
            self.write("_ ");
        } else if let Some(alias) = &spec.alias {
            self.write(alias);
            self.write(" ");
        }
        self.write(&spec.quoted_path());
    }

    fn func_decl(&mut self, f: &FuncDecl) {
        self.write("func ");
        self.write(&f.name);
        self.signature(&f.typ);
        if let Some(body) = &f.body {
            self.write(" ");
            self.block(body);
        }
    }

    fn gen_decl(&mut self, decl: &GenDecl) {
        self.write(decl.kind.keyword());
        self.write(" ");
        if decl.grouped {
            self.write("(");
            self.indent += 1;
            for spec in &decl.specs {
                self.newline();
                self.spec(spec);
            }
            self.indent -= 1;
            self.newline();
            self.write(")");
        } else if let Some(spec) = decl.specs.first() {
            self.spec(spec);
        }
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Value { names, typ, values } => {
                self.write(&names.join(", "));
                if let Some(typ) = typ {
                    self.write(" ");
                    self.expr(typ);
                }
                if !values.is_empty() {
                    self.write(" = ");
                    self.expr_list(values);
                }
            }
            Spec::Type { name, alias, typ } => {
                self.write(name);
                self.write(if *alias { " = " } else { " " });
                self.expr(typ);
            }
        }
    }

    fn block(&mut self, block: &Block) {
        self.write("{");
        self.stmt_list(&block.stmts);
        self.newline();
        self.write("}");
    }

    fn stmt_list(&mut self, stmts: &[Stmt]) {
        self.indent += 1;
        for stmt in stmts {
            if let Stmt::Labeled { label, stmt } = stmt {
                // gofmt outdents labels by one level.
                self.indent -= 1;
                self.newline();
                self.write(label);
                self.write(":");
                self.indent += 1;
                if !matches!(**stmt, Stmt::Empty) {
                    self.newline();
                    self.stmt(stmt);
                }
                continue;
            }
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.gen_decl(decl),
            Stmt::Empty => {}
            Stmt::Labeled { label, stmt } => {
                self.write(label);
                self.write(": ");
                self.stmt(stmt);
            }
            Stmt::Expr(x) => self.expr(x),
            Stmt::Send { chan, value } => {
                self.expr(chan);
                self.write(" <- ");
                self.expr(value);
            }
            Stmt::IncDec { x, inc } => {
                self.expr(x);
                self.write(if *inc { "++" } else { "--" });
            }
            Stmt::Assign { lhs, op, rhs } => {
                self.expr_list(lhs);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.expr_list(rhs);
            }
            Stmt::Go(call) => {
                self.write("go ");
                self.expr(call);
            }
            Stmt::Defer(call) => {
                self.write("defer ");
                self.expr(call);
            }
            Stmt::Return(results) => {
                self.write("return");
                if !results.is_empty() {
                    self.write(" ");
                    self.expr_list(results);
                }
            }
            Stmt::Branch { keyword, label } => {
                self.write(keyword);
                if let Some(label) = label {
                    self.write(" ");
                    self.write(label);
                }
            }
            Stmt::Block(block) => self.block(block),
            Stmt::If {
                init,
                cond,
                body,
                els,
            } => {
                self.write("if ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.write("; ");
                }
                self.expr(cond);
                self.write(" ");
                self.block(body);
                if let Some(els) = els {
                    self.write(" else ");
                    self.stmt(els);
                }
            }
            Stmt::Switch { init, tag, clauses } => {
                self.write("switch ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.write("; ");
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                    self.write(" ");
                }
                self.case_clauses(clauses);
            }
            Stmt::TypeSwitch {
                init,
                assign,
                clauses,
            } => {
                self.write("switch ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.write("; ");
                }
                self.stmt(assign);
                self.write(" ");
                self.case_clauses(clauses);
            }
            Stmt::Select(clauses) => {
                self.write("select {");
                for clause in clauses {
                    self.newline();
                    match &clause.comm {
                        Some(comm) => {
                            self.write("case ");
                            self.stmt(comm);
                            self.write(":");
                        }
                        None => self.write("default:"),
                    }
                    self.stmt_list(&clause.body);
                }
                self.newline();
                self.write("}");
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.write("for ");
                if init.is_some() || post.is_some() {
                    if let Some(init) = init {
                        self.stmt(init);
                    }
                    self.write("; ");
                    if let Some(cond) = cond {
                        self.expr(cond);
                    }
                    self.write("; ");
                    if let Some(post) = post {
                        self.stmt(post);
                    }
                    self.write(" ");
                } else if let Some(cond) = cond {
                    self.expr(cond);
                    self.write(" ");
                }
                self.block(body);
            }
            Stmt::Range {
                key,
                value,
                define,
                x,
                body,
            } => {
                self.write("for ");
                if let Some(key) = key {
                    self.expr(key);
                    if let Some(value) = value {
                        self.write(", ");
                        self.expr(value);
                    }
                    self.write(if *define { " := " } else { " = " });
                }
                self.write("range ");
                self.expr(x);
                self.write(" ");
                self.block(body);
            }
        }
    }

    fn case_clauses(&mut self, clauses: &[CaseClause]) {
        self.write("{");
        for clause in clauses {
            self.newline();
            match &clause.list {
                Some(list) => {
                    self.write("case ");
                    self.expr_list(list);
                    self.write(":");
                }
                None => self.write("default:"),
            }
            self.stmt_list(&clause.body);
        }
        self.newline();
        self.write("}");
    }

    fn expr_list(&mut self, list: &[Expr]) {
        for (i, x) in list.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.expr(x);
        }
    }

    fn signature(&mut self, typ: &FuncType) {
        self.write("(");
        self.fields(&typ.params, ", ");
        self.write(")");
        match typ.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.write(" ");
                self.expr(&single.typ);
            }
            results => {
                self.write(" (");
                self.fields(results, ", ");
                self.write(")");
            }
        }
    }

    fn fields(&mut self, fields: &[Field], sep: &str) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.write(sep);
            }
            self.field(field);
        }
    }

    fn field(&mut self, field: &Field) {
        if !field.names.is_empty() {
            self.write(&field.names.join(", "));
            self.write(" ");
        }
        self.expr(&field.typ);
        if let Some(tag) = &field.tag {
            self.write(" ");
            self.write(tag);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(name) => self.write(name),
            Expr::BasicLit { value, .. } => self.write(value),
            Expr::CompositeLit { typ, elts } => {
                if let Some(typ) = typ {
                    self.expr(typ);
                }
                self.write("{");
                for (i, elt) in elts.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(key) = &elt.key {
                        self.expr(key);
                        self.write(": ");
                    }
                    self.expr(&elt.value);
                }
                self.write("}");
            }
            Expr::FuncLit { typ, body } => {
                self.write("func");
                self.signature(typ);
                self.write(" ");
                self.block(body);
            }
            Expr::Paren(x) => {
                self.write("(");
                self.expr(x);
                self.write(")");
            }
            Expr::Selector { x, sel } => {
                self.expr(x);
                self.write(".");
                self.write(sel);
            }
            Expr::Index { x, indices } => {
                self.expr(x);
                self.write("[");
                self.expr_list(indices);
                self.write("]");
            }
            Expr::Slice { x, low, high, max } => {
                self.expr(x);
                self.write("[");
                if let Some(low) = low {
                    self.expr(low);
                }
                self.write(":");
                if let Some(high) = high {
                    self.expr(high);
                }
                if let Some(max) = max {
                    self.write(":");
                    self.expr(max);
                }
                self.write("]");
            }
            Expr::TypeAssert { x, typ } => {
                self.expr(x);
                self.write(".(");
                match typ {
                    Some(typ) => self.expr(typ),
                    None => self.write("type"),
                }
                self.write(")");
            }
            Expr::Call {
                fun,
                args,
                ellipsis,
            } => {
                self.expr(fun);
                self.write("(");
                self.expr_list(args);
                if *ellipsis {
                    self.write("...");
                }
                self.write(")");
            }
            Expr::Star(x) => {
                self.write("*");
                self.expr(x);
            }
            Expr::Unary { op, x } => {
                self.write(op);
                if unary_needs_space(op, x) {
                    self.write(" ");
                }
                self.expr(x);
            }
            Expr::Binary { op, x, y } => {
                self.expr(x);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.expr(y);
            }
            Expr::Ellipsis(elem) => {
                self.write("...");
                if let Some(elem) = elem {
                    self.expr(elem);
                }
            }
            Expr::ArrayType { len, elem } => {
                self.write("[");
                if let Some(len) = len {
                    self.expr(len);
                }
                self.write("]");
                self.expr(elem);
            }
            Expr::MapType { key, value } => {
                self.write("map[");
                self.expr(key);
                self.write("]");
                self.expr(value);
            }
            Expr::ChanType { dir, value } => {
                self.write(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(value);
            }
            Expr::FuncType(typ) => {
                self.write("func");
                self.signature(typ);
            }
            Expr::StructType(fields) => {
                if fields.is_empty() {
                    self.write("struct{}");
                    return;
                }
                self.write("struct {");
                self.indent += 1;
                for field in fields {
                    self.newline();
                    self.field(field);
                }
                self.indent -= 1;
                self.newline();
                self.write("}");
            }
            Expr::InterfaceType(elems) => {
                if elems.is_empty() {
                    self.write("interface{}");
                    return;
                }
                self.write("interface {");
                self.indent += 1;
                for elem in elems {
                    self.newline();
                    match (elem.names.first(), &elem.typ) {
                        (Some(name), Expr::FuncType(sig)) => {
                            self.write(name);
                            self.signature(sig);
                        }
                        _ => self.expr(&elem.typ),
                    }
                }
                self.indent -= 1;
                self.newline();
                self.write("}");
            }
        }
    }
}

/// Whether `op` written directly before `x` would lex as a different token,
/// as in `--1` or `&^x`.
fn unary_needs_space(op: &str, x: &Expr) -> bool {
    let Expr::Unary { op: inner, .. } = x else {
        return false;
    };
    matches!(
        (op, *inner),
        ("-", "-") | ("+", "+") | ("&", "&") | ("&", "^")
    )
}
