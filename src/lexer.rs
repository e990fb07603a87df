//! Go tokenizer.
//!
//! Produces a flat token list with Go's automatic semicolon insertion already
//! applied, so the parser only ever sees explicit statement terminators.

use std::fmt;

use crate::error::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    Ident(String),
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    Str(String),
    Keyword(&'static str),
    Punct(&'static str),
    /// Statement terminator; `implicit` when inserted at a newline or at end of input.
    Semi { implicit: bool },
    Eof,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Ident(name) => write!(f, "name {}", name),
            Tok::Int(lit) | Tok::Float(lit) | Tok::Imag(lit) | Tok::Char(lit) | Tok::Str(lit) => {
                write!(f, "literal {}", lit)
            }
            Tok::Keyword(kw) => write!(f, "keyword {}", kw),
            Tok::Punct(p) => write!(f, "{}", p),
            Tok::Semi { implicit: true } => write!(f, "newline"),
            Tok::Semi { implicit: false } => write!(f, "semicolon"),
            Tok::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub offset: usize,
    /// Set when the input ends inside a construct that more lines could close.
    pub incomplete: bool,
}

pub const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

// Longest first so that prefix matching picks the maximal munch.
const PUNCTS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/",
    "%", "&", "|", "^", "<", ">", "=", "!", "~", "(", ")", "[", "]", "{", "}", ",", ";", ".",
    ":",
];

pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn push(&mut self, tok: Tok, start: usize) {
        self.tokens.push(Token {
            tok,
            span: (start, self.pos),
        });
    }

    /// Go's rule: a line break after an identifier, literal, one of the keywords
    /// break/continue/fallthrough/return, or one of `++ -- ) ] }` ends the statement.
    fn needs_semicolon(&self) -> bool {
        match self.tokens.last().map(|t| &t.tok) {
            Some(Tok::Ident(_))
            | Some(Tok::Int(_))
            | Some(Tok::Float(_))
            | Some(Tok::Imag(_))
            | Some(Tok::Char(_))
            | Some(Tok::Str(_)) => true,
            Some(Tok::Keyword(kw)) => {
                matches!(*kw, "break" | "continue" | "fallthrough" | "return")
            }
            Some(Tok::Punct(p)) => matches!(*p, "++" | "--" | ")" | "]" | "}"),
            _ => false,
        }
    }

    fn line_break(&mut self, at: usize) {
        if self.needs_semicolon() {
            self.tokens.push(Token {
                tok: Tok::Semi { implicit: true },
                span: (at, at),
            });
        }
    }

    fn error(&self, message: impl Into<String>, offset: usize, incomplete: bool) -> LexError {
        LexError {
            message: message.into(),
            offset,
            incomplete,
        }
    }

    fn run(&mut self) -> Result<(), LexError> {
        let src = self.src;
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                '\n' => {
                    self.line_break(start);
                    self.pos += 1;
                }
                ' ' | '\t' | '\r' => self.pos += 1,
                '/' if self.peek_at(1) == Some('/') => {
                    let end = src[start..]
                        .find('\n')
                        .map(|i| start + i)
                        .unwrap_or(src.len());
                    self.pos = end;
                }
                '/' if self.peek_at(1) == Some('*') => {
                    let Some(len) = src[start + 2..].find("*/") else {
                        return Err(self.error("comment not terminated", start, true));
                    };
                    let body = &src[start + 2..start + 2 + len];
                    if body.contains('\n') {
                        self.line_break(start);
                    }
                    self.pos = start + 2 + len + 2;
                }
                '"' => self.lex_quoted('"', start)?,
                '\'' => self.lex_quoted('\'', start)?,
                '`' => {
                    let Some(len) = src[start + 1..].find('`') else {
                        return Err(self.error("raw string literal not terminated", start, true));
                    };
                    self.pos = start + 1 + len + 1;
                    let text = src[start..self.pos].to_string();
                    self.push(Tok::Str(text), start);
                }
                c if c.is_ascii_digit() => self.lex_number(start),
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                    self.lex_number(start)
                }
                c if c.is_alphabetic() || c == '_' => {
                    let end = src[start..]
                        .char_indices()
                        .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '_'))
                        .map(|(i, _)| start + i)
                        .unwrap_or(src.len());
                    self.pos = end;
                    let word = &src[start..end];
                    let tok = match KEYWORDS.iter().find(|kw| **kw == word) {
                        Some(&kw) => Tok::Keyword(kw),
                        None => Tok::Ident(word.to_string()),
                    };
                    self.push(tok, start);
                }
                _ => {
                    let rest = &src[start..];
                    let Some(&p) = PUNCTS.iter().find(|p| rest.starts_with(**p)) else {
                        return Err(self.error(format!("invalid character {:?}", c), start, false));
                    };
                    self.pos += p.len();
                    let tok = if p == ";" {
                        Tok::Semi { implicit: false }
                    } else {
                        Tok::Punct(p)
                    };
                    self.push(tok, start);
                }
            }
        }
        let end = src.len();
        self.line_break(end);
        self.tokens.push(Token {
            tok: Tok::Eof,
            span: (end, end),
        });
        Ok(())
    }

    /// Interpreted string or rune literal. Neither may span lines.
    fn lex_quoted(&mut self, quote: char, start: usize) -> Result<(), LexError> {
        let src = self.src;
        let what = if quote == '"' { "string" } else { "rune" };
        let mut chars = src[start + 1..].char_indices();
        loop {
            match chars.next() {
                Some((i, ch)) if ch == quote => {
                    self.pos = start + 1 + i + 1;
                    break;
                }
                Some((_, '\\')) => match chars.next() {
                    Some((_, '\n')) | None => {
                        return Err(self.error(
                            format!("{} literal not terminated", what),
                            start,
                            false,
                        ));
                    }
                    Some(_) => {}
                },
                Some((_, '\n')) | None => {
                    return Err(self.error(format!("{} literal not terminated", what), start, false));
                }
                Some(_) => {}
            }
        }
        let text = src[start..self.pos].to_string();
        let tok = if quote == '"' {
            Tok::Str(text)
        } else {
            Tok::Char(text)
        };
        self.push(tok, start);
        Ok(())
    }

    fn lex_number(&mut self, start: usize) {
        let src = self.src;
        let bytes = src.as_bytes();
        let mut i = start;
        let mut is_float = false;
        let hex = bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'x' | b'X'));
        if bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O')) {
            i += 2;
            while i < bytes.len() && (bytes[i].is_ascii_hexdigit() || bytes[i] == b'_') {
                i += 1;
            }
            if hex && matches!(bytes.get(i), Some(b'p' | b'P')) {
                is_float = true;
                i = skip_exponent(bytes, i);
            }
        } else {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
                i += 1;
            }
            if bytes.get(i) == Some(&b'.') && bytes.get(i + 1) != Some(&b'.') {
                is_float = true;
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
                    i += 1;
                }
            }
            if matches!(bytes.get(i), Some(b'e' | b'E')) {
                is_float = true;
                i = skip_exponent(bytes, i);
            }
        }
        let imaginary = bytes.get(i) == Some(&b'i');
        if imaginary {
            i += 1;
        }
        self.pos = i;
        let text = src[start..i].to_string();
        let tok = if imaginary {
            Tok::Imag(text)
        } else if is_float {
            Tok::Float(text)
        } else {
            Tok::Int(text)
        };
        self.push(tok, start);
    }
}

/// Skip an exponent marker (`e`, `p`), an optional sign and its digits.
fn skip_exponent(bytes: &[u8], mut i: usize) -> usize {
    i += 1;
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'_') {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Tok> {
        tokenize(src).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn semicolon_after_ident_at_end() {
        assert_eq!(
            kinds("x"),
            vec![
                Tok::Ident("x".into()),
                Tok::Semi { implicit: true },
                Tok::Eof
            ]
        );
    }

    #[test]
    fn no_semicolon_after_open_brace() {
        assert_eq!(
            kinds("if true {\n}"),
            vec![
                Tok::Keyword("if"),
                Tok::Ident("true".into()),
                Tok::Punct("{"),
                Tok::Punct("}"),
                Tok::Semi { implicit: true },
                Tok::Eof
            ]
        );
    }

    #[test]
    fn operators_use_maximal_munch() {
        assert_eq!(
            kinds("a &^= b <- c"),
            vec![
                Tok::Ident("a".into()),
                Tok::Punct("&^="),
                Tok::Ident("b".into()),
                Tok::Punct("<-"),
                Tok::Ident("c".into()),
                Tok::Semi { implicit: true },
                Tok::Eof
            ]
        );
    }

    #[test]
    fn number_forms() {
        assert_eq!(
            kinds("1_000 0x1F 3.14 1e9 .5 2i 0x1p-2")
                .into_iter()
                .filter(|t| !matches!(t, Tok::Semi { .. } | Tok::Eof))
                .collect::<Vec<_>>(),
            vec![
                Tok::Int("1_000".into()),
                Tok::Int("0x1F".into()),
                Tok::Float("3.14".into()),
                Tok::Float("1e9".into()),
                Tok::Float(".5".into()),
                Tok::Imag("2i".into()),
                Tok::Float("0x1p-2".into()),
            ]
        );
    }

    #[test]
    fn slice_range_is_not_a_float() {
        assert_eq!(
            kinds("s[1:]")[..4],
            [
                Tok::Ident("s".into()),
                Tok::Punct("["),
                Tok::Int("1".into()),
                Tok::Punct(":"),
            ]
        );
    }

    #[test]
    fn strings_and_runes_keep_their_quotes() {
        assert_eq!(
            kinds(r#""a\"b" 'x' `raw`"#)[..3],
            [
                Tok::Str(r#""a\"b""#.into()),
                Tok::Char("'x'".into()),
                Tok::Str("`raw`".into()),
            ]
        );
    }

    #[test]
    fn unterminated_raw_string_is_incomplete() {
        let err = tokenize("s := `abc").unwrap_err();
        assert!(err.incomplete);
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn unterminated_block_comment_is_incomplete() {
        assert!(tokenize("x /* note").unwrap_err().incomplete);
    }

    #[test]
    fn unterminated_string_is_a_real_error() {
        let err = tokenize("fmt.Println(\"hi").unwrap_err();
        assert!(!err.incomplete);
        assert_eq!(err.message, "string literal not terminated");
    }

    #[test]
    fn line_comment_still_ends_statement() {
        assert_eq!(
            kinds("x // trailing\ny"),
            vec![
                Tok::Ident("x".into()),
                Tok::Semi { implicit: true },
                Tok::Ident("y".into()),
                Tok::Semi { implicit: true },
                Tok::Eof
            ]
        );
    }

    #[test]
    fn invalid_character() {
        let err = tokenize("x := #").unwrap_err();
        assert!(!err.incomplete);
        assert_eq!(err.offset, 5);
    }
}
