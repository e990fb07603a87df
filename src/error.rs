use std::io;

use rustyline::error::ReadlineError;
use thiserror::Error;

/// Byte offset range in source text.
pub type Span = (usize, usize);

#[derive(Debug, Error)]
pub enum GoreError {
    /// The input is an unfinished fragment; the caller keeps buffering lines.
    #[error("<continue input>")]
    Continue,
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },
    /// Malformed REPL command; carries the usage text.
    #[error("{0}")]
    Command(String),
    #[error("{}", describe_build_failure(.status, .rolled_back))]
    Build {
        status: Option<i32>,
        rolled_back: bool,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line editor: {0}")]
    Editor(#[from] ReadlineError),
}

fn describe_build_failure(status: &Option<i32>, rolled_back: &bool) -> String {
    let status = match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    if *rolled_back {
        format!("{} (last input discarded)", status)
    } else {
        status
    }
}

/// Format a GoreError with source context, showing the offending line and a caret.
/// Errors without a source position are rendered as their plain message.
pub fn format_error(source: &str, err: &GoreError) -> String {
    let (message, offset) = match err {
        GoreError::Syntax { message, offset } => (message, *offset),
        other => return other.to_string(),
    };

    let (line_num, col, line_text) = offset_to_line_col(source, offset);
    format!(
        "syntax error: {}\n  --> {}:{}\n   | {}\n   | {}^",
        message,
        line_num,
        col,
        line_text,
        " ".repeat(col.saturating_sub(1))
    )
}

/// Convert a byte offset to (1-based line number, 1-based column, line text).
fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize, &str) {
    let offset = offset.min(source.len());
    let mut line_start = 0;
    let mut line_num = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line_start = i + 1;
            line_num += 1;
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());
    let col = source[line_start..offset].chars().count() + 1;
    (line_num, col, &source[line_start..line_end])
}
