/// A REPL command: input starting with `:` that never reaches the Go program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Import { path: String, alias: Option<String> },
    Print,
}

pub const COMMAND_NAMES: &[&str] = &[":import ", ":print"];

const IMPORT_USAGE: &str = "usage: :import [alias] <path>";

/// Recognize a command line. `None` means the input is Go code; `Some(Err)`
/// is a malformed command.
pub fn parse_command(input: &str) -> Option<Result<Command, String>> {
    let trimmed = input.trim();
    if trimmed == ":print" {
        return Some(Ok(Command::Print));
    }
    let rest = trimmed.strip_prefix(":import")?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let args: Vec<&str> = rest.split_whitespace().collect();
    let unquote = |s: &str| s.trim_matches('"').to_string();
    let command = match args.as_slice() {
        [path] => Command::Import {
            path: unquote(path),
            alias: None,
        },
        [alias, path] => Command::Import {
            path: unquote(path),
            alias: Some(alias.to_string()),
        },
        _ => return Some(Err(IMPORT_USAGE.to_string())),
    };
    match &command {
        Command::Import { path, .. } if path.is_empty() => Some(Err(IMPORT_USAGE.to_string())),
        _ => Some(Ok(command)),
    }
}
