use std::path::PathBuf;

use crate::quickfix::DEFAULT_MAX_ATTEMPTS;

/// Exit status `go run` uses when the program fails to build.
pub const DEFAULT_ROLLBACK_STATUS: i32 = 2;

pub const SESSION_FILE: &str = "gore_session.go";

const HISTORY_FILE: &str = ".gore_history";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The `go` executable.
    pub go: PathBuf,
    /// Arguments placed between the executable and the session file.
    pub run_args: Vec<String>,
    pub session_file: String,
    pub max_fix_attempts: usize,
    /// Exit status that discards the last input.
    pub rollback_status: i32,
    /// Line editor history; `None` disables it.
    pub history: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            go: PathBuf::from("go"),
            run_args: vec!["run".to_string()],
            session_file: SESSION_FILE.to_string(),
            max_fix_attempts: DEFAULT_MAX_ATTEMPTS,
            rollback_status: DEFAULT_ROLLBACK_STATUS,
            history: default_history_path(),
        }
    }
}

pub fn default_history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HISTORY_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.go, PathBuf::from("go"));
        assert_eq!(config.run_args, vec!["run"]);
        assert_eq!(config.max_fix_attempts, 10);
        assert_eq!(config.rollback_status, 2);
        if let Some(history) = config.history {
            assert!(history.ends_with(".gore_history"));
        }
    }
}
