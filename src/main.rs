use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gore::config::{default_history_path, Config, DEFAULT_ROLLBACK_STATUS};
use gore::quickfix::DEFAULT_MAX_ATTEMPTS;

/// Interactive Go: each input is added to one program that is rebuilt and rerun.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The go command used to build and run the session.
    #[arg(long, value_name = "PATH", env = "GORE_GO", default_value = "go")]
    go: PathBuf,

    /// Passes of automatic fixing for unused variables and imports.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_fix_attempts: usize,

    /// Exit status of `go run` that discards the last input.
    #[arg(long, value_name = "STATUS", default_value_t = DEFAULT_ROLLBACK_STATUS)]
    rollback_status: i32,

    /// History file (default: ~/.gore_history).
    #[arg(long, value_name = "PATH", conflicts_with = "no_history")]
    history: Option<PathBuf>,

    /// Do not read or write a history file.
    #[arg(long)]
    no_history: bool,

    /// Log each step of the session to stderr.
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn config(self) -> Config {
        let history = if self.no_history {
            None
        } else {
            self.history.or_else(default_history_path)
        };
        Config {
            go: self.go,
            max_fix_attempts: self.max_fix_attempts,
            rollback_status: self.rollback_status,
            history,
            ..Config::default()
        }
    }
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_env("GORE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if debug { "gore=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);
    gore::repl::run(&cli.config());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_config() {
        let config = Cli::parse_from(["gore"]).config();
        let defaults = Config::default();
        assert_eq!(config.max_fix_attempts, defaults.max_fix_attempts);
        assert_eq!(config.rollback_status, defaults.rollback_status);
        assert_eq!(config.run_args, defaults.run_args);
    }

    #[test]
    fn no_history_disables_history() {
        let config = Cli::parse_from(["gore", "--no-history"]).config();
        assert_eq!(config.history, None);
        let config = Cli::parse_from(["gore", "--history", "/tmp/h", "-d"]).config();
        assert_eq!(config.history, Some(PathBuf::from("/tmp/h")));
    }

    #[test]
    fn flags_override_defaults() {
        let config = Cli::parse_from(["gore", "--max-fix-attempts", "3", "--rollback-status", "1"]).config();
        assert_eq!(config.max_fix_attempts, 3);
        assert_eq!(config.rollback_status, 1);
    }
}
