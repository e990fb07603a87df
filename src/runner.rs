//! The external build-and-run step.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::config::Config;
use crate::error::GoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Non-zero exit; `None` when the child was killed by a signal.
    Failed(Option<i32>),
}

/// Builds and runs a Go source file, blocking until it exits.
pub trait Runner {
    fn run(&mut self, file: &Path) -> Result<RunOutcome, GoreError>;
}

/// Runs `go run <file>` with the terminal's stdin, stdout and stderr.
#[derive(Debug, Clone)]
pub struct GoRunner {
    go: PathBuf,
    args: Vec<String>,
}

impl GoRunner {
    pub fn new(go: impl Into<PathBuf>, args: Vec<String>) -> Self {
        GoRunner {
            go: go.into(),
            args,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.go.clone(), config.run_args.clone())
    }

    fn command(&self, file: &Path) -> Command {
        let mut cmd = Command::new(&self.go);
        cmd.args(&self.args).arg(file);
        cmd
    }
}

impl Runner for GoRunner {
    fn run(&mut self, file: &Path) -> Result<RunOutcome, GoreError> {
        let mut cmd = self.command(file);
        debug!(command = ?cmd, "running");
        let status = cmd.status().map_err(|source| GoreError::Spawn {
            program: self.go.display().to_string(),
            source,
        })?;
        debug!(%status, "finished");
        Ok(if status.success() {
            RunOutcome::Success
        } else {
            RunOutcome::Failed(status.code())
        })
    }
}
