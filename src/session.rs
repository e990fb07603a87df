//! One REPL session: the growing Go program and the cycle that rebuilds it.

pub mod inject;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::checker::{Checker, NameChecker};
use crate::config::Config;
use crate::error::GoreError;
use crate::program::SessionProgram;
use crate::quickfix::quick_fix;
use crate::repl::commands::{parse_command, Command};
use crate::runner::{GoRunner, RunOutcome, Runner};

pub use inject::inject;

/// How a successful cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// `:import` handled; `added` is false when the path was already imported.
    Imported { added: bool },
    /// `:print` handled; carries the current program source.
    Printed(String),
    /// The input built and ran; it is now part of the committed program.
    Committed,
}

pub struct Session {
    // Held for its Drop: the directory goes away with the session.
    _dir: TempDir,
    file: PathBuf,
    program: SessionProgram,
    /// Length of the entry body known to build and run.
    checkpoint: usize,
    max_fix_attempts: usize,
    rollback_status: i32,
    checker: Box<dyn Checker>,
    runner: Box<dyn Runner>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, GoreError> {
        Self::with_parts(
            config,
            Box::new(NameChecker),
            Box::new(GoRunner::from_config(config)),
        )
    }

    pub fn with_parts(
        config: &Config,
        checker: Box<dyn Checker>,
        runner: Box<dyn Runner>,
    ) -> Result<Self, GoreError> {
        let dir = tempfile::Builder::new().prefix("gore").tempdir()?;
        let file = dir.path().join(&config.session_file);
        let program = SessionProgram::new().map_err(|e| GoreError::Syntax {
            message: e.message,
            offset: e.offset,
        })?;
        debug!(file = %file.display(), "session started");
        Ok(Session {
            _dir: dir,
            file,
            program,
            checkpoint: 0,
            max_fix_attempts: config.max_fix_attempts,
            rollback_status: config.rollback_status,
            checker,
            runner,
        })
    }

    pub fn program(&self) -> &SessionProgram {
        &self.program
    }

    pub fn source(&self) -> String {
        self.program.source()
    }

    pub fn checkpoint(&self) -> usize {
        self.checkpoint
    }

    pub fn session_file(&self) -> &Path {
        &self.file
    }

    /// Handle one complete input.
    pub fn run(&mut self, input: &str) -> Result<Cycle, GoreError> {
        debug!(input, "run");
        self.program.clear_discards();

        if let Some(command) = parse_command(input) {
            return match command.map_err(GoreError::Command)? {
                Command::Import { path, alias } => {
                    let added = self.program.add_import(&path, alias);
                    debug!(path, added, "import");
                    Ok(Cycle::Imported { added })
                }
                Command::Print => Ok(Cycle::Printed(self.program.source())),
            };
        }

        inject(&mut self.program, input)?;

        match quick_fix(&mut self.program, self.checker.as_mut(), self.max_fix_attempts) {
            Ok(fixes) => debug!(fixes, "quick fix done"),
            Err(err) => debug!(error = %err, "quick fix gave up"),
        }

        fs::write(&self.file, self.program.source())?;
        match self.runner.run(&self.file)? {
            RunOutcome::Success => {
                self.commit();
                Ok(Cycle::Committed)
            }
            RunOutcome::Failed(status) => {
                let rolled_back = status == Some(self.rollback_status);
                if rolled_back {
                    self.rollback();
                } else {
                    debug!(?status, "program failed; keeping its statements");
                }
                Err(GoreError::Build {
                    status,
                    rolled_back,
                })
            }
        }
    }

    fn commit(&mut self) {
        self.checkpoint = self.program.body_len();
        debug!(checkpoint = self.checkpoint, "commit");
    }

    fn rollback(&mut self) {
        debug!(
            from = self.program.body_len(),
            to = self.checkpoint,
            "rollback"
        );
        self.program.truncate(self.checkpoint);
    }
}
