pub mod commands;
pub mod complete;
pub mod input;

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::debug;

use crate::config::Config;
use crate::error::{format_error, GoreError};
use crate::session::{Cycle, Session};
use complete::{GoreHelper, SourceRoots};
use input::InputBuffer;

pub struct Repl {
    session: Session,
    editor: Editor<GoreHelper, DefaultHistory>,
    buffer: InputBuffer,
    history: Option<PathBuf>,
}

impl Repl {
    pub fn new(config: &Config) -> Result<Self, GoreError> {
        let session = Session::new(config)?;
        let mut editor = Editor::<GoreHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(GoreHelper::new(SourceRoots::from_env(&config.go))));
        if let Some(path) = &config.history {
            if let Err(e) = editor.load_history(path) {
                debug!(path = %path.display(), error = %e, "no history loaded");
            }
        }
        Ok(Repl {
            session,
            editor,
            buffer: InputBuffer::new(),
            history: config.history.clone(),
        })
    }

    /// Read inputs until end of input on an empty buffer.
    pub fn run(&mut self) -> Result<(), GoreError> {
        // In non-TTY mode (piped input), rustyline suppresses prompts.
        // Print prompts ourselves and echo input for full transcript output.
        let is_tty = std::io::stdin().is_terminal();

        loop {
            let prompt = self.buffer.prompt();
            let line = if is_tty {
                self.editor.readline(prompt)
            } else {
                print!("{}", prompt);
                std::io::stdout().flush().ok();
                let result = self.editor.readline("");
                if let Ok(ref line) = result {
                    println!("{}", line);
                }
                result
            };

            match line {
                Ok(line) => {
                    self.buffer.push(&line);
                }
                Err(ReadlineError::Interrupted) => {
                    self.buffer.clear();
                    continue;
                }
                Err(ReadlineError::Eof) if !self.buffer.is_empty() => {
                    // Cancel the continuation rather than leave.
                    println!();
                    self.accept();
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }

            let input = self.buffer.contents().to_string();
            if input.trim().is_empty() {
                self.buffer.clear();
                continue;
            }

            match self.session.run(&input) {
                Ok(Cycle::Printed(source)) => print!("{}", source),
                Ok(Cycle::Imported { added: false }) => {
                    eprintln!("already imported");
                }
                Ok(_) => {}
                Err(GoreError::Continue) => continue,
                Err(e) => eprintln!("{}", format_error(&input, &e)),
            }
            self.accept();
        }

        self.save_history();
        Ok(())
    }

    fn accept(&mut self) {
        let entry = self.buffer.take();
        if !entry.trim().is_empty() {
            let _ = self.editor.add_history_entry(entry);
        }
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history {
            if let Err(e) = self.editor.append_history(path) {
                debug!(path = %path.display(), error = %e, "history not saved");
            }
        }
    }
}

/// Launch the REPL, exiting with status 1 if it cannot start.
pub fn run(config: &Config) {
    let mut repl = match Repl::new(config) {
        Ok(repl) => repl,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = repl.run() {
        eprintln!("fatal: {}", e);
        std::process::exit(1);
    }
}
