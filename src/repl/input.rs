pub const PROMPT: &str = "gore> ";
pub const PROMPT_CONTINUE: &str = "..... ";

/// Physical lines of one logical input that is still being typed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputBuffer {
    buffer: String,
    continuing: bool,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        !self.continuing
    }

    pub fn prompt(&self) -> &'static str {
        if self.continuing {
            PROMPT_CONTINUE
        } else {
            PROMPT
        }
    }

    /// Add a line and return everything typed so far, lines joined with `\n`.
    pub fn push(&mut self, line: &str) -> &str {
        if self.continuing {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
        self.continuing = true;
        &self.buffer
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Finish the current input, returning it for the history.
    pub fn take(&mut self) -> String {
        self.continuing = false;
        std::mem::take(&mut self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.continuing = false;
    }
}
