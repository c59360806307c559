// src/system/input.rs

use std::fmt;
use std::io::{self, BufRead};

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::constants::BATCH_COMMENT_CHAR;

lazy_static! {
    // `name = value` shorthand accepted in batch files.
    static ref ASSIGNMENT_RE: Regex =
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*(\S.*)$").unwrap();
}

/// Reads the "interesting" lines of a command stream: blank lines and
/// lines whose first non-blank character is the comment marker are
/// skipped, every physical line counts toward the reported line number,
/// and `name = value` lines are rewritten to `define name value`.
pub struct LineReader<R> {
    inner: R,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, line_no: 0 }
    }

    /// The next substantive line with its 1-based line number, or `None`
    /// at end of input.
    pub fn next_interesting(&mut self) -> io::Result<Option<(usize, String)>> {
        loop {
            let mut line = String::new();
            if self.inner.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(BATCH_COMMENT_CHAR) {
                continue;
            }

            let text = match ASSIGNMENT_RE.captures(trimmed) {
                Some(caps) => format!("define {} {}", &caps[1], &caps[2]),
                None => trimmed.to_string(),
            };
            return Ok(Some((self.line_no, text)));
        }
    }
}

impl<R> fmt::Debug for LineReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineReader")
            .field("line_no", &self.line_no)
            .finish_non_exhaustive()
    }
}

/// Interactive line input with editing and history.
pub struct Console {
    editor: DefaultEditor,
}

impl Console {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to initialize the line editor")?;
        Ok(Self { editor })
    }

    /// Reads one line. Ctrl-C discards the pending line and re-prompts;
    /// end of input returns `None`.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(e).context("Failed to read a command line"),
            }
        }
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Blocks until a single key is pressed.
pub fn wait_for_key() -> Result<()> {
    let term = console::Term::stdout();
    term.write_str(t!("input.info.press_any_key"))
        .context("Failed to write to the terminal")?;
    term.read_key().context("Failed to read a key press")?;
    term.write_line("")
        .context("Failed to write to the terminal")?;
    Ok(())
}

// MARK: --- UNIT TESTS ---
