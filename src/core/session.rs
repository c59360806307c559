// src/core/session.rs

use anyhow::Result;
use colored::Colorize;

use crate::constants::{CLICK_MARKER, COMMAND_PROMPT};
use crate::core::command::Command;
use crate::core::dispatch::{self, CommandSet};
use crate::core::help::HelpRegistry;
use crate::system::input::Console;

/// The shell context: the help registry plus the per-run flags the
/// dispatch protocol and the loops share. One `Session` value replaces
/// the source's process-wide globals; every engine operation takes it by
/// reference.
#[derive(Debug)]
pub struct Session {
    /// The help catalog, populated by describe-mode passes.
    pub help: HelpRegistry,
    acted: bool,
    quit: bool,
    html_written: bool,
    transcript: Option<String>,
    verbosity: i32,
}

impl Session {
    pub fn new(verbosity: i32) -> Self {
        Self {
            help: HelpRegistry::new(),
            acted: false,
            quit: false,
            html_written: false,
            transcript: None,
            verbosity,
        }
    }

    /// Whether the last dispatched command was recognized by some handler.
    pub fn acted(&self) -> bool {
        self.acted
    }

    pub fn set_acted(&mut self) {
        self.acted = true;
    }

    pub fn clear_acted(&mut self) {
        self.acted = false;
    }

    /// Whether a handler has asked the loops to terminate.
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// The once-per-run latch for the HTML help dump.
    pub fn html_written(&self) -> bool {
        self.html_written
    }

    pub fn mark_html_written(&mut self) {
        self.html_written = true;
    }

    /// The transcript session name, when transcript mode is on.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn set_transcript(&mut self, name: Option<String>) {
        self.transcript = name;
    }

    pub fn verbosity(&self) -> i32 {
        self.verbosity
    }

    /// Echoes a command line as the loops read it. Suppressed entirely at
    /// negative verbosity and for synthetic pointer-driven lines; in
    /// transcript mode, non-`comment` lines are additionally wrapped in
    /// typesetting markup for tutorial documents.
    pub fn echo_command(&self, cmd: &Command) {
        let text = cmd.text();
        if self.verbosity < 0 || text.contains(CLICK_MARKER) {
            return;
        }
        println!("{}{}", COMMAND_PROMPT.dimmed(), text);
        if self.transcript.is_some() && !cmd.is_named("comment") {
            println!("\\begin{{verbatim}}");
            println!("{}{}", COMMAND_PROMPT, text);
            println!("\\end{{verbatim}}");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Teardown report, not a failure: note what the run never flushed.
        if !self.help.is_empty() && !self.html_written {
            log::debug!(
                "Session closed with {} help entries never dumped to HTML.",
                self.help.len()
            );
        }
    }
}

/// The interactive loop: read a line, parse, echo, dispatch; `quit` is
/// special-cased ahead of dispatch so a terminating line never reaches
/// the handlers. Ctrl-C re-prompts, end-of-input ends the session.
pub fn run_interactive<E>(session: &mut Session, env: &mut E, chain: CommandSet<E>) -> Result<()> {
    let mut console = Console::new()?;

    while !session.quit_requested() {
        let Some(line) = console.read_line(COMMAND_PROMPT)? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut cmd = match Command::parse(line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };
        if cmd.is_empty() {
            continue;
        }

        session.echo_command(&cmd);
        if cmd.is_named("quit") {
            session.request_quit();
            break;
        }
        if let Err(e) = dispatch::execute(session, env, chain, &mut cmd) {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
        }
    }
    Ok(())
}

// MARK: --- UNIT TESTS ---
