// src/constants.rs

/// The file the full help catalog is dumped to, in the current working
/// directory, the first time `help` is dispatched in a run.
pub const HELP_HTML_FILENAME: &str = "help.html";

/// The prompt printed for interactive command input.
pub const COMMAND_PROMPT: &str = "> ";

/// The literal token that terminates a list-valued argument run.
pub const LIST_TERMINATOR: &str = "done";

/// First non-blank character marking a batch-file line as a comment.
pub const BATCH_COMMENT_CHAR: char = '#';

/// A line containing only this terminates an interactively collected
/// comment paragraph.
pub const PARAGRAPH_TERMINATOR: &str = ".";

/// Lines containing this substring are never echoed (synthetic input
/// injected by pointer-driven front ends).
pub const CLICK_MARKER: &str = "-click";

/// Match counts at or below this render help in one-line mode; above it,
/// name-only mode.
pub const ONE_LINE_MAX_MATCHES: usize = 14;
