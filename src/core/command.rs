// src/core/command.rs

use std::borrow::Cow;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Command line could not be tokenized (unbalanced quoting?): {0}")]
    Tokenize(String),
}

/// One parsed command line.
///
/// Token 0 is the command name; the rest are its arguments. A `Command` is
/// an immutable snapshot of its token sequence: the only mutation entry
/// point is [`Command::rebuild`], which constructs a whole new snapshot and
/// swaps it in, so derived state (`args`, the index cache) can never be
/// observed half-updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Command {
    line: Vec<String>,
    args: Vec<String>,
    cached_indices: Option<Vec<usize>>,
}

impl Command {
    /// Tokenizes one input line. Quoting rules are the shell ones
    /// (`shlex`); the only failure mode is malformed quoting, which the
    /// caller handles by re-reading input.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let tokens =
            shlex::split(text).ok_or_else(|| ParseError::Tokenize(text.to_string()))?;
        Ok(Self::from_tokens(tokens))
    }

    /// Builds a command from an already tokenized line.
    pub fn from_tokens(line: Vec<String>) -> Self {
        let args = line.get(1..).unwrap_or_default().to_vec();
        Self {
            line,
            args,
            cached_indices: None,
        }
    }

    /// Atomically replaces the whole token sequence. All derived fields are
    /// recomputed from the new tokens and the index cache is invalidated.
    pub fn rebuild(&mut self, line: Vec<String>) {
        *self = Self::from_tokens(line);
    }

    /// Bounds-checked read of token `i`.
    pub fn token(&self, i: usize) -> Option<&str> {
        self.line.get(i).map(String::as_str)
    }

    /// The command name (token 0), if the line is non-empty.
    pub fn name(&self) -> Option<&str> {
        self.token(0)
    }

    /// The tokens after the command name.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The full token sequence.
    pub fn tokens(&self) -> &[String] {
        &self.line
    }

    pub fn token_count(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Case-insensitive token comparison. `name = None` matches only an
    /// absent token, which is how callers detect "no more arguments".
    pub fn token_eq(&self, i: usize, name: Option<&str>) -> bool {
        match (self.token(i), name) {
            (Some(tok), Some(name)) => tok.eq_ignore_ascii_case(name),
            (None, None) => true,
            _ => false,
        }
    }

    /// Whether this command is named `name` (case-insensitive).
    pub fn is_named(&self, name: &str) -> bool {
        self.token_eq(0, Some(name))
    }

    /// Scans the arguments for `key value` and returns the value token.
    /// The key may appear anywhere after the command name as long as a
    /// token follows it; the comparison is case-insensitive.
    pub fn value_after_key(&self, key: &str) -> Option<&str> {
        self.key_position(key)
            .and_then(|pos| self.token(pos + 1))
    }

    /// The token index at which `key` appears (case-insensitive), scanning
    /// the arguments only. A key in the final position is still reported,
    /// even though no value follows it.
    pub fn key_position(&self, key: &str) -> Option<usize> {
        self.line
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, tok)| tok.eq_ignore_ascii_case(key))
            .map(|(i, _)| i)
    }

    /// The line re-joined for echo and transcripts, re-quoting tokens that
    /// need it.
    pub fn text(&self) -> String {
        self.line
            .iter()
            .map(|tok| {
                shlex::try_quote(tok)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| tok.clone())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The lazily-computed index cache, for callers that map tokens to
    /// table-column indices. Cleared by every [`Command::rebuild`].
    pub fn cached_indices(&self) -> Option<&[usize]> {
        self.cached_indices.as_deref()
    }

    pub fn set_cached_indices(&mut self, indices: Vec<usize>) {
        self.cached_indices = Some(indices);
    }
}

// MARK: --- UNIT TESTS ---
