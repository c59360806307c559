// src/models.rs

use std::fmt;

// --- TYPED ARGUMENT VALUES ---

/// A fully resolved argument value.
///
/// Every consumer matches exhaustively on this enum; there is no
/// out-of-band type code. List variants hold the members of a token run
/// terminated by the list-terminator token.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    IntList(Vec<i64>),
    RealList(Vec<f64>),
    TextList(Vec<String>),
}

impl Value {
    /// Renders the value as a single command-line token, ready to be
    /// spliced back into a command. List values are joined into one
    /// derived token.
    pub fn to_token(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Real(v) => v.to_string(),
            Self::Bool(v) => (if *v { "y" } else { "n" }).to_string(),
            Self::Text(v) => v.clone(),
            Self::IntList(vs) => join_tokens(vs.iter()),
            Self::RealList(vs) => join_tokens(vs.iter()),
            Self::TextList(vs) => vs.join(" "),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

fn join_tokens<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// --- ARGUMENT DECLARATIONS ---

/// The declared type of a command argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Int,
    Real,
    Bool,
    /// Any token, or one of a closed set when `ArgSpec::choices` is given.
    Text,
    /// A token that must equal a member of the closed set (case-sensitive).
    Choice,
    /// A path the eventual file operation will open. Always valid at the
    /// token level; existence is checked by the operation itself.
    FileOpen,
    /// A path the eventual file operation will create or overwrite.
    FileSave,
    IntList,
    RealList,
    TextList,
    ChoiceList,
}

impl ArgKind {
    /// Whether this kind consumes a variable-length token run.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            Self::IntList | Self::RealList | Self::TextList | Self::ChoiceList
        )
    }

    /// The scalar kind each member of a list run is validated as.
    /// Scalar kinds return themselves.
    pub fn element(self) -> Self {
        match self {
            Self::IntList => Self::Int,
            Self::RealList => Self::Real,
            Self::TextList => Self::Text,
            Self::ChoiceList => Self::Choice,
            other => other,
        }
    }

    /// Human-readable type name used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Int | Self::IntList => "integer",
            Self::Real | Self::RealList => "real",
            Self::Bool => "y/n",
            Self::Text | Self::TextList => "string",
            Self::Choice | Self::ChoiceList => "choice",
            Self::FileOpen => "file to read",
            Self::FileSave => "file to write",
        }
    }
}

/// Declares where an argument lives on a command line and what values it
/// accepts. The resolver tries the `key value` convention first when `key`
/// is set, then the positional `index`, then solicits a value.
#[derive(Debug, Clone, Default)]
pub struct ArgSpec<'a> {
    /// Positional token index in the full line (token 0 is the command name).
    pub index: usize,
    /// Keyword preceding the value under the `key value` convention.
    pub key: Option<&'a str>,
    /// Short description used in prompts and substitution reports.
    pub name: &'a str,
    /// Inclusive numeric lower bound. Both bounds zero means unbounded.
    pub min: f64,
    /// Inclusive numeric upper bound. Both bounds zero means unbounded.
    pub max: f64,
    /// Closed set of legal values for choice kinds. Empty means open.
    pub choices: &'a [&'a str],
}

impl ArgSpec<'_> {
    /// Whether the numeric bounds are the "unbounded" sentinel.
    pub fn unbounded(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }

    /// The name shown to the user: the description, falling back to the
    /// keyword.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            self.name
        } else {
            self.key.unwrap_or("value")
        }
    }
}
