// src/core/resolver.rs

use std::collections::VecDeque;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::constants::LIST_TERMINATOR;
use crate::core::command::Command;
use crate::models::{ArgKind, ArgSpec, Value};

// --- ARGUMENT SOURCES ---

/// Where the resolver turns when the command line does not already supply
/// a valid value. The caller selects the capability: an interactive
/// prompter, a silent defaulter, or a scripted feed.
pub trait ArgSource {
    /// Reads one candidate value for `prompt`. `None` means this source
    /// cannot supply a value and the clamped default must be substituted.
    fn read_value(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive solicitation on the terminal.
#[derive(Debug, Default)]
pub struct Prompter;

impl ArgSource for Prompter {
    fn read_value(&mut self, prompt: &str) -> Result<Option<String>> {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .context("Failed to read an argument value from the terminal")?;
        Ok(Some(line))
    }
}

/// Never blocks; every missing or invalid argument resolves to its
/// bounds-clamped default.
#[derive(Debug, Default)]
pub struct SilentDefaults;

impl ArgSource for SilentDefaults {
    fn read_value(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Feeds pre-recorded lines, then behaves like [`SilentDefaults`]. Used
/// for batch-sourced resolution and in tests.
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl ArgSource for ScriptedLines {
    fn read_value(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

// --- TOKEN VALIDATION ---

/// Whether `token` is acceptable for `kind` under `spec`. List kinds
/// validate as their element kind; run-level validation is the caller's
/// job.
pub fn token_is_valid(kind: ArgKind, token: &str, spec: &ArgSpec<'_>) -> bool {
    match kind.element() {
        ArgKind::Int => token
            .parse::<i64>()
            .map(|v| within_bounds(v as f64, spec))
            .unwrap_or(false),
        ArgKind::Real => token
            .parse::<f64>()
            .map(|v| within_bounds(v, spec))
            .unwrap_or(false),
        ArgKind::Bool => is_boolean(token),
        // An open string accepts anything; a closed set is case-sensitive.
        ArgKind::Text => spec.choices.is_empty() || spec.choices.contains(&token),
        ArgKind::Choice => spec.choices.contains(&token),
        ArgKind::FileOpen | ArgKind::FileSave => true,
        // element() never returns a list kind.
        _ => false,
    }
}

/// Whether the token reads as a boolean: its first character, case-folded,
/// is one of `0 1 n y t f`.
pub fn is_boolean(token: &str) -> bool {
    matches!(
        token.chars().next().map(|c| c.to_ascii_lowercase()),
        Some('0' | '1' | 'n' | 'y' | 't' | 'f')
    )
}

/// Maps a boolean token to its value. Truthy first characters are
/// `1 y t`; everything else in the boolean set is false.
pub fn to_bool(token: &str) -> bool {
    matches!(
        token.chars().next().map(|c| c.to_ascii_lowercase()),
        Some('1' | 'y' | 't')
    )
}

fn within_bounds(v: f64, spec: &ArgSpec<'_>) -> bool {
    spec.unbounded() || (v >= spec.min && v <= spec.max)
}

/// Clamps numeric defaults into the declared bounds, whatever the caller
/// supplied. Non-numeric values pass through.
fn clamp_default(value: Value, spec: &ArgSpec<'_>) -> Value {
    if spec.unbounded() {
        return value;
    }
    match value {
        Value::Int(v) => Value::Int((v as f64).clamp(spec.min, spec.max) as i64),
        Value::Real(v) => Value::Real(v.clamp(spec.min, spec.max)),
        Value::IntList(vs) => Value::IntList(
            vs.into_iter()
                .map(|v| (v as f64).clamp(spec.min, spec.max) as i64)
                .collect(),
        ),
        Value::RealList(vs) => Value::RealList(
            vs.into_iter().map(|v| v.clamp(spec.min, spec.max)).collect(),
        ),
        other => other,
    }
}

// --- LOCATING ARGUMENTS ON THE LINE ---

/// Where on the command line an argument's value lives, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// A candidate token (or token run) starts at `pos`.
    Present { pos: usize },
    /// The keyword is the final token; no value follows it.
    KeyWithoutValue,
    /// Nothing on the line supplies this argument.
    Absent,
}

/// The lookup strategies, tried in order: the keyed `key value` form when
/// a key is declared, then the positional index (index 0 is the command
/// name and never a value slot).
fn locate(cmd: &Command, spec: &ArgSpec<'_>) -> Slot {
    if let Some(key) = spec.key {
        match cmd.key_position(key) {
            Some(pos) if pos + 1 < cmd.token_count() => {
                return Slot::Present { pos: pos + 1 };
            }
            Some(_) => return Slot::KeyWithoutValue,
            None => {}
        }
    }
    if spec.index > 0 && spec.index < cmd.token_count() {
        Slot::Present { pos: spec.index }
    } else {
        Slot::Absent
    }
}

/// The members of a list run starting at `pos`: tokens up to (not
/// including) the terminator, or to the end of the line when no
/// terminator is present.
fn list_members(cmd: &Command, pos: usize) -> Vec<String> {
    cmd.tokens()
        .iter()
        .skip(pos)
        .take_while(|tok| tok.as_str() != LIST_TERMINATOR)
        .cloned()
        .collect()
}

/// Extracts and parses the value at `pos` if it validates; `None` when
/// the token (or any list member) is invalid. Does not mutate the command.
fn extract_valid(cmd: &Command, pos: usize, kind: ArgKind, spec: &ArgSpec<'_>) -> Option<Value> {
    if kind.is_list() {
        let members = list_members(cmd, pos);
        if members.iter().all(|tok| token_is_valid(kind, tok, spec)) {
            return Some(parse_list(kind, &members));
        }
        return None;
    }
    cmd.token(pos)
        .filter(|tok| token_is_valid(kind, tok, spec))
        .map(|tok| parse_scalar(kind, tok))
}

// Precondition for both parse helpers: the tokens already validated.
fn parse_scalar(kind: ArgKind, token: &str) -> Value {
    match kind.element() {
        ArgKind::Int => Value::Int(
            token
                .parse()
                .expect("Fatal: validated integer token failed to parse"),
        ),
        ArgKind::Real => Value::Real(
            token
                .parse()
                .expect("Fatal: validated real token failed to parse"),
        ),
        ArgKind::Bool => Value::Bool(to_bool(token)),
        _ => Value::Text(token.to_string()),
    }
}

fn parse_list(kind: ArgKind, members: &[String]) -> Value {
    match kind {
        ArgKind::IntList => Value::IntList(
            members
                .iter()
                .map(|t| {
                    t.parse()
                        .expect("Fatal: validated integer token failed to parse")
                })
                .collect(),
        ),
        ArgKind::RealList => Value::RealList(
            members
                .iter()
                .map(|t| {
                    t.parse()
                        .expect("Fatal: validated real token failed to parse")
                })
                .collect(),
        ),
        _ => Value::TextList(members.to_vec()),
    }
}

// --- THE RESOLUTION ENGINE ---

/// Produces a validated value for `spec`, trying the command line first
/// (keyed, then positional) and soliciting from `source` otherwise.
///
/// When a value had to be solicited, the resolved token(s) are spliced
/// back into the command and the command is rebuilt, so a transcript or
/// batch log printed afterwards shows the completed invocation.
pub fn resolve(
    cmd: &mut Command,
    kind: ArgKind,
    spec: &ArgSpec<'_>,
    default: Value,
    source: &mut dyn ArgSource,
) -> Result<Value> {
    let slot = locate(cmd, spec);
    if let Slot::Present { pos } = slot {
        if let Some(value) = extract_valid(cmd, pos, kind, spec) {
            return Ok(value);
        }
        log::debug!(
            "Argument '{}' present at token {} but invalid; soliciting.",
            spec.display_name(),
            pos
        );
    }

    let value = if kind.is_list() {
        solicit_list(kind, spec, default, source)?
    } else {
        solicit_scalar(kind, spec, default, source)?
    };
    splice(cmd, kind, spec, slot, &value);
    Ok(value)
}

/// Whether the command already supplies a valid value for `spec`, with no
/// prompting and no mutation.
pub fn arg_is_valid(cmd: &Command, kind: ArgKind, spec: &ArgSpec<'_>) -> bool {
    matches!(locate(cmd, spec), Slot::Present { pos }
        if extract_valid(cmd, pos, kind, spec).is_some())
}

/// Extracts a value the caller has already determined to be valid (via
/// [`arg_is_valid`]). Invoking this on a command that no longer validates
/// is a caller bug, not bad input, and aborts with a diagnostic.
pub fn value_from_valid(cmd: &Command, kind: ArgKind, spec: &ArgSpec<'_>) -> Value {
    let Slot::Present { pos } = locate(cmd, spec) else {
        panic!(
            "Fatal: argument '{}' extracted from a command that no longer supplies it",
            spec.display_name()
        );
    };
    extract_valid(cmd, pos, kind, spec).unwrap_or_else(|| {
        panic!(
            "Fatal: argument '{}' no longer validates against its declared type",
            spec.display_name()
        )
    })
}

fn solicit_scalar(
    kind: ArgKind,
    spec: &ArgSpec<'_>,
    default: Value,
    source: &mut dyn ArgSource,
) -> Result<Value> {
    let default = clamp_default(default, spec);
    let prompt = prompt_text(kind, spec, &default);
    loop {
        let Some(line) = source.read_value(&prompt)? else {
            report_substitution(spec, &default);
            return Ok(default);
        };
        let token = line.trim();
        if token.is_empty() {
            return Ok(default);
        }
        if token_is_valid(kind, token, spec) {
            return Ok(parse_scalar(kind, token));
        }
        println!(
            "{}",
            format!(t!("resolver.warn.invalid_value"), value = token, kind = kind.label())
                .red()
        );
    }
}

fn solicit_list(
    kind: ArgKind,
    spec: &ArgSpec<'_>,
    default: Value,
    source: &mut dyn ArgSource,
) -> Result<Value> {
    let default = clamp_default(default, spec);
    let prompt = prompt_text(kind, spec, &default);
    let mut members: Vec<String> = Vec::new();
    loop {
        let Some(line) = source.read_value(&prompt)? else {
            report_substitution(spec, &default);
            return Ok(default);
        };
        let token = line.trim();
        // The terminator is matched exactly, never case-folded.
        if token == LIST_TERMINATOR {
            return Ok(parse_list(kind, &members));
        }
        if token.is_empty() {
            continue;
        }
        if token_is_valid(kind, token, spec) {
            members.push(token.to_string());
        } else {
            println!(
                "{}",
                format!(t!("resolver.warn.invalid_value"), value = token, kind = kind.label())
                    .red()
            );
        }
    }
}

fn report_substitution(spec: &ArgSpec<'_>, default: &Value) {
    println!(
        "{}",
        format!(
            t!("resolver.info.substituted"),
            name = spec.display_name(),
            value = default
        )
        .yellow()
    );
}

/// The type-specific prompt: description, type, bounds, legal choices,
/// and the default that an empty reply accepts.
fn prompt_text(kind: ArgKind, spec: &ArgSpec<'_>, default: &Value) -> String {
    let mut prompt = format!("{} ({}", spec.display_name(), kind.label());
    if !spec.unbounded() {
        prompt.push_str(&format!(" in [{}, {}]", spec.min, spec.max));
    }
    if !spec.choices.is_empty() {
        prompt.push_str(&format!(": {}", spec.choices.join("|")));
    }
    if kind.is_list() {
        prompt.push_str(&format!(", one per line, '{}' ends the list", LIST_TERMINATOR));
    }
    prompt.push(')');
    prompt.push_str(&format!(" [{}]", default));
    prompt
}

/// Splices a solicited value back into the token stream and rebuilds the
/// command, so later re-display and batch replay show the completed line.
fn splice(cmd: &mut Command, kind: ArgKind, spec: &ArgSpec<'_>, slot: Slot, value: &Value) {
    let mut tokens = cmd.tokens().to_vec();
    let derived = value.to_token();

    match slot {
        Slot::Present { pos } => {
            if kind.is_list() {
                // Replace the invalid run (and its terminator, if any)
                // with the one derived token plus a fresh terminator.
                let end = run_end(&tokens, pos);
                tokens.splice(pos..end, [derived, LIST_TERMINATOR.to_string()]);
            } else if let Some(tok) = tokens.get_mut(pos) {
                *tok = derived;
            }
        }
        Slot::KeyWithoutValue => {
            tokens.push(derived);
            if kind.is_list() {
                tokens.push(LIST_TERMINATOR.to_string());
            }
        }
        Slot::Absent => {
            if let Some(key) = spec.key {
                // Synthesize the keyed form at the end of the line.
                tokens.push(key.to_string());
                tokens.push(derived);
                if kind.is_list() {
                    tokens.push(LIST_TERMINATOR.to_string());
                }
            } else {
                let at = if spec.index > 0 {
                    spec.index.min(tokens.len())
                } else {
                    tokens.len()
                };
                tokens.insert(at, derived);
                if kind.is_list() {
                    tokens.insert(at + 1, LIST_TERMINATOR.to_string());
                }
            }
        }
    }

    cmd.rebuild(tokens);
}

/// Index one past the end of the run starting at `pos`, including the
/// terminator token when present.
fn run_end(tokens: &[String], pos: usize) -> usize {
    let mut end = pos;
    while let Some(tok) = tokens.get(end) {
        end += 1;
        if tok == LIST_TERMINATOR {
            break;
        }
    }
    end
}

// --- TYPED WRAPPERS ---

// Each wrapper resolves under one declared kind and unwraps the matching
// variant; the engine returning any other variant is a programming error.

pub fn int_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: i64,
    source: &mut dyn ArgSource,
) -> Result<i64> {
    match resolve(cmd, ArgKind::Int, spec, Value::Int(default), source)? {
        Value::Int(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

pub fn real_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: f64,
    source: &mut dyn ArgSource,
) -> Result<f64> {
    match resolve(cmd, ArgKind::Real, spec, Value::Real(default), source)? {
        Value::Real(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

pub fn bool_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: bool,
    source: &mut dyn ArgSource,
) -> Result<bool> {
    match resolve(cmd, ArgKind::Bool, spec, Value::Bool(default), source)? {
        Value::Bool(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

pub fn text_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: &str,
    source: &mut dyn ArgSource,
) -> Result<String> {
    match resolve(cmd, ArgKind::Text, spec, Value::Text(default.to_string()), source)? {
        Value::Text(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

/// A string constrained to the closed set in `spec.choices`.
pub fn choice_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: &str,
    source: &mut dyn ArgSource,
) -> Result<String> {
    match resolve(cmd, ArgKind::Choice, spec, Value::Text(default.to_string()), source)? {
        Value::Text(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

/// A path destined for reading. Existence is checked by the eventual
/// open, not here.
pub fn open_path_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: &str,
    source: &mut dyn ArgSource,
) -> Result<std::path::PathBuf> {
    match resolve(cmd, ArgKind::FileOpen, spec, Value::Text(default.to_string()), source)? {
        Value::Text(v) => Ok(std::path::PathBuf::from(v)),
        other => mismatch(spec, &other),
    }
}

/// A path destined for writing.
pub fn save_path_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: &str,
    source: &mut dyn ArgSource,
) -> Result<std::path::PathBuf> {
    match resolve(cmd, ArgKind::FileSave, spec, Value::Text(default.to_string()), source)? {
        Value::Text(v) => Ok(std::path::PathBuf::from(v)),
        other => mismatch(spec, &other),
    }
}

pub fn int_list_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: Vec<i64>,
    source: &mut dyn ArgSource,
) -> Result<Vec<i64>> {
    match resolve(cmd, ArgKind::IntList, spec, Value::IntList(default), source)? {
        Value::IntList(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

pub fn real_list_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: Vec<f64>,
    source: &mut dyn ArgSource,
) -> Result<Vec<f64>> {
    match resolve(cmd, ArgKind::RealList, spec, Value::RealList(default), source)? {
        Value::RealList(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

pub fn text_list_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: Vec<String>,
    source: &mut dyn ArgSource,
) -> Result<Vec<String>> {
    match resolve(cmd, ArgKind::TextList, spec, Value::TextList(default), source)? {
        Value::TextList(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

pub fn choice_list_arg(
    cmd: &mut Command,
    spec: &ArgSpec<'_>,
    default: Vec<String>,
    source: &mut dyn ArgSource,
) -> Result<Vec<String>> {
    match resolve(cmd, ArgKind::ChoiceList, spec, Value::TextList(default), source)? {
        Value::TextList(v) => Ok(v),
        other => mismatch(spec, &other),
    }
}

fn mismatch<T>(spec: &ArgSpec<'_>, got: &Value) -> T {
    panic!(
        "Fatal: resolver returned a mismatched value kind for '{}': {:?}",
        spec.display_name(),
        got
    )
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(text: &str) -> Command {
        Command::parse(text).unwrap()
    }

    // --- Validation ---

    #[test]
    fn test_int_validation_respects_bounds() {
        let spec = ArgSpec {
            min: 1.0,
            max: 10.0,
            ..Default::default()
        };
        assert!(token_is_valid(ArgKind::Int, "5", &spec));
        assert!(token_is_valid(ArgKind::Int, "1", &spec));
        assert!(token_is_valid(ArgKind::Int, "10", &spec));
        assert!(!token_is_valid(ArgKind::Int, "0", &spec));
        assert!(!token_is_valid(ArgKind::Int, "11", &spec));
        assert!(!token_is_valid(ArgKind::Int, "5.5", &spec));
        assert!(!token_is_valid(ArgKind::Int, "five", &spec));
    }

    #[test]
    fn test_zero_bounds_mean_unbounded() {
        let spec = ArgSpec::default();
        assert!(token_is_valid(ArgKind::Int, "-40000", &spec));
        assert!(token_is_valid(ArgKind::Real, "1e30", &spec));
    }

    #[test]
    fn test_boolean_token_set() {
        for tok in ["0", "1", "n", "Y", "t", "F", "yes", "TRUE", "no"] {
            assert!(is_boolean(tok), "{tok} should read as boolean");
        }
        for tok in ["2", "maybe", "", "x"] {
            assert!(!is_boolean(tok), "{tok} should not read as boolean");
        }
        for tok in ["1", "y", "T", "yes"] {
            assert!(to_bool(tok), "{tok} should be truthy");
        }
        for tok in ["0", "N", "f", "false"] {
            assert!(!to_bool(tok), "{tok} should be falsy");
        }
    }

    #[test]
    fn test_choice_validation_is_case_sensitive() {
        let choices = ["red", "blue"];
        let spec = ArgSpec {
            choices: &choices,
            ..Default::default()
        };
        assert!(token_is_valid(ArgKind::Choice, "red", &spec));
        assert!(!token_is_valid(ArgKind::Choice, "RED", &spec));
        assert!(!token_is_valid(ArgKind::Choice, "green", &spec));
    }

    // --- Lookup without solicitation ---

    #[test]
    fn test_keyed_lookup_resolves_without_prompting() {
        let mut c = cmd("load file data.txt threshold 0.5");
        let spec = ArgSpec {
            key: Some("threshold"),
            name: "threshold",
            min: 0.0,
            max: 1.0,
            ..Default::default()
        };
        let before = c.clone();
        let v = real_arg(&mut c, &spec, 0.9, &mut SilentDefaults).unwrap();
        assert_eq!(v, 0.5);
        // Nothing was solicited, so the line is untouched.
        assert_eq!(c, before);
    }

    #[test]
    fn test_positional_lookup() {
        let mut c = cmd("smooth 3");
        let spec = ArgSpec {
            index: 1,
            name: "width",
            ..Default::default()
        };
        let v = int_arg(&mut c, &spec, 7, &mut SilentDefaults).unwrap();
        assert_eq!(v, 3);
    }

    // --- Fallback and splice-back ---

    #[test]
    fn test_missing_keyed_arg_splices_default_back() {
        let mut c = cmd("smooth file data.txt");
        let spec = ArgSpec {
            key: Some("count"),
            name: "count",
            ..Default::default()
        };
        let v = int_arg(&mut c, &spec, 5, &mut SilentDefaults).unwrap();
        assert_eq!(v, 5);
        assert_eq!(c.value_after_key("count"), Some("5"));
        assert_eq!(c.text(), "smooth file data.txt count 5");
    }

    #[test]
    fn test_default_is_clamped_into_bounds() {
        let mut c = cmd("smooth");
        let spec = ArgSpec {
            key: Some("width"),
            min: 0.0,
            max: 10.0,
            ..Default::default()
        };
        let v = int_arg(&mut c, &spec, 99, &mut SilentDefaults).unwrap();
        assert_eq!(v, 10);
        assert_eq!(c.value_after_key("width"), Some("10"));
    }

    #[test]
    fn test_invalid_value_is_resolicited_then_replaced_in_line() {
        let mut c = cmd("smooth width eleven");
        let spec = ArgSpec {
            key: Some("width"),
            name: "width",
            min: 1.0,
            max: 20.0,
            ..Default::default()
        };
        let mut src = ScriptedLines::new(["99", "12"]);
        let v = int_arg(&mut c, &spec, 5, &mut src).unwrap();
        assert_eq!(v, 12);
        assert_eq!(c.value_after_key("width"), Some("12"));
    }

    #[test]
    fn test_empty_reply_accepts_the_default() {
        let mut c = cmd("smooth");
        let spec = ArgSpec {
            key: Some("width"),
            ..Default::default()
        };
        let mut src = ScriptedLines::new([""]);
        let v = int_arg(&mut c, &spec, 4, &mut src).unwrap();
        assert_eq!(v, 4);
        assert_eq!(c.value_after_key("width"), Some("4"));
    }

    #[test]
    fn test_key_without_value_gets_one_appended() {
        let mut c = cmd("smooth width");
        let spec = ArgSpec {
            key: Some("width"),
            ..Default::default()
        };
        let mut src = ScriptedLines::new(["6"]);
        let v = int_arg(&mut c, &spec, 1, &mut src).unwrap();
        assert_eq!(v, 6);
        assert_eq!(c.text(), "smooth width 6");
    }

    #[test]
    fn test_missing_positional_is_inserted_at_its_slot() {
        let mut c = cmd("smooth");
        let spec = ArgSpec {
            index: 1,
            ..Default::default()
        };
        let mut src = ScriptedLines::new(["8"]);
        let v = int_arg(&mut c, &spec, 1, &mut src).unwrap();
        assert_eq!(v, 8);
        assert_eq!(c.token(1), Some("8"));
    }

    // --- Lists ---

    #[test]
    fn test_keyed_list_run_terminated_by_done() {
        let mut c = cmd("smooth sigmas 1.5 2.5 3.5 done file data.txt");
        let spec = ArgSpec {
            key: Some("sigmas"),
            ..Default::default()
        };
        let v = real_list_arg(&mut c, &spec, vec![], &mut SilentDefaults).unwrap();
        assert_eq!(v, vec![1.5, 2.5, 3.5]);
        // The keyed file argument after the run still resolves.
        assert_eq!(c.value_after_key("file"), Some("data.txt"));
    }

    #[test]
    fn test_list_run_without_terminator_extends_to_line_end() {
        let mut c = cmd("smooth sigmas 1 2 3");
        let spec = ArgSpec {
            key: Some("sigmas"),
            ..Default::default()
        };
        let v = int_list_arg(&mut c, &spec, vec![], &mut SilentDefaults).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn test_list_terminator_is_case_sensitive() {
        let mut c = cmd("tag names alpha DONE beta done");
        let spec = ArgSpec {
            key: Some("names"),
            ..Default::default()
        };
        let v = text_list_arg(&mut c, &spec, vec![], &mut SilentDefaults).unwrap();
        // "DONE" is an ordinary member; only the exact token ends the run.
        assert_eq!(v, vec!["alpha", "DONE", "beta"]);
    }

    #[test]
    fn test_solicited_list_joins_into_one_derived_token() {
        let mut c = cmd("smooth");
        let spec = ArgSpec {
            key: Some("sigmas"),
            ..Default::default()
        };
        let mut src = ScriptedLines::new(["1", "2", "nonsense", "3", "done"]);
        let v = int_list_arg(&mut c, &spec, vec![], &mut src).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
        assert_eq!(c.value_after_key("sigmas"), Some("1 2 3"));
        // The synthetic run carries its terminator.
        assert_eq!(c.token(c.token_count() - 1), Some(LIST_TERMINATOR));
    }

    #[test]
    fn test_invalid_list_member_invalidates_the_run() {
        let mut c = cmd("smooth sigmas 1 two 3 done");
        let spec = ArgSpec {
            key: Some("sigmas"),
            ..Default::default()
        };
        let v = int_list_arg(&mut c, &spec, vec![9], &mut SilentDefaults).unwrap();
        // The whole run fell back to the default.
        assert_eq!(v, vec![9]);
        assert_eq!(c.value_after_key("sigmas"), Some("9"));
    }

    // --- The fail-fast extraction contract ---

    #[test]
    fn test_arg_is_valid_then_extract() {
        let c = cmd("load threshold 0.5");
        let spec = ArgSpec {
            key: Some("threshold"),
            min: 0.0,
            max: 1.0,
            ..Default::default()
        };
        assert!(arg_is_valid(&c, ArgKind::Real, &spec));
        assert_eq!(value_from_valid(&c, ArgKind::Real, &spec), Value::Real(0.5));
    }

    #[test]
    #[should_panic(expected = "Fatal")]
    fn test_extracting_a_missing_arg_is_fatal() {
        let c = cmd("load");
        let spec = ArgSpec {
            key: Some("threshold"),
            ..Default::default()
        };
        let _ = value_from_valid(&c, ArgKind::Real, &spec);
    }
}
