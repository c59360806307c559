// src/core/help.rs

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::constants::ONE_LINE_MAX_MATCHES;
use crate::core::commons::glob_matches;

/// One catalog entry: a command name, a one-line brief, and the multi-line
/// detail text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub name: String,
    pub brief: String,
    pub detail: String,
}

/// How a set of matching entries is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpMode {
    /// One name per line, columnized.
    NameOnly,
    /// Name plus brief.
    OneLine,
    /// Name, brief, and full detail text.
    Long,
}

/// Picks the render mode from the match cardinality: a single match gets
/// the full detail, a handful get one line each, a crowd gets names only.
pub fn auto_mode(matches: usize) -> HelpMode {
    match matches {
        0 | 1 => HelpMode::Long,
        2..=ONE_LINE_MAX_MATCHES => HelpMode::OneLine,
        _ => HelpMode::NameOnly,
    }
}

/// The catalog of help entries, built up as handlers run in describe mode.
///
/// Entries are kept sorted by case-folded name with binary insert, so
/// lookup and pattern search see a total order. The staging buffer holds
/// the text a handler composes (possibly across several `stage` calls)
/// during a single describe pass.
#[derive(Debug, Default)]
pub struct HelpRegistry {
    entries: Vec<HelpEntry>,
    staged: String,
}

impl HelpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends to the pending help text for the describe pass in progress.
    pub fn stage(&mut self, text: &str) {
        self.staged.push_str(text);
    }

    /// Drains the pending help text.
    pub fn take_staged(&mut self) -> String {
        std::mem::take(&mut self.staged)
    }

    /// Registers an entry unless one with the same name (case-insensitive)
    /// already exists; the first registration wins. Returns whether the
    /// entry was inserted.
    pub fn register_if_absent(&mut self, name: &str, brief: &str, detail: &str) -> bool {
        let key = name.to_lowercase();
        match self
            .entries
            .binary_search_by(|e| e.name.to_lowercase().cmp(&key))
        {
            Ok(_) => false,
            Err(pos) => {
                self.entries.insert(
                    pos,
                    HelpEntry {
                        name: name.to_string(),
                        brief: brief.to_string(),
                        detail: detail.to_string(),
                    },
                );
                true
            }
        }
    }

    /// Parses a staged help block and registers it. Returns whether the
    /// block was well-formed enough to carry a name.
    pub fn register_block(&mut self, text: &str) -> bool {
        match parse_help_block(text) {
            Some((name, brief, detail)) => {
                self.register_if_absent(&name, &brief, &detail);
                true
            }
            None => false,
        }
    }

    /// All entries whose name matches `key`: `"all"` (case-insensitive)
    /// matches everything, anything else is a glob pattern. The result
    /// preserves the sorted-by-name order.
    pub fn find_matching(&self, key: &str) -> Vec<&HelpEntry> {
        if key.eq_ignore_ascii_case("all") {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| glob_matches(key, &e.name))
            .collect()
    }

    /// Renders `entries` to `out` in the given mode.
    pub fn render<W: Write>(
        entries: &[&HelpEntry],
        mode: HelpMode,
        out: &mut W,
    ) -> io::Result<()> {
        match mode {
            HelpMode::NameOnly => {
                let width = entries
                    .iter()
                    .map(|e| e.name.len())
                    .max()
                    .unwrap_or(0)
                    + 2;
                let per_row = (78 / width).max(1);
                for row in entries.chunks(per_row) {
                    for entry in row {
                        write!(out, "{:<width$}", entry.name, width = width)?;
                    }
                    writeln!(out)?;
                }
            }
            HelpMode::OneLine => {
                let width = entries
                    .iter()
                    .map(|e| e.name.len())
                    .max()
                    .unwrap_or(0)
                    + 2;
                for entry in entries {
                    writeln!(out, "{:<width$}{}", entry.name, entry.brief, width = width)?;
                }
            }
            HelpMode::Long => {
                for entry in entries {
                    // The detail keeps its leading line break, so this
                    // prints as "name  brief" followed by the paragraph.
                    writeln!(out, "{}  {}{}", entry.name, entry.brief, entry.detail)?;
                }
            }
        }
        Ok(())
    }

    /// Emits the whole catalog as a standalone HTML page: a heading, a
    /// comma-separated anchor index, then one section per entry with the
    /// brief escaped and the detail preformatted.
    pub fn write_html<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "<html>")?;
        writeln!(out, "<head><title>Command reference</title></head>")?;
        writeln!(out, "<body>")?;
        writeln!(out, "<h1>Command reference</h1>")?;

        let index = self
            .entries
            .iter()
            .map(|e| format!("<a href=\"#{}\">{}</a>", e.name, e.name))
            .collect::<Vec<_>>()
            .join(",\n");
        writeln!(out, "<p>{}</p>", index)?;

        for entry in &self.entries {
            writeln!(out, "<hr>")?;
            writeln!(out, "<h2 id=\"{}\">{}</h2>", entry.name, entry.name)?;
            writeln!(out, "<p>{}</p>", escape_angles(&entry.brief))?;
            writeln!(out, "<pre>{}</pre>", escape_angles(&entry.detail))?;
        }

        writeln!(out, "</body>")?;
        writeln!(out, "</html>")
    }

    /// Writes the HTML page to `path`, overwriting any previous dump.
    pub fn save_html(&self, path: &Path) -> io::Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        self.write_html(&mut out)?;
        out.flush()
    }
}

/// Splits a staged help block into `(name, brief, detail)`.
///
/// The name is the first whitespace-delimited token with any `:` stripped,
/// the brief is the remainder of the first line, and the detail is
/// everything from the first line break onward, keeping that leading
/// break. Returns `None` when the block carries no name at all.
pub fn parse_help_block(text: &str) -> Option<(String, String, String)> {
    let (first_line, rest) = match text.find('\n') {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };

    let mut words = first_line.split_whitespace();
    let name: String = words.next()?.chars().filter(|&c| c != ':').collect();
    if name.is_empty() {
        return None;
    }

    let brief = words.collect::<Vec<_>>().join(" ");
    Some((name, brief, rest.to_string()))
}

/// Escapes `<` and `>` only; everything else passes through untouched.
fn escape_angles(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> HelpRegistry {
        let mut reg = HelpRegistry::new();
        for name in names {
            reg.register_if_absent(name, "brief", "\ndetail");
        }
        reg
    }

    #[test]
    fn test_first_registration_wins() {
        let mut reg = HelpRegistry::new();
        assert!(reg.register_if_absent("foo", "b", "d"));
        assert!(!reg.register_if_absent("foo", "b2", "d2"));
        assert!(!reg.register_if_absent("FOO", "b3", "d3"));

        let found = reg.find_matching("foo");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].brief, "b");
        assert_eq!(found[0].detail, "d");
    }

    #[test]
    fn test_all_returns_everything_sorted_by_name() {
        let reg = registry_with(&["zeta", "Alpha", "mid"]);
        let names: Vec<_> = reg.find_matching("ALL").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_find_matching_uses_glob_patterns() {
        let reg = registry_with(&["quit", "quickquit", "pause"]);
        let names: Vec<_> = reg.find_matching("q*").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["quickquit", "quit"]);
        assert!(reg.find_matching("nomatch*x").is_empty());
    }

    #[test]
    fn test_auto_mode_thresholds() {
        assert_eq!(auto_mode(1), HelpMode::Long);
        assert_eq!(auto_mode(2), HelpMode::OneLine);
        assert_eq!(auto_mode(14), HelpMode::OneLine);
        assert_eq!(auto_mode(15), HelpMode::NameOnly);
        assert_eq!(auto_mode(20), HelpMode::NameOnly);
    }

    #[test]
    fn test_parse_help_block_strips_colons_and_splits_lines() {
        let (name, brief, detail) =
            parse_help_block("batch: run commands from a file\nReads the file line by line.")
                .unwrap();
        assert_eq!(name, "batch");
        assert_eq!(brief, "run commands from a file");
        assert_eq!(detail, "\nReads the file line by line.");
    }

    #[test]
    fn test_parse_help_block_without_detail() {
        let (name, brief, detail) = parse_help_block("quit: end the session").unwrap();
        assert_eq!(name, "quit");
        assert_eq!(brief, "end the session");
        assert_eq!(detail, "");
    }

    #[test]
    fn test_parse_help_block_rejects_empty() {
        assert!(parse_help_block("").is_none());
        assert!(parse_help_block("   \nrest").is_none());
    }

    #[test]
    fn test_render_one_line_lists_name_and_brief() {
        let reg = registry_with(&["quit", "pause"]);
        let entries = reg.find_matching("all");
        let mut out = Vec::new();
        HelpRegistry::render(&entries, HelpMode::OneLine, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("pause"));
        assert!(text.contains("quit"));
        assert!(text.lines().count() == 2);
    }

    #[test]
    fn test_render_name_only_columnizes() {
        let names: Vec<String> = (0..20).map(|i| format!("cmd{:02}", i)).collect();
        let reg = registry_with(&names.iter().map(String::as_str).collect::<Vec<_>>());
        let entries = reg.find_matching("all");
        let mut out = Vec::new();
        HelpRegistry::render(&entries, HelpMode::NameOnly, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        // More than one name per row, no briefs.
        assert!(text.lines().count() < 20);
        assert!(!text.contains("brief"));
    }

    #[test]
    fn test_html_escapes_angle_brackets_only() {
        let mut reg = HelpRegistry::new();
        reg.register_if_absent("load", "read <file> & more", "\nuse x > 0");
        let mut out = Vec::new();
        reg.write_html(&mut out).unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("read &lt;file&gt; & more"));
        assert!(html.contains("use x &gt; 0"));
        assert!(html.contains("<a href=\"#load\">load</a>"));
    }

    #[test]
    fn test_staging_buffer_accumulates_and_drains() {
        let mut reg = HelpRegistry::new();
        reg.stage("name: brief");
        reg.stage("\nmore detail");
        let staged = reg.take_staged();
        assert_eq!(staged, "name: brief\nmore detail");
        assert!(reg.take_staged().is_empty());
    }
}
