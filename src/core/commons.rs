// src/core/commons.rs

// Shared helpers used by more than one module.

use regex::RegexBuilder;

/// Matches `text` against a glob-style pattern: `*` matches any run of
/// characters, `?` matches one character, everything else is literal.
/// Matching is anchored and case-insensitive.
pub fn glob_matches(pattern: &str, text: &str) -> bool {
    let mut re = String::with_capacity(pattern.len() + 2);
    re.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');

    match RegexBuilder::new(&re).case_insensitive(true).build() {
        Ok(rx) => rx.is_match(text),
        // A pattern the translation cannot express matches nothing.
        Err(_) => false,
    }
}

// MARK: --- UNIT TESTS ---
